//! Utilities: time helpers and record seeding.

pub mod record_loader;
pub mod time;
