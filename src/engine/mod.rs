//! Gateway engine.
//!
//! This module contains the record store and the consent gateway that
//! guards it.

pub mod gateway;
pub mod store;
