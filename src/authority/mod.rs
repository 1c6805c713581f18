//! Consent authority implementations.
//!
//! `HttpConsentAuthority` talks to a remote system of record;
//! `InMemoryConsentAuthority` is a deterministic local authority used by
//! tests, benches and the demo.

pub mod http;
pub mod memory;

pub use http::HttpConsentAuthority;
pub use memory::InMemoryConsentAuthority;
