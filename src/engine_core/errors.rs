// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Domain error types - Secure error handling with no information disclosure

use std::time::Duration;
use thiserror::Error;

use crate::engine_core::constants::refusal;

/// The only negative outcome `fetch` ever returns.
///
/// Denial, verification failure and record absence all become this value.
/// It deliberately carries no data.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("{}", refusal::MESSAGE)]
pub struct Refusal;

/// Failure to obtain a definitive answer from a consent authority.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsentError {
    /// Network or connection level failure
    #[error("Consent authority unreachable: {0}")]
    Transport(String),

    /// The check did not complete within the configured bound
    #[error("Consent check timed out after {0:?}")]
    Timeout(Duration),

    /// The authority answered with something that is not a boolean verdict
    #[error("Malformed consent response: {0}")]
    Malformed(String),

    /// The authority itself rejected the call (revert, JSON-RPC error object)
    #[error("Consent authority rejected the check (code {code}): {message}")]
    Rejected { code: i64, message: String },
}

/// Errors raised outside the fetch path: configuration, seeding, parsing.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A scope identifier could not be parsed
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// Seed records could not be read or decoded
    #[error("Record load error: {0}")]
    RecordLoadError(String),

    /// Cryptographic error
    #[error("Cryptographic error: {0}")]
    CryptoError(String),
}

impl GatewayError {
    /// Get user-friendly error message (no sensitive information)
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::ConfigurationError(_) => "Invalid configuration".to_string(),
            GatewayError::InvalidScope(_) => "Invalid scope".to_string(),
            GatewayError::RecordLoadError(_) => "Internal error".to_string(),
            GatewayError::CryptoError(_) => "Internal error".to_string(),
        }
    }
}
