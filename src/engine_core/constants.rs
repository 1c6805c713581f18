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

//! consent-gateway Constants - Single source of truth for all configuration values.
//!
//! This module centralizes magic numbers, wire names and environment variable
//! names so the binary, the config layer and the tests agree on them.

/// Scope identifiers
pub mod scope {
    /// Width of a scope identifier in bytes
    pub const SCOPE_LENGTH: usize = 32;
    /// Prefix used when rendering a scope as hex
    pub const HEX_PREFIX: &str = "0x";
}

/// Cryptographic constants
pub mod crypto {
    /// HMAC-SHA256 secret key length in bytes
    pub const SECRET_KEY_LENGTH: usize = 32;
    /// Audit signature format version
    pub const SIGNATURE_VERSION: &str = "1";
}

/// Refusal wording. Must never carry subject, scope or record details.
pub mod refusal {
    pub const MESSAGE: &str = "access refused";
}

/// Audit event names
pub mod audit {
    pub const TARGET: &str = "audit";
    pub const EVENT_RELEASED: &str = "FetchReleased";
    pub const EVENT_REFUSED: &str = "FetchRefused";
    pub const CAUSE_DENIED: &str = "denied";
    pub const CAUSE_UNVERIFIED: &str = "unverified";
    pub const CAUSE_NOT_FOUND: &str = "not_found";
}

/// JSON-RPC wire constants for the remote consent authority
pub mod jsonrpc {
    pub const VERSION: &str = "2.0";
    pub const METHOD_CHECK_CONSENT: &str = "consent_checkConsent";
}

/// Timeouts
pub mod timeouts {
    /// Default bound on a single consent check, in milliseconds
    pub const DEFAULT_CONSENT_CHECK_MS: u64 = 5_000;
    /// Default TCP connect timeout for the remote authority, in milliseconds
    pub const DEFAULT_CONNECT_MS: u64 = 2_000;
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_AUTHORITY_URL: &str = "CONSENT_AUTHORITY_URL";
    pub const ENV_CONSENT_CHECK_TIMEOUT_MS: &str = "CONSENT_CHECK_TIMEOUT_MS";
    pub const ENV_CONNECT_TIMEOUT_MS: &str = "CONSENT_CONNECT_TIMEOUT_MS";
    pub const ENV_RECORDS_YAML_PATH: &str = "RECORDS_YAML_PATH";
    pub const ENV_AUDIT_SECRET: &str = "CONSENT_GATEWAY_AUDIT_SECRET";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
}
