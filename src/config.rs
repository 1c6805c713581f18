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

// Configuration management

use crate::engine_core::constants::{config as keys, timeouts};
use crate::engine_core::errors::GatewayError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Gateway configuration loaded from environment variables.
///
/// All values are validated on load with clear error messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint of the remote consent authority
    pub authority_url: Option<String>,
    pub consent_check_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub records_yaml_path: Option<PathBuf>,
    /// HMAC key for audit signatures; random per process when unset
    #[serde(skip)]
    pub audit_secret: Option<Vec<u8>>,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            authority_url: optional(keys::ENV_AUTHORITY_URL),
            consent_check_timeout_ms: Self::parse_millis(
                keys::ENV_CONSENT_CHECK_TIMEOUT_MS,
                optional(keys::ENV_CONSENT_CHECK_TIMEOUT_MS),
                timeouts::DEFAULT_CONSENT_CHECK_MS,
            )?,
            connect_timeout_ms: Self::parse_millis(
                keys::ENV_CONNECT_TIMEOUT_MS,
                optional(keys::ENV_CONNECT_TIMEOUT_MS),
                timeouts::DEFAULT_CONNECT_MS,
            )?,
            records_yaml_path: optional(keys::ENV_RECORDS_YAML_PATH).map(PathBuf::from),
            audit_secret: optional(keys::ENV_AUDIT_SECRET)
                .map(|v| Self::parse_secret(&v))
                .transpose()?,
            log_level: optional(keys::ENV_LOG_LEVEL).unwrap_or_else(|| "info".to_string()),
            log_format: optional(keys::ENV_LOG_FORMAT).unwrap_or_else(|| "text".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Post-load validation
    pub fn validate(&self) -> Result<(), GatewayError> {
        if let Some(url) = &self.authority_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(GatewayError::ConfigurationError(format!(
                    "{} must be an http(s) URL",
                    keys::ENV_AUTHORITY_URL
                )));
            }
        }

        if self.consent_check_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(GatewayError::ConfigurationError(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        match self.log_format.as_str() {
            "json" | "text" => Ok(()),
            other => Err(GatewayError::ConfigurationError(format!(
                "Invalid {} value '{}': expected 'json' or 'text'",
                keys::ENV_LOG_FORMAT,
                other
            ))),
        }
    }

    pub fn consent_check_timeout(&self) -> Duration {
        Duration::from_millis(self.consent_check_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    fn parse_millis(key: &str, value: Option<String>, default: u64) -> Result<u64, GatewayError> {
        match value {
            Some(value) => {
                let parsed = value.trim().parse::<u64>().map_err(|e| {
                    GatewayError::ConfigurationError(format!(
                        "Invalid {} value '{}': {}",
                        key, value, e
                    ))
                })?;

                if parsed == 0 {
                    return Err(GatewayError::ConfigurationError(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            None => Ok(default),
        }
    }

    fn parse_secret(value: &str) -> Result<Vec<u8>, GatewayError> {
        let digits = value.trim();
        let digits = digits.strip_prefix("0x").unwrap_or(digits);
        // Never echo the secret itself
        hex::decode(digits).map_err(|_| {
            GatewayError::ConfigurationError(format!("{} must be hex encoded", keys::ENV_AUDIT_SECRET))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            authority_url: None,
            consent_check_timeout_ms: timeouts::DEFAULT_CONSENT_CHECK_MS,
            connect_timeout_ms: timeouts::DEFAULT_CONNECT_MS,
            records_yaml_path: None,
            audit_secret: None,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}
