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

//! Domain models for the consent gateway.
//!
//! This module contains pure data structures representing identities, scopes,
//! payloads and records. It is designed to be free of I/O side effects.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::engine_core::constants::scope::{HEX_PREFIX, SCOPE_LENGTH};
use crate::engine_core::errors::GatewayError;

/// Normalized identity of a subject or a requester.
///
/// Identities compare case-insensitively, so the canonical form is the
/// lowercase rendering of whatever the caller passed in. Registration and
/// fetch both go through `Identity::new`, which keeps their keys consistent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed-width opaque category identifier. Never parsed, only compared.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scope([u8; SCOPE_LENGTH]);

impl Scope {
    pub fn from_bytes(bytes: [u8; SCOPE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derive a scope from an attribute label such as `credit_score`.
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; SCOPE_LENGTH];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Parse a 64 digit hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, GatewayError> {
        let digits = s.strip_prefix(HEX_PREFIX).unwrap_or(s);
        let decoded = hex::decode(digits)
            .map_err(|e| GatewayError::InvalidScope(format!("not hex: {}", e)))?;
        let bytes: [u8; SCOPE_LENGTH] = decoded.try_into().map_err(|v: Vec<u8>| {
            GatewayError::InvalidScope(format!(
                "expected {} bytes, got {}",
                SCOPE_LENGTH,
                v.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SCOPE_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("{}{}", HEX_PREFIX, hex::encode(self.0))
    }
}

impl FromStr for Scope {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Scope {
    type Error = GatewayError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_hex()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope({})", self.to_hex())
    }
}

/// Sensitive record content.
///
/// `Debug` is redacted so a payload can never end up in a log line through
/// `?field` formatting. There is intentionally no `Display` or `Serialize`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload(<redacted {} bytes>)", self.0.len())
    }
}

/// Storage key: normalized subject plus exact scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub subject: Identity,
    pub scope: Scope,
}

impl RecordKey {
    pub fn new(subject: Identity, scope: Scope) -> Self {
        Self { subject, scope }
    }
}

/// A registered record. Replaced wholesale on re-registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub subject: Identity,
    pub scope: Scope,
    pub payload: Payload,
}

/// The question put to a consent authority: may `requester` read
/// `subject`'s data in `scope` right now?
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConsentQuery {
    pub subject: Identity,
    pub scope: Scope,
    pub requester: Identity,
}
