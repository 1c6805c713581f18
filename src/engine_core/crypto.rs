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

//! Cryptographic utilities for audit integrity.
//!
//! This module provides the `CryptoSigner` which produces and checks
//! HMAC-SHA256 signatures over audit entries, so a tampered audit line can be
//! detected by anyone holding the key.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::engine_core::constants::crypto;
use crate::engine_core::errors::GatewayError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct CryptoSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for CryptoSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CryptoSigner(<redacted>)")
    }
}

impl CryptoSigner {
    /// Create a new signer with a secure random ephemeral key
    pub fn ephemeral() -> Self {
        let mut secret = vec![0u8; crypto::SECRET_KEY_LENGTH];
        rand::rng().fill_bytes(&mut secret);
        Self { secret }
    }

    /// Create a signer from an operator-supplied key
    pub fn from_secret(secret: &[u8]) -> Result<Self, GatewayError> {
        if secret.len() < crypto::SECRET_KEY_LENGTH {
            return Err(GatewayError::CryptoError(format!(
                "audit secret must be at least {} bytes",
                crypto::SECRET_KEY_LENGTH
            )));
        }
        Ok(Self {
            secret: secret.to_vec(),
        })
    }

    /// Sign a message.
    /// Format: "{version}.{hmac_b64}"
    pub fn sign(&self, message: &[u8]) -> String {
        let sig_b64 = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mut mac) => {
                mac.update(message);
                URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
            }
            // HMAC accepts keys of any length
            Err(_) => String::new(),
        };
        format!("{}.{}", crypto::SIGNATURE_VERSION, sig_b64)
    }

    /// Verify a signature produced by `sign` using constant-time comparison
    pub fn verify(&self, message: &[u8], signature: &str) -> bool {
        let Some((version, sig_b64)) = signature.split_once('.') else {
            return false;
        };
        if version != crypto::SIGNATURE_VERSION {
            return false;
        }

        let provided_sig = match URL_SAFE_NO_PAD.decode(sig_b64) {
            Ok(b) => b,
            Err(_) => return false,
        };

        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(m) => m,
            Err(_) => return false,
        };
        mac.update(message);
        mac.verify_slice(&provided_sig).is_ok()
    }
}
