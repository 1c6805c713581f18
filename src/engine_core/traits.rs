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

//! Consent Authority Trait.
//!
//! Defines the single capability the gateway needs from the system of record
//! for consent. Implementations may be remote and slow; the gateway bounds
//! every call with a timeout.

use async_trait::async_trait;

use crate::engine_core::errors::ConsentError;
use crate::engine_core::models::ConsentQuery;

/// External authority answering whether access is currently authorized.
///
/// Implementations must be idempotent: a check has no side effects and may
/// be repeated freely.
#[async_trait]
pub trait ConsentAuthority: Send + Sync {
    /// `Ok(true)` only when the requester currently holds consent for the
    /// subject's scope. Any failure to reach a verdict is an `Err`.
    async fn check_consent(&self, query: &ConsentQuery) -> Result<bool, ConsentError>;
}

