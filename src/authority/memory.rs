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

//! In-memory consent authority.
//!
//! Deterministic stand-in for a ledger-backed authority. A subject grants a
//! requester a set of scopes for a time window; a check is true only while
//! an unexpired grant exists for that exact (subject, requester, scope).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use crate::engine_core::errors::ConsentError;
use crate::engine_core::models::{ConsentQuery, Identity, Scope};
use crate::engine_core::traits::ConsentAuthority;

type GrantKey = (Identity, Identity, Scope);

#[derive(Debug, Default)]
pub struct InMemoryConsentAuthority {
    grants: RwLock<HashMap<GrantKey, DateTime<Utc>>>,
    forced_failure: RwLock<Option<ConsentError>>,
}

impl InMemoryConsentAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// `subject` grants `requester` access to every scope in `scopes` for
    /// `duration`. Re-granting extends or shortens the window. Returns the
    /// expiry instant.
    pub fn grant(
        &self,
        subject: impl Into<Identity>,
        requester: impl Into<Identity>,
        scopes: &[Scope],
        duration: Duration,
    ) -> DateTime<Utc> {
        let subject = subject.into();
        let requester = requester.into();
        let expires_at = crate::utils::time::utc_now() + duration;

        let mut grants = self.grants.write().unwrap_or_else(PoisonError::into_inner);
        for scope in scopes {
            grants.insert((subject.clone(), requester.clone(), *scope), expires_at);
        }
        debug!(
            subject = %subject,
            requester = %requester,
            scopes = scopes.len(),
            expires_at = %expires_at,
            "Consent granted"
        );
        expires_at
    }

    /// Withdraw a grant. Returns whether one existed.
    pub fn revoke(
        &self,
        subject: impl Into<Identity>,
        requester: impl Into<Identity>,
        scope: Scope,
    ) -> bool {
        let key = (subject.into(), requester.into(), scope);
        self.grants
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .is_some()
    }

    /// Make every subsequent check fail with `error` (or stop failing).
    pub fn fail_with(&self, error: Option<ConsentError>) {
        *self
            .forced_failure
            .write()
            .unwrap_or_else(PoisonError::into_inner) = error;
    }

    fn is_granted(&self, query: &ConsentQuery, at: DateTime<Utc>) -> bool {
        let key = (query.subject.clone(), query.requester.clone(), query.scope);
        self.grants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .is_some_and(|expires_at| *expires_at > at)
    }
}

#[async_trait]
impl ConsentAuthority for InMemoryConsentAuthority {
    async fn check_consent(&self, query: &ConsentQuery) -> Result<bool, ConsentError> {
        if let Some(error) = self
            .forced_failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }
        Ok(self.is_granted(query, crate::utils::time::utc_now()))
    }
}
