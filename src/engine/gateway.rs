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

//! Consent Gateway.
//!
//! Mediates every read of a record behind a live consent check and fails
//! closed. A fetch moves through
//! `CHECKING_CONSENT -> AUTHORIZED -> LOOKING_UP -> RELEASED` on the happy
//! path; a denial, an authority error, a timeout or a missing record all end
//! in the same `Refusal`. The record store is never consulted before the
//! authority says yes.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::engine::store::RecordStore;
use crate::engine_core::audit::{AuditLogger, RefusalCause};
use crate::engine_core::constants::timeouts;
use crate::engine_core::crypto::CryptoSigner;
use crate::engine_core::errors::{ConsentError, GatewayError, Refusal};
use crate::engine_core::models::{ConsentQuery, Identity, Payload, Scope};
use crate::engine_core::traits::ConsentAuthority;

pub struct ConsentGateway {
    store: RecordStore,
    authority: Arc<dyn ConsentAuthority>,
    audit: AuditLogger,
    check_timeout: Duration,
}

impl ConsentGateway {
    /// Gateway with an empty store, an ephemeral audit key and the default
    /// consent check timeout.
    pub fn new(authority: Arc<dyn ConsentAuthority>) -> Self {
        Self {
            store: RecordStore::new(),
            authority,
            audit: AuditLogger::new(CryptoSigner::ephemeral()),
            check_timeout: Duration::from_millis(timeouts::DEFAULT_CONSENT_CHECK_MS),
        }
    }

    pub fn from_config(
        config: &Config,
        authority: Arc<dyn ConsentAuthority>,
    ) -> Result<Self, GatewayError> {
        let signer = match &config.audit_secret {
            Some(secret) => CryptoSigner::from_secret(secret)?,
            None => CryptoSigner::ephemeral(),
        };
        Ok(Self::new(authority)
            .with_audit(AuditLogger::new(signer))
            .with_check_timeout(config.consent_check_timeout()))
    }

    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = audit;
        self
    }

    /// Create or wholesale-replace the record at (subject, scope).
    ///
    /// Payload content is not validated.
    pub fn register(
        &self,
        subject: impl Into<Identity>,
        scope: Scope,
        payload: impl Into<Payload>,
    ) {
        let subject = subject.into();
        let payload = payload.into();
        debug!(
            subject = %subject,
            scope = %scope,
            payload_len = payload.len(),
            "Registering record"
        );
        self.store.register(&subject, scope, payload);
    }

    /// Release the payload at (subject, scope) to `requester` iff the consent
    /// authority confirms access right now.
    pub async fn fetch(
        &self,
        requester: impl Into<Identity>,
        subject: impl Into<Identity>,
        scope: Scope,
    ) -> Result<Payload, Refusal> {
        let query = ConsentQuery {
            subject: subject.into(),
            scope,
            requester: requester.into(),
        };
        let fetch_id = Uuid::new_v4();

        match self.evaluate(fetch_id, &query).await {
            Ok(payload) => {
                info!(
                    fetch_id = %fetch_id,
                    requester = %query.requester,
                    subject = %query.subject,
                    scope = %query.scope,
                    "Record released"
                );
                self.audit.released(fetch_id, &query);
                Ok(payload)
            }
            Err(cause) => {
                self.audit.refused(fetch_id, &query, cause);
                Err(Refusal)
            }
        }
    }

    pub fn record_count(&self) -> usize {
        self.store.len()
    }

    async fn evaluate(
        &self,
        fetch_id: Uuid,
        query: &ConsentQuery,
    ) -> Result<Payload, RefusalCause> {
        debug!(
            fetch_id = %fetch_id,
            requester = %query.requester,
            subject = %query.subject,
            scope = %query.scope,
            "Checking consent"
        );

        match self.check_consent(query).await {
            Ok(true) => {
                debug!(fetch_id = %fetch_id, "Consent valid");
            }
            Ok(false) => {
                debug!(fetch_id = %fetch_id, "Consent not granted, refusing");
                return Err(RefusalCause::Denied);
            }
            Err(e) => {
                warn!(fetch_id = %fetch_id, error = %e, "Consent could not be verified, refusing");
                return Err(RefusalCause::Unverified);
            }
        }

        match self.store.lookup(&query.subject, &query.scope) {
            Some(record) => Ok(record.payload),
            None => {
                debug!(fetch_id = %fetch_id, "No record at authorized key, refusing");
                Err(RefusalCause::NotFound)
            }
        }
    }

    async fn check_consent(&self, query: &ConsentQuery) -> Result<bool, ConsentError> {
        tokio::time::timeout(self.check_timeout, self.authority.check_consent(query))
            .await
            .map_err(|_| ConsentError::Timeout(self.check_timeout))?
    }
}
