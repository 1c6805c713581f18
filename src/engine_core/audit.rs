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

//! Signed audit trail for fetch decisions.
//!
//! Audit entries are the one place where the internal refusal cause is
//! recorded. They never contain payload bytes.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine_core::constants::audit;
use crate::engine_core::crypto::CryptoSigner;
use crate::engine_core::models::ConsentQuery;

/// Why a fetch was refused. Internal only; callers just see `Refusal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefusalCause {
    /// The authority answered "not authorized"
    Denied,
    /// The authority could not be reached or gave no usable answer
    Unverified,
    /// Authorized, but nothing is registered at the key
    NotFound,
}

impl RefusalCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefusalCause::Denied => audit::CAUSE_DENIED,
            RefusalCause::Unverified => audit::CAUSE_UNVERIFIED,
            RefusalCause::NotFound => audit::CAUSE_NOT_FOUND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub fetch_id: Uuid,
    pub timestamp: f64,
    pub event_type: &'static str,
    pub requester: String,
    pub subject: String,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignedAuditEntry {
    pub entry: AuditEntry,
    /// Canonical JSON rendering of `entry`; this is what was signed
    pub canonical: String,
    pub signature: String,
}

/// Destination for signed audit entries.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &SignedAuditEntry);
}

/// Default sink: one structured `tracing` event per entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: &SignedAuditEntry) {
        info!(
            target: audit::TARGET,
            signature = %entry.signature,
            entry = %entry.canonical,
            "SECURE_AUDIT_LOG"
        );
    }
}

pub struct AuditLogger {
    signer: CryptoSigner,
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger {
    pub fn new(signer: CryptoSigner) -> Self {
        Self::with_sink(signer, Arc::new(TracingAuditSink))
    }

    pub fn with_sink(signer: CryptoSigner, sink: Arc<dyn AuditSink>) -> Self {
        Self { signer, sink }
    }

    pub fn signer(&self) -> &CryptoSigner {
        &self.signer
    }

    pub fn released(&self, fetch_id: Uuid, query: &ConsentQuery) {
        self.log(fetch_id, audit::EVENT_RELEASED, query, None);
    }

    pub fn refused(&self, fetch_id: Uuid, query: &ConsentQuery, cause: RefusalCause) {
        self.log(fetch_id, audit::EVENT_REFUSED, query, Some(cause));
    }

    fn log(
        &self,
        fetch_id: Uuid,
        event_type: &'static str,
        query: &ConsentQuery,
        cause: Option<RefusalCause>,
    ) {
        let entry = AuditEntry {
            fetch_id,
            timestamp: crate::utils::time::now(),
            event_type,
            requester: query.requester.to_string(),
            subject: query.subject.to_string(),
            scope: query.scope.to_hex(),
            cause: cause.map(|c| c.as_str()),
        };

        // Struct field order is fixed, so this rendering is stable for signing
        let rendered = serde_json::to_string(&entry);
        if let Some(signed) = self.seal(entry, rendered) {
            self.sink.record(&signed);
        }
    }

    /// Sign a rendered entry. An entry that failed to render is dropped with
    /// a warning rather than signed as an empty string.
    fn seal(
        &self,
        entry: AuditEntry,
        rendered: serde_json::Result<String>,
    ) -> Option<SignedAuditEntry> {
        match rendered {
            Ok(canonical) => {
                let signature = self.signer.sign(canonical.as_bytes());
                Some(SignedAuditEntry {
                    entry,
                    canonical,
                    signature,
                })
            }
            Err(e) => {
                warn!(
                    target: audit::TARGET,
                    fetch_id = %entry.fetch_id,
                    event_type = entry.event_type,
                    error = %e,
                    "Audit entry could not be serialized; not signed"
                );
                None
            }
        }
    }
}
