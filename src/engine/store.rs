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

//! In-process record store.
//!
//! One coarse `RwLock` guards the whole map. Writes are a single `insert`, so
//! a poisoned lock still holds a consistent map and is recovered rather than
//! propagated.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::engine_core::models::{Identity, Payload, Record, RecordKey, Scope};

#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<HashMap<RecordKey, Record>>,
    #[cfg(test)]
    lookups: std::sync::atomic::AtomicUsize,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or wholesale-replace the record at (subject, scope).
    ///
    /// The stored `Record.subject` is the normalized identity, the same
    /// value as the key. The caller's original spelling is not retained.
    pub fn register(&self, subject: &Identity, scope: Scope, payload: Payload) {
        let key = RecordKey::new(subject.clone(), scope);
        let record = Record {
            subject: subject.clone(),
            scope,
            payload,
        };
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, record);
    }

    /// Exact-match lookup. Absence is a normal outcome.
    pub fn lookup(&self, subject: &Identity, scope: &Scope) -> Option<Record> {
        #[cfg(test)]
        self.lookups.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let key = RecordKey::new(subject.clone(), *scope);
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn lookup_count(&self) -> usize {
        self.lookups.load(std::sync::atomic::Ordering::SeqCst)
    }
}
