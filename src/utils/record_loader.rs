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

// YAML record seeding - Load records.yaml into a gateway

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::engine::gateway::ConsentGateway;
use crate::engine_core::errors::GatewayError;
use crate::engine_core::models::{Identity, Payload, Scope};

/// Container for records.yaml root structure
#[derive(Debug, Deserialize)]
struct RecordsYaml {
    #[serde(default)]
    records: Vec<RecordEntry>,
}

/// One record; exactly one of `scope` (hex) or `scope_label` must be set
#[derive(Debug, Deserialize)]
struct RecordEntry {
    subject: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    scope_label: Option<String>,
    payload: Payload,
}

/// A fully resolved seed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRecord {
    pub subject: Identity,
    pub scope: Scope,
    pub payload: Payload,
}

/// Record loader - validated seed records ready for registration
#[derive(Debug, Default)]
pub struct RecordLoader {
    records: Vec<SeedRecord>,
}

impl RecordLoader {
    /// Load records from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GatewayError> {
        let path_ref = path.as_ref();

        let yaml_content = fs::read_to_string(path_ref).map_err(|e| {
            GatewayError::RecordLoadError(format!(
                "Failed to read records file {:?}: {}",
                path_ref, e
            ))
        })?;

        Self::from_yaml(&yaml_content)
    }

    /// Parse records from a YAML document. Every entry is validated before
    /// any is accepted.
    pub fn from_yaml(yaml_content: &str) -> Result<Self, GatewayError> {
        let parsed: RecordsYaml = serde_yaml_ng::from_str(yaml_content).map_err(|e| {
            GatewayError::RecordLoadError(format!("Failed to parse records YAML: {}", e))
        })?;

        let records = parsed
            .records
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let scope = Self::resolve_scope(index, &entry)?;
                Ok(SeedRecord {
                    subject: Identity::new(&entry.subject),
                    scope,
                    payload: entry.payload,
                })
            })
            .collect::<Result<Vec<_>, GatewayError>>()?;

        Ok(Self { records })
    }

    fn resolve_scope(index: usize, entry: &RecordEntry) -> Result<Scope, GatewayError> {
        match (&entry.scope, &entry.scope_label) {
            (Some(hex), None) => Scope::from_hex(hex).map_err(|e| {
                GatewayError::RecordLoadError(format!("Record #{}: {}", index, e))
            }),
            (None, Some(label)) => Ok(Scope::from_label(label)),
            (Some(_), Some(_)) => Err(GatewayError::RecordLoadError(format!(
                "Record #{}: set either 'scope' or 'scope_label', not both",
                index
            ))),
            (None, None) => Err(GatewayError::RecordLoadError(format!(
                "Record #{}: missing 'scope' or 'scope_label'",
                index
            ))),
        }
    }

    pub fn records(&self) -> &[SeedRecord] {
        &self.records
    }

    /// Register every loaded record. Later entries for the same key win.
    pub fn register_into(&self, gateway: &ConsentGateway) -> usize {
        for record in &self.records {
            gateway.register(record.subject.clone(), record.scope, record.payload.clone());
        }
        info!(count = self.records.len(), "Seed records registered");
        self.records.len()
    }
}
