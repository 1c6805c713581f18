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

// HTTP client for remote consent checks over JSON-RPC 2.0

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::Config;
use crate::engine_core::constants::jsonrpc;
use crate::engine_core::errors::{ConsentError, GatewayError};
use crate::engine_core::models::ConsentQuery;
use crate::engine_core::traits::ConsentAuthority;

/// JSON-RPC 2.0 error structure
#[derive(Debug, Clone, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 response structure
#[derive(Debug, Clone, Deserialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
    #[serde(default)]
    id: Option<Value>,
}

/// Remote consent authority reached over HTTP.
///
/// Uses JSON-RPC 2.0 with connection pooling. The call is read-only and
/// idempotent; it is never retried here.
pub struct HttpConsentAuthority {
    http_client: Client,
    url: String,
    request_timeout: Duration,
}

impl HttpConsentAuthority {
    pub fn new(
        url: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http_client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .tcp_nodelay(true)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                GatewayError::ConfigurationError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            url: url.into(),
            request_timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let url = config.authority_url.clone().ok_or_else(|| {
            GatewayError::ConfigurationError("No consent authority URL configured".to_string())
        })?;
        Self::new(url, config.consent_check_timeout(), config.connect_timeout())
    }

    fn parse_verdict(response: JsonRpcResponse, request_id: &str) -> Result<bool, ConsentError> {
        if response.jsonrpc != jsonrpc::VERSION {
            return Err(ConsentError::Malformed(format!(
                "Invalid JSON-RPC version: {}",
                response.jsonrpc
            )));
        }

        if let Some(error) = response.error {
            return Err(ConsentError::Rejected {
                code: error.code,
                message: error.message,
            });
        }

        match response.id {
            Some(Value::String(ref id)) if id == request_id => {}
            other => {
                return Err(ConsentError::Malformed(format!(
                    "Response id {:?} does not match request",
                    other
                )))
            }
        }

        match response.result {
            Some(Value::Bool(verdict)) => Ok(verdict),
            Some(other) => Err(ConsentError::Malformed(format!(
                "Expected boolean result, got {}",
                other
            ))),
            None => Err(ConsentError::Malformed(
                "Response has neither result nor error".to_string(),
            )),
        }
    }
}

#[async_trait]
impl ConsentAuthority for HttpConsentAuthority {
    async fn check_consent(&self, query: &ConsentQuery) -> Result<bool, ConsentError> {
        let request_id = Uuid::new_v4().to_string();

        let request = serde_json::json!({
            "jsonrpc": jsonrpc::VERSION,
            "method": jsonrpc::METHOD_CHECK_CONSENT,
            "params": {
                "subject": query.subject,
                "scope": query.scope,
                "requester": query.requester,
            },
            "id": request_id
        });

        debug!(
            url = %self.url,
            request_id = %request_id,
            "Sending consent check"
        );

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ConsentError::Timeout(self.request_timeout)
                } else if e.is_connect() {
                    ConsentError::Transport("Connection failed".to_string())
                } else {
                    ConsentError::Transport(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, url = %self.url, "Consent authority returned HTTP error");
            return Err(ConsentError::Transport(format!(
                "Consent authority error: HTTP {}",
                status
            )));
        }

        let body: JsonRpcResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ConsentError::Timeout(self.request_timeout)
            } else {
                ConsentError::Malformed(format!("Failed to parse response: {}", e))
            }
        })?;

        Self::parse_verdict(body, &request_id)
    }
}
