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

//! consent-gateway: A consent-gated data-access gateway.
//!
//! This library holds sensitive records keyed by (subject, scope) and releases
//! a record's payload to a requester only after an external consent authority
//! confirms that the subject granted the requester access to that scope.
//! Every failure mode collapses into a single, uninformative refusal.

pub mod authority;
pub mod config;
pub mod engine;
pub mod engine_core;
pub mod utils;

pub use engine::gateway::ConsentGateway;
pub use engine_core::errors::{ConsentError, GatewayError, Refusal};
pub use engine_core::models::{Identity, Payload, Record, Scope};
pub use engine_core::traits::ConsentAuthority;
