// Copyright 2024 OctoFHIR Team
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

//! Collaborators the generator talks to
//!
//! The generator only sees these traits; [`super::http`] and [`super::id`]
//! hold the default implementations.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure reported by a collaborator
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote side answered with a non-success status
    #[error("Repository responded with status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body as text
        body: String,
    },

    /// Endpoint could not be built
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Payload could not be decoded
    #[error("Invalid JSON payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Free-form error
    pub fn other(message: impl Into<String>) -> Self {
        ProviderError::Other(message.into())
    }
}

/// Source of submodel templates
#[async_trait]
pub trait TemplateProvider: Send + Sync {
    /// Fetch a template by its base64url-encoded (unpadded) id
    async fn fetch_template(&self, encoded_template_id: &str) -> Result<Value, ProviderError>;
}

/// Source of fresh submodel identifiers
#[async_trait]
pub trait IdGenerator: Send + Sync {
    /// Generate `count` unique identifiers
    async fn generate_ids(&self, count: u32) -> Result<Vec<String>, ProviderError>;
}

/// Write access to the repository
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// POST `body` (JSON text) to `path`, returning the response body
    async fn post(&self, path: &str, body: String) -> Result<String, ProviderError>;
}
