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

//! Repository endpoint configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration text is not valid JSON for [`RepositoryConfig`]
    #[error("Invalid repository configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Base URL cannot be parsed
    #[error("Invalid repository base URL '{url}': {source}")]
    BaseUrl {
        /// The configured value
        url: String,
        /// Underlying parser error
        #[source]
        source: url::ParseError,
    },
}

/// Where generated submodels and their references are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepositoryConfig {
    /// Repository root, e.g. `http://localhost:8081`
    pub base_url: String,
    /// Path instances are posted to
    pub submodel_path: String,
    /// Path prefix reference lists live under; the AAS id is appended
    pub submodel_reference_path: String,
    /// Path prefix templates are fetched from; the encoded template id is appended
    pub template_path: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            submodel_path: "/submodels".to_string(),
            submodel_reference_path: "/submodel-references".to_string(),
            template_path: "/templates".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl RepositoryConfig {
    /// Start from the defaults
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::new()
    }

    /// Request timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Check that the base URL parses
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.base_url)
            .map(|_| ())
            .map_err(|source| ConfigError::BaseUrl {
                url: self.base_url.clone(),
                source,
            })
    }

    /// Absolute URL of `path` below the base URL
    ///
    /// Slashes between the two parts are normalized, so `http://host/api/`
    /// and `/submodels` give `http://host/api/submodels`.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
    }
}

impl std::str::FromStr for RepositoryConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: RepositoryConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

/// Fluent builder for [`RepositoryConfig`]
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    config: RepositoryConfig,
}

impl RepositoryConfigBuilder {
    /// Builder seeded with the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the repository root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the instance path
    pub fn with_submodel_path(mut self, path: impl Into<String>) -> Self {
        self.config.submodel_path = path.into();
        self
    }

    /// Set the reference path prefix
    pub fn with_submodel_reference_path(mut self, path: impl Into<String>) -> Self {
        self.config.submodel_reference_path = path.into();
        self
    }

    /// Set the template path prefix
    pub fn with_template_path(mut self, path: impl Into<String>) -> Self {
        self.config.template_path = path.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.config.request_timeout_ms = timeout_ms;
        self
    }

    /// Finish building
    pub fn build(self) -> RepositoryConfig {
        self.config
    }
}
