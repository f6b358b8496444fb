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

//! reqwest-backed collaborators

use super::provider::{ProviderError, RepositoryClient, TemplateProvider};
use crate::config::RepositoryConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

fn build_client(config: &RepositoryConfig) -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?)
}

/// Turn a non-success response into [`ProviderError::Status`]
async fn checked_body(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Posts JSON documents below the configured base URL
#[derive(Debug, Clone)]
pub struct HttpRepositoryClient {
    config: RepositoryConfig,
    client: reqwest::Client,
}

impl HttpRepositoryClient {
    /// Client for the configured repository
    pub fn new(config: RepositoryConfig) -> Result<Self, ProviderError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl RepositoryClient for HttpRepositoryClient {
    async fn post(&self, path: &str, body: String) -> Result<String, ProviderError> {
        let url = self.config.endpoint(path)?;
        log::debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        checked_body(response).await
    }
}

/// Fetches templates from `<base URL>/<template path>/<encoded id>`
#[derive(Debug, Clone)]
pub struct HttpTemplateProvider {
    config: RepositoryConfig,
    client: reqwest::Client,
}

impl HttpTemplateProvider {
    /// Provider for the configured repository
    pub fn new(config: RepositoryConfig) -> Result<Self, ProviderError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TemplateProvider for HttpTemplateProvider {
    async fn fetch_template(&self, encoded_template_id: &str) -> Result<Value, ProviderError> {
        let path = format!(
            "{}/{}",
            self.config.template_path.trim_end_matches('/'),
            encoded_template_id
        );
        let url = self.config.endpoint(&path)?;
        log::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        let body = checked_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
