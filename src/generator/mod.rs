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

//! Batch generation of submodel instances for an asset administration shell
//!
//! For every requested template the generator fetches the template, draws a
//! fresh id, maps the source data into it and stores the instance together
//! with a reference from the shell. Templates are processed concurrently and
//! independently; a failure only affects the result of its own template.

pub mod http;
pub mod id;
pub mod provider;
pub mod result;

pub use http::{HttpRepositoryClient, HttpTemplateProvider};
pub use id::TimestampIdGenerator;
pub use provider::{IdGenerator, ProviderError, RepositoryClient, TemplateProvider};
pub use result::{GeneratorErrorInfo, GeneratorResult, Key, SubmodelReference};

use crate::config::RepositoryConfig;
use crate::mapping::SubmodelMapper;
use crate::mapping::element::keys;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;

/// Encode a template id the way template providers expect it
pub fn encode_template_id(template_id: &str) -> String {
    URL_SAFE_NO_PAD.encode(template_id.as_bytes())
}

/// Fills templates with data and stores the instances in the repository
#[derive(Clone)]
pub struct AasGenerator {
    mapper: SubmodelMapper,
    repository: Arc<dyn RepositoryClient>,
    templates: Arc<dyn TemplateProvider>,
    ids: Arc<dyn IdGenerator>,
    config: RepositoryConfig,
}

impl AasGenerator {
    /// Generator over the given collaborators
    pub fn new(
        repository: Arc<dyn RepositoryClient>,
        templates: Arc<dyn TemplateProvider>,
        ids: Arc<dyn IdGenerator>,
        config: RepositoryConfig,
    ) -> Self {
        Self {
            mapper: SubmodelMapper::new(),
            repository,
            templates,
            ids,
            config,
        }
    }

    /// Generator using the HTTP collaborators for `config`
    pub fn with_http(
        config: RepositoryConfig,
        id_prefix: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let repository = Arc::new(HttpRepositoryClient::new(config.clone())?);
        let templates = Arc::new(HttpTemplateProvider::new(config.clone())?);
        let ids = Arc::new(TimestampIdGenerator::new(id_prefix));
        Ok(Self::new(repository, templates, ids, config))
    }

    /// Repository configuration in use
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Generate one instance per template id and attach it to the shell
    ///
    /// `aas_id` is the base64url-encoded shell id used in the reference path.
    /// Results come back in the order of `template_ids`.
    pub async fn add_data_to_aas(
        &self,
        aas_id: &str,
        template_ids: &[String],
        data: &Value,
        language: &str,
    ) -> Vec<GeneratorResult> {
        join_all(
            template_ids
                .iter()
                .map(|template_id| self.generate(aas_id, template_id, data, language)),
        )
        .await
    }

    async fn generate(
        &self,
        aas_id: &str,
        template_id: &str,
        data: &Value,
        language: &str,
    ) -> GeneratorResult {
        let template = match self.templates.fetch_template(&encode_template_id(template_id)).await {
            Ok(template) => template,
            Err(error) => {
                log::error!(
                    "Failed to fetch template from custom template provider. TemplateId: {template_id}, Message: {error}"
                );
                return GeneratorResult::failed(
                    template_id,
                    format!("Failed to fetch template from custom template provider: {error}"),
                );
            }
        };

        if template.get(keys::ID_SHORT).and_then(Value::as_str).is_none() {
            return GeneratorResult::failed(
                template_id,
                format!("template idShort of {template_id} needs to be not null"),
            );
        }

        let new_id = match self.next_id().await {
            Ok(new_id) => new_id,
            Err(error) => {
                log::error!(
                    "Could not generate submodel id. TemplateId: {template_id}, Message: {error}"
                );
                return GeneratorResult::failed(template_id, "could not generate submodel id");
            }
        };

        let instance = match self.mapper.map(&template, data, language, &new_id) {
            Ok(instance) => instance,
            Err(error) => {
                log::error!(
                    "Failed to map data to instance. TemplateId: {template_id}, Message: {error}"
                );
                return GeneratorResult::mapping_failed(template_id, &error);
            }
        };

        if let Err(message) = self.store(aas_id, &instance).await {
            log::error!(
                "Failed to add submodel to AAS. TemplateId: {template_id}, AasId: {aas_id}, Message: {message}"
            );
            return GeneratorResult::failed(template_id, message);
        }

        GeneratorResult::succeeded(template_id, new_id)
    }

    async fn next_id(&self) -> Result<String, ProviderError> {
        self.ids
            .generate_ids(1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::other("id generator returned no ids"))
    }

    /// Post the instance and its reference; the error is the result message
    async fn store(&self, aas_id: &str, instance: &Value) -> Result<(), String> {
        if aas_id.trim().is_empty() {
            return Err("The aas id cannot be empty!".to_string());
        }
        let submodel_id = instance
            .get(keys::ID)
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| "The submodel id cannot be empty!".to_string())?;

        self.repository
            .post(&self.config.submodel_path, instance.to_string())
            .await
            .map_err(|error| error.to_string())?;

        let reference = serde_json::to_string(&SubmodelReference::to_submodel(submodel_id))
            .map_err(|error| error.to_string())?;
        let reference_path = format!(
            "{}/{}",
            self.config.submodel_reference_path.trim_end_matches('/'),
            aas_id
        );
        self.repository
            .post(&reference_path, reference)
            .await
            .map_err(|error| error.to_string())?;
        Ok(())
    }
}
