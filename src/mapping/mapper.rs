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

//! Entry point for turning one template into one instance

use super::context::MappingContext;
use super::error::MappingResult;
use super::steps::mapping_pipeline;
use serde_json::Value;

/// Maps source data into submodel templates
///
/// Stateless; one value can serve any number of concurrent mappings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmodelMapper;

impl SubmodelMapper {
    /// Create a mapper
    pub fn new() -> Self {
        Self
    }

    /// Produce an instance of `template` populated from `data`
    ///
    /// `language` tags multi-language values and `new_id` replaces the
    /// template's `id`. Neither `template` nor `data` is modified.
    pub fn map(
        &self,
        template: &Value,
        data: &Value,
        language: &str,
        new_id: &str,
    ) -> MappingResult<Value> {
        let context = MappingContext::new(template, data, language, new_id);
        let context = mapping_pipeline().run(context)?;
        log::debug!(
            "Mapped template into instance {new_id} ({} log lines)",
            context.logs().len()
        );
        Ok(context.instance.to_value())
    }
}

/// Shorthand for [`SubmodelMapper::map`]
pub fn map_template_to_instance(
    template: &Value,
    data: &Value,
    language: &str,
    new_id: &str,
) -> MappingResult<Value> {
    SubmodelMapper::new().map(template, data, language, new_id)
}
