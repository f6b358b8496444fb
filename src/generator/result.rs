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

//! Per-template outcome of a generator run

use crate::mapping::MappingError;
use serde::{Deserialize, Serialize};

/// Diagnostics of a failed mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorErrorInfo {
    /// Mapping log up to the failure
    pub logs: Vec<String>,
    /// Qualifier being processed, as compact JSON
    pub qualifier: Option<String>,
    /// Location of that qualifier in the instance
    pub qualifier_path: Option<String>,
}

impl From<&MappingError> for GeneratorErrorInfo {
    fn from(error: &MappingError) -> Self {
        Self {
            logs: error.logs().to_vec(),
            qualifier: error.qualifier().map(ToString::to_string),
            qualifier_path: error.qualifier_path().map(str::to_string),
        }
    }
}

/// Outcome for one requested template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorResult {
    /// Template id as requested
    pub template_id: String,
    /// Whether the instance was stored and referenced
    pub success: bool,
    /// Failure message; empty on success
    pub message: String,
    /// Id of the stored instance; empty on failure
    pub generated_submodel_id: String,
    /// Mapping diagnostics, only for mapping failures
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_info: Option<GeneratorErrorInfo>,
}

impl GeneratorResult {
    /// Successful result
    pub fn succeeded(template_id: &str, generated_submodel_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.to_string(),
            success: true,
            message: String::new(),
            generated_submodel_id: generated_submodel_id.into(),
            error_info: None,
        }
    }

    /// Failed result with a message
    pub fn failed(template_id: &str, message: impl Into<String>) -> Self {
        Self {
            template_id: template_id.to_string(),
            success: false,
            message: message.into(),
            generated_submodel_id: String::new(),
            error_info: None,
        }
    }

    /// Failed result for a mapping error, carrying its diagnostics
    pub fn mapping_failed(template_id: &str, error: &MappingError) -> Self {
        Self {
            error_info: Some(GeneratorErrorInfo::from(error)),
            ..Self::failed(template_id, error.message())
        }
    }
}

/// `ModelReference` to a submodel, as posted to the reference list of an AAS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmodelReference {
    /// Reference keys
    pub keys: Vec<Key>,
    /// Reference type
    #[serde(rename = "type")]
    pub reference_type: String,
}

/// One key of a [`SubmodelReference`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Key type
    #[serde(rename = "type")]
    pub key_type: String,
    /// Referenced id
    pub value: String,
}

impl SubmodelReference {
    /// Reference to the submodel with `id`
    pub fn to_submodel(id: impl Into<String>) -> Self {
        Self {
            keys: vec![Key {
                key_type: "Submodel".to_string(),
                value: id.into(),
            }],
            reference_type: "ModelReference".to_string(),
        }
    }
}
