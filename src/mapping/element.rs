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

//! Submodel element vocabulary

use std::fmt;

/// Element member names the passes read or write
pub mod keys {
    /// Element short name
    pub const ID_SHORT: &str = "idShort";
    /// Element type discriminator
    pub const MODEL_TYPE: &str = "modelType";
    /// Element payload
    pub const VALUE: &str = "value";
    /// Annotation list
    pub const QUALIFIERS: &str = "qualifiers";
    /// Qualifier type tag
    pub const TYPE: &str = "type";
    /// Template or instance marker on the submodel
    pub const KIND: &str = "kind";
    /// Submodel identifier
    pub const ID: &str = "id";
    /// Multi-language text entry
    pub const TEXT: &str = "text";
    /// Multi-language language tag
    pub const LANGUAGE: &str = "language";
}

/// Submodel `kind` value written by the instance marker pass
pub const KIND_INSTANCE: &str = "Instance";

/// `modelType` of an element, as far as mapping cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelType {
    /// Container that collection qualifiers can expand
    SubmodelElementCollection,
    /// Value is a list of `{text, language}` entries
    MultiLanguageProperty,
    /// Anything else; receives resolved values as-is
    Other(String),
}

impl ModelType {
    /// Classify a `modelType` string
    pub fn parse(model_type: &str) -> Self {
        match model_type {
            "SubmodelElementCollection" => ModelType::SubmodelElementCollection,
            "MultiLanguageProperty" => ModelType::MultiLanguageProperty,
            other => ModelType::Other(other.to_string()),
        }
    }

    /// The `modelType` string
    pub fn as_str(&self) -> &str {
        match self {
            ModelType::SubmodelElementCollection => "SubmodelElementCollection",
            ModelType::MultiLanguageProperty => "MultiLanguageProperty",
            ModelType::Other(name) => name,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
