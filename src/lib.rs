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

//! Submodel template to instance mapping
//!
//! Populates asset administration shell submodel templates with values taken
//! from arbitrary JSON source data. What goes where is declared by qualifiers
//! inside the template itself, so no per-template code is needed.
//!
//! ```
//! use serde_json::json;
//! use smt_mapper::map_template_to_instance;
//!
//! let template = json!({
//!     "id": "urn:template",
//!     "kind": "Template",
//!     "submodelElements": [{
//!         "idShort": "Name",
//!         "modelType": "Property",
//!         "value": "",
//!         "qualifiers": [{"type": "SMT/MappingInfo", "value": "$.name"}]
//!     }]
//! });
//! let data = json!({"name": "Pump"});
//!
//! let instance = map_template_to_instance(&template, &data, "en", "urn:instance").unwrap();
//! assert_eq!(instance["id"], "urn:instance");
//! assert_eq!(instance["kind"], "Instance");
//! assert_eq!(instance["submodelElements"][0]["value"], "Pump");
//! ```

pub mod config;
pub mod document;
pub mod generator;
pub mod mapping;
pub mod path;
pub mod pipeline;

pub use config::{ConfigError, RepositoryConfig};
pub use document::{Document, DocumentError, NodeId};
pub use generator::{AasGenerator, GeneratorResult};
pub use mapping::{
    MappingError, MappingErrorKind, MappingResult, SubmodelMapper, map_template_to_instance,
};
pub use path::{JsonPath, ParseError, PathError, select_many, select_one};
