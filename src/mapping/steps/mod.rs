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

//! Mapping passes in execution order

mod clone_template;
mod expand_collections;
mod map_scalar_fields;
mod mark_instance;
mod replace_identifier;
mod strip_qualifiers;

pub use clone_template::CloneTemplateStep;
pub use expand_collections::{CollectionBinding, ExpandCollectionsStep};
pub use map_scalar_fields::MapScalarFieldsStep;
pub use mark_instance::MarkAsInstanceStep;
pub use replace_identifier::ReplaceIdentifierStep;
pub use strip_qualifiers::StripQualifiersStep;

use super::context::MappingContext;
use super::error::MappingError;
use crate::pipeline::Pipeline;

/// The fixed template-to-instance pipeline
pub fn mapping_pipeline<'a>() -> Pipeline<MappingContext<'a>, MappingError> {
    Pipeline::builder()
        .step(CloneTemplateStep)
        .step(MarkAsInstanceStep)
        .step(ExpandCollectionsStep)
        .step(MapScalarFieldsStep)
        .step(StripQualifiersStep)
        .step(ReplaceIdentifierStep)
        .build()
}
