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

use crate::document::Document;
use crate::mapping::context::MappingContext;
use crate::mapping::error::{MappingError, MappingResult};
use crate::pipeline::PipelineStep;

/// Copies the template into the working document
#[derive(Debug, Clone, Copy, Default)]
pub struct CloneTemplateStep;

impl<'a> PipelineStep<MappingContext<'a>, MappingError> for CloneTemplateStep {
    fn name(&self) -> &'static str {
        "CloneTemplateStep"
    }

    fn execute(&self, mut context: MappingContext<'a>) -> MappingResult<MappingContext<'a>> {
        context.instance = Document::from_value(context.template());
        Ok(context)
    }
}
