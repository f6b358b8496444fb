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

use crate::mapping::context::MappingContext;
use crate::mapping::element::{KIND_INSTANCE, keys};
use crate::mapping::error::{MappingError, MappingResult};
use crate::pipeline::PipelineStep;
use serde_json::Value;

/// Sets the submodel `kind` to `Instance`, adding the member when missing
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkAsInstanceStep;

impl<'a> PipelineStep<MappingContext<'a>, MappingError> for MarkAsInstanceStep {
    fn name(&self) -> &'static str {
        "MarkAsInstanceStep"
    }

    fn execute(&self, mut context: MappingContext<'a>) -> MappingResult<MappingContext<'a>> {
        let root = context.instance.root();
        context
            .instance
            .set_field(root, keys::KIND, &Value::from(KIND_INSTANCE))
            .map_err(|error| context.error(error))?;
        Ok(context)
    }
}
