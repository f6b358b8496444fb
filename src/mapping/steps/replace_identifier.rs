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
use crate::mapping::element::keys;
use crate::mapping::error::{MappingError, MappingErrorKind, MappingResult};
use crate::pipeline::PipelineStep;
use serde_json::Value;

/// Writes the new identifier over the template's `id`
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceIdentifierStep;

impl<'a> PipelineStep<MappingContext<'a>, MappingError> for ReplaceIdentifierStep {
    fn name(&self) -> &'static str {
        "ReplaceIdentifierStep"
    }

    fn execute(&self, mut context: MappingContext<'a>) -> MappingResult<MappingContext<'a>> {
        let root = context.instance.root();
        let Some(id) = context.instance.field(root, keys::ID) else {
            return Err(context.error(MappingErrorKind::MissingIdentifierField));
        };
        let new_id = Value::from(context.new_id());
        context.instance.replace_value(id, &new_id);
        Ok(context)
    }
}
