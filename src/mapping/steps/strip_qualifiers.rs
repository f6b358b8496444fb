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
use crate::mapping::error::{MappingError, MappingResult};
use crate::pipeline::PipelineStep;
use serde_json::Value;

/// Empties the submodel's own `qualifiers`; element qualifiers stay
#[derive(Debug, Clone, Copy, Default)]
pub struct StripQualifiersStep;

impl<'a> PipelineStep<MappingContext<'a>, MappingError> for StripQualifiersStep {
    fn name(&self) -> &'static str {
        "StripQualifiersStep"
    }

    fn execute(&self, mut context: MappingContext<'a>) -> MappingResult<MappingContext<'a>> {
        let root = context.instance.root();
        if context.instance.field(root, keys::QUALIFIERS).is_some() {
            context
                .instance
                .set_field(root, keys::QUALIFIERS, &Value::Array(Vec::new()))
                .map_err(|error| context.error(error))?;
        }
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    fn run(template: Value) -> Value {
        let data = json!({});
        let mut context = MappingContext::new(&template, &data, "en", "n");
        context.instance = Document::from_value(&template);
        StripQualifiersStep.execute(context).unwrap().instance.to_value()
    }

    #[test]
    fn test_only_top_level_qualifiers_are_cleared() {
        let template = json!({
            "qualifiers": [{"type": "SMT/Cardinality", "value": "One"}],
            "submodelElements": [{"idShort": "A", "qualifiers": [{"type": "x"}]}]
        });
        assert_eq!(
            run(template),
            json!({
                "qualifiers": [],
                "submodelElements": [{"idShort": "A", "qualifiers": [{"type": "x"}]}]
            })
        );
    }

    #[test]
    fn test_absent_qualifiers_are_not_added() {
        assert_eq!(run(json!({"id": "x"})), json!({"id": "x"}));
    }
}
