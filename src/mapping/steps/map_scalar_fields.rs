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
use crate::mapping::element::{ModelType, keys};
use crate::mapping::error::{MappingError, MappingErrorKind, MappingResult};
use crate::mapping::qualifier::{Qualifier, QualifierType, select_qualifiers};
use crate::path;
use crate::pipeline::PipelineStep;
use serde_json::{Map, Value};

/// Writes source values into every element carrying `SMT/MappingInfo`
#[derive(Debug, Clone, Copy, Default)]
pub struct MapScalarFieldsStep;

impl<'a> PipelineStep<MappingContext<'a>, MappingError> for MapScalarFieldsStep {
    fn name(&self) -> &'static str {
        "MapScalarFieldsStep"
    }

    fn execute(&self, mut context: MappingContext<'a>) -> MappingResult<MappingContext<'a>> {
        let root = context.instance.root();
        let qualifiers = select_qualifiers(&context.instance, root, QualifierType::MappingInfo);
        for qualifier in qualifiers {
            // an earlier assignment may have replaced the subtree holding it
            if !context.instance.is_attached(qualifier) {
                continue;
            }
            context.set_qualifier(Some(qualifier));
            map_field(&mut context)?;
        }
        Ok(context)
    }
}

fn map_field(context: &mut MappingContext<'_>) -> MappingResult<()> {
    let Some(qualifier) = context.qualifier() else {
        return Ok(());
    };
    let view = Qualifier::new(&context.instance, qualifier);
    let owner = view.owning_element();
    let model_type = owner
        .and_then(|owner| context.instance.str_field(owner, keys::MODEL_TYPE))
        .map(ModelType::parse);
    let (Some(owner), Some(model_type)) = (owner, model_type) else {
        return Err(context.error(MappingErrorKind::structural(
            "could not find matching modelType field of a qualify object",
        )));
    };
    let mapping_path = view.value().map(str::to_string);
    let cardinality = view.cardinality();

    if model_type == ModelType::MultiLanguageProperty
        && context.instance.field(owner, keys::VALUE).is_none()
    {
        context
            .instance
            .set_field(owner, keys::VALUE, &Value::from(""))
            .map_err(|error| context.error(error))?;
    }
    if context.instance.field(owner, keys::VALUE).is_none() {
        return Err(context.error(MappingErrorKind::structural(
            "could not find matching value field of a qualify object",
        )));
    }
    let Some(mapping_path) = mapping_path else {
        return Err(context.error(MappingErrorKind::MissingMappingValue));
    };

    let Some(resolved) =
        path::select_one(context.data(), &mapping_path).map_err(|error| context.error(error))?
    else {
        if cardinality.is_mandatory() {
            return Err(context.error(MappingErrorKind::MandatoryMappingMissing {
                path: mapping_path,
            }));
        }
        return Ok(());
    };

    let value = match model_type {
        ModelType::MultiLanguageProperty => language_string(resolved, context.language()),
        _ => resolved.clone(),
    };
    context
        .instance
        .set_field(owner, keys::VALUE, &value)
        .map_err(|error| context.error(error))?;
    context.log(format!("Successfully mapped data from path '{mapping_path}'"));
    Ok(())
}

/// `[{"text": <text>, "language": <language>}]`
fn language_string(text: &Value, language: &str) -> Value {
    let mut entry = Map::new();
    entry.insert(keys::TEXT.to_string(), text.clone());
    entry.insert(keys::LANGUAGE.to_string(), Value::from(language));
    Value::Array(vec![Value::Object(entry)])
}
