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

//! Repeats collection elements once per entry of their source array
//!
//! Each round expands the collection qualifier with the fewest `[*]` in its
//! path, so outer collections are expanded before the collections nested in
//! them. Copies get their iterated paths rewritten to concrete indexes, which
//! turns `$.a[*].b[*]` inside copy `i` into `$.a[i].b[*]` for a later round.
//! Rounds repeat until no collection qualifier is left in the document.

use crate::document::NodeId;
use crate::mapping::context::MappingContext;
use crate::mapping::element::{ModelType, keys};
use crate::mapping::error::{MappingError, MappingErrorKind, MappingResult};
use crate::mapping::qualifier::{
    Qualifier, QualifierType, select_indexed_qualifiers, select_qualifiers,
};
use crate::path;
use crate::pipeline::PipelineStep;
use serde_json::Value;

const WILDCARD: &str = "[*]";
const FIRST_INDEX: &str = "[0]";

/// Expands every `SMT/CollectionMappingInfo` element
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandCollectionsStep;

impl<'a> PipelineStep<MappingContext<'a>, MappingError> for ExpandCollectionsStep {
    fn name(&self) -> &'static str {
        "ExpandCollectionsStep"
    }

    fn execute(&self, mut context: MappingContext<'a>) -> MappingResult<MappingContext<'a>> {
        while expand_next(&mut context)? {}
        context.set_qualifier(None);
        restore_markers(&mut context);
        Ok(context)
    }
}

/// How a collection path drives repetition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionBinding {
    /// Path whose match count is the number of copies
    pub count_path: String,
    /// Prefix whose `[*]` gets replaced by the copy index
    pub list_identifier: String,
}

impl CollectionBinding {
    /// Derive the binding from a collection mapping path
    ///
    /// The driving array is the part of the path up to and including its
    /// last `[*]`; a path without `[*]` names the array itself.
    pub fn from_mapping_path(mapping_path: &str) -> Self {
        let driver = match mapping_path.rfind(WILDCARD) {
            Some(position) => &mapping_path[..position + WILDCARD.len()],
            None => mapping_path,
        };
        let list_identifier = driver.strip_suffix(WILDCARD).unwrap_or(driver);
        let pinned = driver.replace(WILDCARD, FIRST_INDEX);
        let base = pinned.strip_suffix(FIRST_INDEX).unwrap_or(&pinned);
        Self {
            count_path: format!("{base}{WILDCARD}"),
            list_identifier: list_identifier.to_string(),
        }
    }

    /// Whether a qualifier path iterates over this binding's list
    pub fn applies_to(&self, path: &str) -> bool {
        path.starts_with(&self.list_identifier)
    }

    /// Pin the list's wildcard in `path` to `index`
    pub fn bind(&self, path: &str, index: usize) -> String {
        path.replace(
            &format!("{}{WILDCARD}", self.list_identifier),
            &format!("{}[{index}]", self.list_identifier),
        )
    }
}

fn wildcard_count(path: Option<&str>) -> usize {
    path.map_or(0, |path| path.matches(WILDCARD).count())
}

/// Expand one collection; false once none is left
fn expand_next(context: &mut MappingContext<'_>) -> MappingResult<bool> {
    let root = context.instance.root();
    let Some(qualifier) = select_qualifiers(
        &context.instance,
        root,
        QualifierType::CollectionMappingInfo,
    )
    .into_iter()
    .min_by_key(|id| wildcard_count(context.instance.str_field(*id, keys::VALUE))) else {
        return Ok(false);
    };
    context.set_qualifier(Some(qualifier));

    let view = Qualifier::new(&context.instance, qualifier);
    let owner = view
        .owning_element()
        .ok_or_else(|| context.error(missing_model_type()))?;
    let model_type = context
        .instance
        .str_field(owner, keys::MODEL_TYPE)
        .map(ModelType::parse)
        .ok_or_else(|| context.error(missing_model_type()))?;
    if model_type != ModelType::SubmodelElementCollection {
        return Err(context.error(MappingErrorKind::structural(format!(
            "Expected modelType 'SubmodelElementCollection', but found '{model_type}'."
        ))));
    }
    let container = context.instance.parent(owner).ok_or_else(|| {
        context.error(MappingErrorKind::structural(
            "could not find matching value field of a qualify object",
        ))
    })?;
    let mapping_path = view
        .value()
        .ok_or_else(|| context.error(MappingErrorKind::MissingMappingValue))?
        .to_string();
    let cardinality = view.cardinality();

    let binding = CollectionBinding::from_mapping_path(&mapping_path);
    let count = path::select_many(context.data(), &binding.count_path, cardinality.is_mandatory())
        .map_err(|error| context.error(error))?
        .len();

    for index in 0..count {
        let copy = context.instance.deep_clone(owner);
        prepare_copy(context, copy, &mapping_path, &binding, index)?;
        context
            .instance
            .append_child(container, copy)
            .map_err(|error| context.error(error))?;
    }

    context
        .instance
        .set_field(
            qualifier,
            keys::TYPE,
            &Value::from(QualifierType::ProcessedCollectionMappingInfo.tag()),
        )
        .map_err(|error| context.error(error))?;
    context.instance.remove_node(owner);

    context.log(format!(
        "Successfully duplicated {count} elements for collection with mapping path '{mapping_path}'"
    ));
    Ok(true)
}

/// Detach the triggering qualifier, suffix `idShort` and pin iterated paths
fn prepare_copy(
    context: &mut MappingContext<'_>,
    copy: NodeId,
    mapping_path: &str,
    binding: &CollectionBinding,
    index: usize,
) -> MappingResult<()> {
    let triggering: Vec<NodeId> =
        select_qualifiers(&context.instance, copy, QualifierType::CollectionMappingInfo)
            .into_iter()
            .filter(|id| context.instance.str_field(*id, keys::VALUE) == Some(mapping_path))
            .collect();
    for id in triggering {
        context.instance.remove_node(id);
    }

    if let Some(id_short) = context
        .instance
        .str_field(copy, keys::ID_SHORT)
        .map(str::to_string)
    {
        context
            .instance
            .set_field(copy, keys::ID_SHORT, &Value::from(format!("{id_short}_{index}")))
            .map_err(|error| context.error(error))?;
    }

    let iterated: Vec<(NodeId, String)> = select_indexed_qualifiers(&context.instance, copy)
        .into_iter()
        .filter_map(|id| {
            let value = context.instance.str_field(id, keys::VALUE)?;
            binding
                .applies_to(value)
                .then(|| (id, binding.bind(value, index)))
        })
        .collect();
    for (id, value) in iterated {
        context
            .instance
            .set_field(id, keys::VALUE, &Value::from(value))
            .map_err(|error| context.error(error))?;
    }
    Ok(())
}

/// Turn processed markers back into collection qualifiers
fn restore_markers(context: &mut MappingContext<'_>) {
    let root = context.instance.root();
    let markers = select_qualifiers(
        &context.instance,
        root,
        QualifierType::ProcessedCollectionMappingInfo,
    );
    for marker in markers {
        if let Some(tag) = context.instance.field(marker, keys::TYPE) {
            context
                .instance
                .replace_value(tag, &Value::from(QualifierType::CollectionMappingInfo.tag()));
        }
    }
}

fn missing_model_type() -> MappingErrorKind {
    MappingErrorKind::structural("could not find matching modelType field of a qualify object")
}
