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

//! Mapping qualifiers and the selectors that find them

use super::element::keys;
use crate::document::{Document, NodeId, NodeRef};
use crate::path::{FilterExpr, JsonPath, Segment, Selector};
use once_cell::sync::Lazy;
use std::fmt;

/// Qualifier `type` tags the mapper understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualifierType {
    /// Field whose value is resolved from the source data
    MappingInfo,
    /// Collection element repeated once per source array entry
    CollectionMappingInfo,
    /// `One...` marks the sibling mapping as mandatory
    Cardinality,
    /// Collection qualifier already expanded during the current pass
    ProcessedCollectionMappingInfo,
}

impl QualifierType {
    /// All known tags
    pub const ALL: [QualifierType; 4] = [
        QualifierType::MappingInfo,
        QualifierType::CollectionMappingInfo,
        QualifierType::Cardinality,
        QualifierType::ProcessedCollectionMappingInfo,
    ];

    /// The `type` string
    pub fn tag(self) -> &'static str {
        match self {
            QualifierType::MappingInfo => "SMT/MappingInfo",
            QualifierType::CollectionMappingInfo => "SMT/CollectionMappingInfo",
            QualifierType::Cardinality => "SMT/Cardinality",
            QualifierType::ProcessedCollectionMappingInfo => "_SMT/CollectionMappingInfo",
        }
    }

    /// Recognize a `type` string
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Selector for every qualifier of this type below the evaluation root
    pub fn selector(self) -> &'static JsonPath {
        match self {
            QualifierType::MappingInfo => &*MAPPING_INFO,
            QualifierType::CollectionMappingInfo => &*COLLECTION_MAPPING_INFO,
            QualifierType::Cardinality => &*CARDINALITY,
            QualifierType::ProcessedCollectionMappingInfo => &*PROCESSED_COLLECTION_MAPPING_INFO,
        }
    }
}

impl fmt::Display for QualifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn type_is(kind: QualifierType) -> FilterExpr {
    FilterExpr::field_equals(keys::TYPE, kind.tag())
}

/// `$..qualifiers[?(<filter>)]`
fn qualifiers_where(filter: FilterExpr) -> JsonPath {
    let segments = vec![
        Segment::Descendant(Selector::Name(keys::QUALIFIERS.to_string())),
        Segment::Child(Selector::Filter(filter)),
    ];
    let expression = format!("${}", segments.iter().map(ToString::to_string).collect::<String>());
    JsonPath::from_segments(expression, segments)
}

static MAPPING_INFO: Lazy<JsonPath> = Lazy::new(|| qualifiers_where(type_is(QualifierType::MappingInfo)));

static COLLECTION_MAPPING_INFO: Lazy<JsonPath> =
    Lazy::new(|| qualifiers_where(type_is(QualifierType::CollectionMappingInfo)));

static CARDINALITY: Lazy<JsonPath> = Lazy::new(|| qualifiers_where(type_is(QualifierType::Cardinality)));

static PROCESSED_COLLECTION_MAPPING_INFO: Lazy<JsonPath> =
    Lazy::new(|| qualifiers_where(type_is(QualifierType::ProcessedCollectionMappingInfo)));

/// Qualifiers whose value carries an iterable path
static INDEXED: Lazy<JsonPath> = Lazy::new(|| {
    qualifiers_where(
        type_is(QualifierType::MappingInfo).or(type_is(QualifierType::CollectionMappingInfo)),
    )
});

/// Cardinality qualifier among the elements of a `qualifiers` array
static SIBLING_CARDINALITY: Lazy<JsonPath> = Lazy::new(|| {
    let segments = vec![Segment::Child(Selector::Filter(type_is(QualifierType::Cardinality)))];
    let expression = format!("${}", segments[0]);
    JsonPath::from_segments(expression, segments)
});

/// Whether a mapping must find a source value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    /// Missing source values are skipped
    #[default]
    Optional,
    /// Missing source values fail the mapping
    Mandatory,
}

impl Cardinality {
    /// Interpret an `SMT/Cardinality` value such as `One` or `OneToMany`
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(value) if value.starts_with("One") => Cardinality::Mandatory,
            _ => Cardinality::Optional,
        }
    }

    /// Whether this is [`Cardinality::Mandatory`]
    pub fn is_mandatory(self) -> bool {
        self == Cardinality::Mandatory
    }
}

/// Read-only view of a qualifier node
#[derive(Debug, Clone, Copy)]
pub struct Qualifier<'d> {
    document: &'d Document,
    id: NodeId,
}

impl<'d> Qualifier<'d> {
    /// View the qualifier at `id`
    pub fn new(document: &'d Document, id: NodeId) -> Self {
        Self { document, id }
    }

    /// Node handle
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Recognized type tag
    pub fn qualifier_type(&self) -> Option<QualifierType> {
        self.document
            .str_field(self.id, keys::TYPE)
            .and_then(QualifierType::from_tag)
    }

    /// String `value`, if present
    pub fn value(&self) -> Option<&'d str> {
        self.document.str_field(self.id, keys::VALUE)
    }

    /// The `qualifiers` array holding this qualifier
    pub fn container(&self) -> Option<NodeId> {
        self.document.parent(self.id)
    }

    /// Element annotated by this qualifier
    pub fn owning_element(&self) -> Option<NodeId> {
        self.document.ancestor(self.id, 2)
    }

    /// Cardinality from the first sibling `SMT/Cardinality` qualifier
    pub fn cardinality(&self) -> Cardinality {
        let value = self.container().and_then(|container| {
            SIBLING_CARDINALITY
                .select(self.document.node(container))
                .into_iter()
                .find_map(|sibling| self.document.str_field(sibling.id(), keys::VALUE))
        });
        Cardinality::from_value(value)
    }
}

/// Qualifiers of `kind` in the subtree rooted at `scope`, in document order
pub fn select_qualifiers(document: &Document, scope: NodeId, kind: QualifierType) -> Vec<NodeId> {
    select_with(document, scope, kind.selector())
}

/// Mapping and collection qualifiers in the subtree rooted at `scope`
pub fn select_indexed_qualifiers(document: &Document, scope: NodeId) -> Vec<NodeId> {
    select_with(document, scope, &*INDEXED)
}

fn select_with(document: &Document, scope: NodeId, path: &JsonPath) -> Vec<NodeId> {
    path.select(document.node(scope))
        .into_iter()
        .map(NodeRef::id)
        .collect()
}
