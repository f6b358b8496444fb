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

//! Borrowed node handle used for path evaluation over a [`Document`]

use super::arena::{Document, NodeId, NodeKind};
use crate::path::Navigable;
use serde_json::Value;
use std::fmt;

/// A node together with the document it belongs to
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    document: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(document: &'a Document, id: NodeId) -> Self {
        Self { document, id }
    }

    /// Node handle
    pub fn id(self) -> NodeId {
        self.id
    }

    /// Owning document
    pub fn document(self) -> &'a Document {
        self.document
    }

    fn wrap(self, id: NodeId) -> Self {
        Self { id, ..self }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.document, other.document)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef").field("id", &self.id).finish()
    }
}

impl<'a> Navigable<'a> for NodeRef<'a> {
    fn field(self, name: &str) -> Option<Self> {
        self.document.field(self.id, name).map(|id| self.wrap(id))
    }

    fn element(self, index: usize) -> Option<Self> {
        self.document
            .elements(self.id)
            .get(index)
            .map(|id| self.wrap(*id))
    }

    fn children(self) -> Vec<Self> {
        self.document
            .children(self.id)
            .into_iter()
            .map(|id| self.wrap(id))
            .collect()
    }

    fn scalar(self) -> Option<&'a Value> {
        match self.document.kind(self.id) {
            NodeKind::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::JsonPath;
    use serde_json::json;

    #[test]
    fn test_path_over_document_matches_path_over_value() {
        let value = json!({
            "submodelElements": [
                {"idShort": "A", "qualifiers": [{"type": "SMT/MappingInfo", "value": "$.a"}]},
                {"idShort": "B", "qualifiers": [{"type": "SMT/Cardinality", "value": "One"}]}
            ]
        });
        let document = Document::from_value(&value);
        let path = JsonPath::parse("$..qualifiers[?(@.type == 'SMT/MappingInfo')].value").unwrap();

        let on_value = path.select(&value);
        let on_document: Vec<Value> = path
            .select(document.node(document.root()))
            .into_iter()
            .map(|node| document.node_to_value(node.id()))
            .collect();

        assert_eq!(on_value, vec![&json!("$.a")]);
        assert_eq!(on_document, vec![json!("$.a")]);
    }

    #[test]
    fn test_detached_nodes_are_invisible_from_root() {
        let mut document = Document::from_value(&json!({"items": [{"n": 1}, {"n": 2}]}));
        let items = document.field(document.root(), "items").unwrap();
        let first = document.elements(items)[0];
        document.remove_node(first);

        let path = JsonPath::parse("$..n").unwrap();
        let found: Vec<NodeId> = path
            .select(document.node(document.root()))
            .into_iter()
            .map(NodeRef::id)
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(document.node_to_value(found[0]), json!(2));
    }
}
