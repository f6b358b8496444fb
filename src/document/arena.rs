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

//! Index-addressed JSON tree supporting in-place structural edits

use super::error::{DocumentError, DocumentResult};
use super::node_ref::NodeRef;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;

/// Handle to a node in a [`Document`]
///
/// Handles stay valid for the lifetime of the document, including after the
/// node is removed from the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape and content of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Object members in insertion order
    Object(IndexMap<String, NodeId>),
    /// Array elements
    Array(Vec<NodeId>),
    /// String, number, boolean or null
    Scalar(Value),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
}

/// Mutable JSON tree with parent links
///
/// Nodes live in one arena and are never freed; removing a node only unlinks
/// it from its parent. Detached subtrees keep their content so callers can
/// still read or re-attach them.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Build a document holding a copy of `value`
    pub fn from_value(value: &Value) -> Self {
        let mut document = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        document.root = document.insert(value, None);
        document
    }

    fn insert(&mut self, value: &Value, parent: Option<NodeId>) -> NodeId {
        let id = self.push(NodeKind::Scalar(Value::Null), parent);
        let kind = self.build_kind(value, id);
        self.nodes[id.0].kind = kind;
        id
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { kind, parent });
        id
    }

    /// Allocate children of `value` under `owner` and return the owner's new kind
    fn build_kind(&mut self, value: &Value, owner: NodeId) -> NodeKind {
        match value {
            Value::Object(members) => NodeKind::Object(
                members
                    .iter()
                    .map(|(key, member)| (key.clone(), self.insert(member, Some(owner))))
                    .collect(),
            ),
            Value::Array(elements) => NodeKind::Array(
                elements
                    .iter()
                    .map(|element| self.insert(element, Some(owner)))
                    .collect(),
            ),
            scalar => NodeKind::Scalar(scalar.clone()),
        }
    }

    /// Root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever allocated, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a document has at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Navigable view of a node
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    /// Kind of a node
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Parent of a node; `None` for the root and for detached nodes
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Walk `levels` parent links up from `id`
    pub fn ancestor(&self, id: NodeId, levels: usize) -> Option<NodeId> {
        (0..levels).try_fold(id, |current, _| self.parent(current))
    }

    /// Whether the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current == self.root
    }

    /// Member of an object node
    pub fn field(&self, id: NodeId, name: &str) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Object(members) => members.get(name).copied(),
            _ => None,
        }
    }

    /// Elements of an array node, empty for anything else
    pub fn elements(&self, id: NodeId) -> &[NodeId] {
        match self.kind(id) {
            NodeKind::Array(elements) => elements,
            _ => &[],
        }
    }

    /// Object members in key order or array elements
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::Object(members) => members.values().copied().collect(),
            NodeKind::Array(elements) => elements.clone(),
            NodeKind::Scalar(_) => Vec::new(),
        }
    }

    /// String content of a scalar node
    pub fn as_str(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Scalar(Value::String(text)) => Some(text),
            _ => None,
        }
    }

    /// String content of an object member
    pub fn str_field(&self, id: NodeId, name: &str) -> Option<&str> {
        self.field(id, name).and_then(|member| self.as_str(member))
    }

    /// Materialize the whole tree
    pub fn to_value(&self) -> Value {
        self.node_to_value(self.root)
    }

    /// Materialize the subtree rooted at `id`
    pub fn node_to_value(&self, id: NodeId) -> Value {
        match self.kind(id) {
            NodeKind::Object(members) => Value::Object(
                members
                    .iter()
                    .map(|(key, member)| (key.clone(), self.node_to_value(*member)))
                    .collect::<Map<String, Value>>(),
            ),
            NodeKind::Array(elements) => Value::Array(
                elements
                    .iter()
                    .map(|element| self.node_to_value(*element))
                    .collect(),
            ),
            NodeKind::Scalar(value) => value.clone(),
        }
    }

    /// Copy a subtree; the copy starts detached
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        self.clone_under(id, None)
    }

    fn clone_under(&mut self, source: NodeId, parent: Option<NodeId>) -> NodeId {
        let copy = self.push(NodeKind::Scalar(Value::Null), parent);
        let kind = match self.kind(source).clone() {
            NodeKind::Object(members) => NodeKind::Object(
                members
                    .into_iter()
                    .map(|(key, member)| (key, self.clone_under(member, Some(copy))))
                    .collect(),
            ),
            NodeKind::Array(elements) => NodeKind::Array(
                elements
                    .into_iter()
                    .map(|element| self.clone_under(element, Some(copy)))
                    .collect(),
            ),
            scalar @ NodeKind::Scalar(_) => scalar,
        };
        self.nodes[copy.0].kind = kind;
        copy
    }

    /// Replace the content of a node, keeping its identity and position
    pub fn replace_value(&mut self, id: NodeId, value: &Value) {
        for child in self.children(id) {
            self.nodes[child.0].parent = None;
        }
        let kind = self.build_kind(value, id);
        self.nodes[id.0].kind = kind;
    }

    /// Set an object member, replacing the content of an existing one
    pub fn set_field(&mut self, object: NodeId, key: &str, value: &Value) -> DocumentResult<NodeId> {
        if let Some(existing) = self.field(object, key) {
            self.replace_value(existing, value);
            return Ok(existing);
        }
        if !matches!(self.kind(object), NodeKind::Object(_)) {
            return Err(DocumentError::NotAnObject(object));
        }
        let member = self.insert(value, Some(object));
        if let NodeKind::Object(members) = &mut self.nodes[object.0].kind {
            members.insert(key.to_string(), member);
        }
        Ok(member)
    }

    /// Unlink an object member and return it
    pub fn remove_field(&mut self, object: NodeId, key: &str) -> Option<NodeId> {
        let member = self.field(object, key)?;
        self.remove_node(member);
        Some(member)
    }

    /// Unlink a node from its parent; no-op when already detached
    pub fn remove_node(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        match &mut self.nodes[parent.0].kind {
            NodeKind::Object(members) => members.retain(|_, member| *member != id),
            NodeKind::Array(elements) => elements.retain(|element| *element != id),
            NodeKind::Scalar(_) => {}
        }
        self.nodes[id.0].parent = None;
    }

    /// Attach a detached node at the end of an array
    pub fn append_child(&mut self, array: NodeId, child: NodeId) -> DocumentResult<()> {
        if self.parent(child).is_some() || child == self.root {
            return Err(DocumentError::AlreadyAttached(child));
        }
        match &mut self.nodes[array.0].kind {
            NodeKind::Array(elements) => elements.push(child),
            _ => return Err(DocumentError::NotAnArray(array)),
        }
        self.nodes[child.0].parent = Some(array);
        Ok(())
    }

    /// Rename an object member in place; returns false when `from` is absent
    pub fn rename_key(&mut self, object: NodeId, from: &str, to: &str) -> DocumentResult<bool> {
        let NodeKind::Object(members) = &mut self.nodes[object.0].kind else {
            return Err(DocumentError::NotAnObject(object));
        };
        if from == to {
            return Ok(members.contains_key(from));
        }
        if members.contains_key(to) {
            return Err(DocumentError::DuplicateKey {
                node: object,
                key: to.to_string(),
            });
        }
        match members.shift_remove_full(from) {
            Some((index, _, member)) => {
                members.shift_insert(index, to.to_string(), member);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Location of an attached node, e.g. `$.submodelElements[0].qualifiers[1]`
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        let mut steps = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let step = match self.kind(parent) {
                NodeKind::Array(elements) => elements
                    .iter()
                    .position(|element| *element == current)
                    .map(|index| format!("[{index}]")),
                NodeKind::Object(members) => members
                    .iter()
                    .find(|(_, member)| **member == current)
                    .map(|(key, _)| member_step(key)),
                NodeKind::Scalar(_) => None,
            }?;
            steps.push(step);
            current = parent;
        }
        if current != self.root {
            return None;
        }
        steps.reverse();
        Some(format!("${}", steps.concat()))
    }
}

fn member_step(key: &str) -> String {
    let plain = key
        .chars()
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && key
            .chars()
            .all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '-');
    if plain {
        format!(".{key}")
    } else {
        format!("['{}']", key.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        Document::from_value(&json!({
            "idShort": "Root",
            "submodelElements": [
                {"idShort": "A", "qualifiers": [{"type": "x"}, {"type": "y"}]},
                {"idShort": "B"}
            ]
        }))
    }

    fn element(document: &Document, index: usize) -> NodeId {
        let elements = document.field(document.root(), "submodelElements").unwrap();
        document.elements(elements)[index]
    }

    #[test]
    fn test_round_trip_preserves_key_order() {
        let value = json!({"z": 1, "a": [true, null, {"m": "n"}], "k": 2.5});
        let document = Document::from_value(&value);
        assert_eq!(document.to_value(), value);
        assert_eq!(
            serde_json::to_string(&document.to_value()).unwrap(),
            serde_json::to_string(&value).unwrap()
        );
    }

    #[test]
    fn test_ancestor_and_path() {
        let document = sample();
        let a = element(&document, 0);
        let qualifiers = document.field(a, "qualifiers").unwrap();
        let second = document.elements(qualifiers)[1];
        assert_eq!(document.ancestor(second, 2), Some(a));
        assert_eq!(document.ancestor(second, 9), None);
        assert_eq!(
            document.path_of(second).as_deref(),
            Some("$.submodelElements[0].qualifiers[1]")
        );
        assert_eq!(document.path_of(document.root()).as_deref(), Some("$"));
    }

    #[test]
    fn test_path_quotes_unusual_keys() {
        let document = Document::from_value(&json!({"odd key": {"1x": 0}}));
        let odd = document.field(document.root(), "odd key").unwrap();
        let inner = document.field(odd, "1x").unwrap();
        assert_eq!(document.path_of(inner).as_deref(), Some("$['odd key']['1x']"));
    }

    #[test]
    fn test_deep_clone_is_independent_and_detached() {
        let mut document = sample();
        let a = element(&document, 0);
        let copy = document.deep_clone(a);
        assert!(!document.is_attached(copy));
        assert_eq!(document.path_of(copy), None);

        document.set_field(copy, "idShort", &json!("A_0")).unwrap();
        assert_eq!(document.str_field(a, "idShort"), Some("A"));
        assert_eq!(document.str_field(copy, "idShort"), Some("A_0"));
    }

    #[test]
    fn test_append_and_remove() {
        let mut document = sample();
        let elements = document.field(document.root(), "submodelElements").unwrap();
        let a = element(&document, 0);
        let copy = document.deep_clone(a);

        document.append_child(elements, copy).unwrap();
        assert!(document.is_attached(copy));
        assert_eq!(document.elements(elements).len(), 3);
        assert_eq!(
            document.append_child(elements, copy),
            Err(DocumentError::AlreadyAttached(copy))
        );

        let qualifiers = document.field(a, "qualifiers").unwrap();
        let first = document.elements(qualifiers)[0];
        document.remove_node(a);
        assert!(!document.is_attached(a));
        assert!(!document.is_attached(first));
        assert_eq!(document.elements(elements).len(), 2);

        // second removal is a no-op
        document.remove_node(a);
        assert_eq!(document.elements(elements).len(), 2);
    }

    #[test]
    fn test_append_requires_array() {
        let mut document = sample();
        let a = element(&document, 0);
        let copy = document.deep_clone(a);
        assert_eq!(
            document.append_child(a, copy),
            Err(DocumentError::NotAnArray(a))
        );
    }

    #[test]
    fn test_set_field_inserts_or_replaces() {
        let mut document = sample();
        let b = element(&document, 1);
        let kind = document.set_field(b, "kind", &json!("Instance")).unwrap();
        let replaced = document.set_field(b, "kind", &json!({"nested": [1]})).unwrap();
        assert_eq!(kind, replaced);
        assert_eq!(
            document.node_to_value(b),
            json!({"idShort": "B", "kind": {"nested": [1]}})
        );
        let scalar = document.field(b, "idShort").unwrap();
        assert_eq!(
            document.set_field(scalar, "x", &json!(1)),
            Err(DocumentError::NotAnObject(scalar))
        );
    }

    #[test]
    fn test_replace_value_detaches_old_children() {
        let mut document = sample();
        let a = element(&document, 0);
        let qualifiers = document.field(a, "qualifiers").unwrap();
        document.replace_value(a, &json!("flat"));
        assert!(!document.is_attached(qualifiers));
        assert_eq!(document.as_str(a), Some("flat"));
    }

    #[test]
    fn test_rename_key_keeps_position() {
        let mut document = Document::from_value(&json!({"a": 1, "b": 2, "c": 3}));
        let root = document.root();
        assert!(document.rename_key(root, "b", "x").unwrap());
        assert!(!document.rename_key(root, "missing", "y").unwrap());
        assert_eq!(
            serde_json::to_string(&document.to_value()).unwrap(),
            r#"{"a":1,"x":2,"c":3}"#
        );
        assert_eq!(
            document.rename_key(root, "a", "c"),
            Err(DocumentError::DuplicateKey {
                node: root,
                key: "c".to_string(),
            })
        );
    }

    #[test]
    fn test_remove_field() {
        let mut document = sample();
        let a = element(&document, 0);
        let removed = document.remove_field(a, "qualifiers");
        assert!(removed.is_some());
        assert_eq!(document.remove_field(a, "qualifiers"), None);
        assert_eq!(document.node_to_value(a), json!({"idShort": "A"}));
    }
}
