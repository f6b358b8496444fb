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

//! Tree access abstraction for path evaluation

use serde_json::Value;

/// Read-only view of a JSON-shaped tree that paths can walk
///
/// Implemented for plain `&Value` and for nodes of the mutable working
/// document, so a compiled path evaluates against either without copying.
pub trait Navigable<'a>: Copy + 'a {
    /// Member of an object node
    fn field(self, name: &str) -> Option<Self>;

    /// Element of an array node
    fn element(self, index: usize) -> Option<Self>;

    /// Members of an object in key order, or elements of an array; empty for scalars
    fn children(self) -> Vec<Self>;

    /// Scalar value of a leaf node
    fn scalar(self) -> Option<&'a Value>;
}

impl<'a> Navigable<'a> for &'a Value {
    fn field(self, name: &str) -> Option<Self> {
        self.as_object().and_then(|object| object.get(name))
    }

    fn element(self, index: usize) -> Option<Self> {
        self.as_array().and_then(|array| array.get(index))
    }

    fn children(self) -> Vec<Self> {
        match self {
            Value::Object(object) => object.values().collect(),
            Value::Array(array) => array.iter().collect(),
            _ => Vec::new(),
        }
    }

    fn scalar(self) -> Option<&'a Value> {
        match self {
            Value::Object(_) | Value::Array(_) => None,
            scalar => Some(scalar),
        }
    }
}
