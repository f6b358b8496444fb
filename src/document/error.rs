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

//! Working document errors

use super::NodeId;
use thiserror::Error;

/// Result type for structural edits
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Structural edit that the document shape does not allow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Node is not an array
    #[error("Node {0} is not an array")]
    NotAnArray(NodeId),

    /// Node is not an object
    #[error("Node {0} is not an object")]
    NotAnObject(NodeId),

    /// Node already has a parent
    #[error("Node {0} is already attached to the document")]
    AlreadyAttached(NodeId),

    /// Renaming would overwrite an existing member
    #[error("Node {node} already has a member named '{key}'")]
    DuplicateKey {
        /// Object being edited
        node: NodeId,
        /// Conflicting member name
        key: String,
    },
}
