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

//! Mapping failures

use crate::document::DocumentError;
use crate::path::PathError;
use serde_json::Value;
use thiserror::Error;

/// Result type for mapping passes
pub type MappingResult<T> = Result<T, MappingError>;

/// What went wrong while turning a template into an instance
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingErrorKind {
    /// A mandatory path selected nothing
    #[error("could not find {path} in data json")]
    PathNotFound {
        /// The expression as written
        path: String,
    },

    /// A path expression could not be used
    #[error("{source}")]
    InvalidPath {
        /// The expression as written
        path: String,
        /// Underlying resolver error
        #[source]
        source: PathError,
    },

    /// The template does not have the shape a qualifier requires
    #[error("{message}")]
    StructuralMismatch {
        /// Description of the mismatch
        message: String,
    },

    /// A qualifier has no string `value`
    #[error("Mapping Info cannot be null")]
    MissingMappingValue,

    /// A mandatory field has no source value
    #[error("Mandatory mapping '{path}' not found.")]
    MandatoryMappingMissing {
        /// The expression as written
        path: String,
    },

    /// The template root has no `id`
    #[error("Could not find id property in template")]
    MissingIdentifierField,
}

impl MappingErrorKind {
    /// Shape mismatch with a message
    pub fn structural(message: impl Into<String>) -> Self {
        MappingErrorKind::StructuralMismatch {
            message: message.into(),
        }
    }

    /// Classify a resolver error
    pub fn from_path_error(error: PathError) -> Self {
        let path = match &error {
            PathError::NotFound { path } => {
                return MappingErrorKind::PathNotFound { path: path.clone() };
            }
            PathError::Syntax { path, .. } | PathError::MultipleMatches { path, .. } => {
                path.clone()
            }
        };
        MappingErrorKind::InvalidPath {
            path,
            source: error,
        }
    }
}

impl From<PathError> for MappingErrorKind {
    fn from(error: PathError) -> Self {
        Self::from_path_error(error)
    }
}

impl From<DocumentError> for MappingErrorKind {
    fn from(error: DocumentError) -> Self {
        Self::structural(error.to_string())
    }
}

/// A failed mapping run with the diagnostics collected up to the failure
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct MappingError {
    kind: MappingErrorKind,
    logs: Vec<String>,
    qualifier: Option<Value>,
    qualifier_path: Option<String>,
}

impl MappingError {
    /// Create an error without diagnostics attached
    pub fn new(kind: MappingErrorKind) -> Self {
        Self {
            kind,
            logs: Vec::new(),
            qualifier: None,
            qualifier_path: None,
        }
    }

    /// Attach the log collected so far
    pub fn with_logs(mut self, logs: Vec<String>) -> Self {
        self.logs = logs;
        self
    }

    /// Attach the qualifier being processed and its location
    pub fn with_qualifier(mut self, qualifier: Value, path: Option<String>) -> Self {
        self.qualifier = Some(qualifier);
        self.qualifier_path = path;
        self
    }

    /// Failure category
    pub fn kind(&self) -> &MappingErrorKind {
        &self.kind
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Diagnostic lines up to the failure
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// The qualifier in effect when the run failed
    pub fn qualifier(&self) -> Option<&Value> {
        self.qualifier.as_ref()
    }

    /// Location of that qualifier in the working document
    pub fn qualifier_path(&self) -> Option<&str> {
        self.qualifier_path.as_deref()
    }
}
