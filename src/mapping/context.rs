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

//! State threaded through the mapping passes

use super::error::{MappingError, MappingErrorKind};
use crate::document::{Document, NodeId};
use crate::pipeline::StepContext;
use chrono::Utc;
use serde_json::Value;

/// Inputs of one mapping run plus the instance being built
#[derive(Debug)]
pub struct MappingContext<'a> {
    template: &'a Value,
    data: &'a Value,
    language: &'a str,
    new_id: &'a str,
    /// Working copy of the template
    pub instance: Document,
    logs: Vec<String>,
    qualifier: Option<NodeId>,
}

impl<'a> MappingContext<'a> {
    /// Fresh context; the instance stays empty until the clone pass runs
    pub fn new(template: &'a Value, data: &'a Value, language: &'a str, new_id: &'a str) -> Self {
        Self {
            template,
            data,
            language,
            new_id,
            instance: Document::from_value(&Value::Object(Default::default())),
            logs: Vec::new(),
            qualifier: None,
        }
    }

    /// Template being instantiated
    pub fn template(&self) -> &'a Value {
        self.template
    }

    /// Source data paths resolve against
    pub fn data(&self) -> &'a Value {
        self.data
    }

    /// Language tag for multi-language values
    pub fn language(&self) -> &'a str {
        self.language
    }

    /// Identifier assigned to the instance
    pub fn new_id(&self) -> &'a str {
        self.new_id
    }

    /// Diagnostic lines so far
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Qualifier currently being processed
    pub fn qualifier(&self) -> Option<NodeId> {
        self.qualifier
    }

    /// Mark the qualifier subsequent errors are attributed to
    pub fn set_qualifier(&mut self, qualifier: Option<NodeId>) {
        self.qualifier = qualifier;
    }

    /// Append a timestamped diagnostic line
    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.logs.push(format!("[{}] - {}", Utc::now(), message));
    }

    /// Build an error carrying the log and the current qualifier
    pub fn error(&self, kind: impl Into<MappingErrorKind>) -> MappingError {
        let error = MappingError::new(kind.into()).with_logs(self.logs.clone());
        match self.qualifier {
            Some(qualifier) => error.with_qualifier(
                self.instance.node_to_value(qualifier),
                self.instance.path_of(qualifier),
            ),
            None => error,
        }
    }
}

impl StepContext for MappingContext<'_> {
    fn record(&mut self, message: String) {
        self.log(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_lines_are_timestamped() {
        let template = json!({});
        let data = json!({});
        let mut context = MappingContext::new(&template, &data, "en", "urn:new");
        context.log("Started Something");

        let line = &context.logs()[0];
        assert!(line.starts_with('['));
        assert!(line.ends_with("] - Started Something"));
    }

    #[test]
    fn test_error_attributes_current_qualifier() {
        let template = json!({});
        let data = json!({});
        let mut context = MappingContext::new(&template, &data, "en", "urn:new");
        context.instance = Document::from_value(&json!({
            "submodelElements": [{"qualifiers": [{"type": "SMT/MappingInfo", "value": "$.x"}]}]
        }));
        let root = context.instance.root();
        let elements = context.instance.field(root, "submodelElements").unwrap();
        let element = context.instance.elements(elements)[0];
        let qualifiers = context.instance.field(element, "qualifiers").unwrap();
        context.set_qualifier(Some(context.instance.elements(qualifiers)[0]));
        context.log("before failure");

        let error = context.error(MappingErrorKind::MissingMappingValue);
        assert_eq!(error.logs().len(), 1);
        assert_eq!(
            error.qualifier(),
            Some(&json!({"type": "SMT/MappingInfo", "value": "$.x"}))
        );
        assert_eq!(
            error.qualifier_path(),
            Some("$.submodelElements[0].qualifiers[0]")
        );
    }
}
