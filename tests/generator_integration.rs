//! Generator behaviour against in-memory collaborators

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use smt_mapper::generator::{
    IdGenerator, ProviderError, RepositoryClient, SubmodelReference, TemplateProvider,
    encode_template_id,
};
use smt_mapper::{AasGenerator, RepositoryConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct RecordingRepository {
    posts: Mutex<Vec<(String, String)>>,
}

impl RecordingRepository {
    fn posts(&self) -> Vec<(String, String)> {
        self.posts.lock().clone()
    }
}

#[async_trait]
impl RepositoryClient for RecordingRepository {
    async fn post(&self, path: &str, body: String) -> Result<String, ProviderError> {
        self.posts.lock().push((path.to_string(), body.clone()));
        Ok(body)
    }
}

/// Serves templates keyed by their encoded id
struct StaticTemplates {
    templates: HashMap<String, Value>,
}

impl StaticTemplates {
    fn new(templates: Vec<(&str, Value)>) -> Self {
        Self {
            templates: templates
                .into_iter()
                .map(|(id, template)| (encode_template_id(id), template))
                .collect(),
        }
    }
}

#[async_trait]
impl TemplateProvider for StaticTemplates {
    async fn fetch_template(&self, encoded_template_id: &str) -> Result<Value, ProviderError> {
        self.templates
            .get(encoded_template_id)
            .cloned()
            .ok_or_else(|| ProviderError::other(format!("unknown template {encoded_template_id}")))
    }
}

#[derive(Default)]
struct SequentialIds {
    next: AtomicUsize,
}

#[async_trait]
impl IdGenerator for SequentialIds {
    async fn generate_ids(&self, count: u32) -> Result<Vec<String>, ProviderError> {
        Ok((0..count)
            .map(|_| format!("urn:sm:{}", self.next.fetch_add(1, Ordering::SeqCst)))
            .collect())
    }
}

struct FailingIds;

#[async_trait]
impl IdGenerator for FailingIds {
    async fn generate_ids(&self, _count: u32) -> Result<Vec<String>, ProviderError> {
        Err(ProviderError::other("id service unavailable"))
    }
}

fn template(id_short: &str, path: &str, cardinality: &str) -> Value {
    json!({
        "id": format!("urn:template:{id_short}"),
        "idShort": id_short,
        "kind": "Template",
        "submodelElements": [{
            "idShort": "Field",
            "modelType": "Property",
            "value": "",
            "qualifiers": [
                {"type": "SMT/MappingInfo", "value": path},
                {"type": "SMT/Cardinality", "value": cardinality}
            ]
        }]
    })
}

fn generator_with(
    repository: Arc<RecordingRepository>,
    templates: Vec<(&str, Value)>,
    ids: Arc<dyn IdGenerator>,
) -> AasGenerator {
    AasGenerator::new(
        repository,
        Arc::new(StaticTemplates::new(templates)),
        ids,
        RepositoryConfig::default(),
    )
}

fn ids(template_ids: &[&str]) -> Vec<String> {
    template_ids.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn test_empty_template_list_does_nothing() {
    let repository = Arc::new(RecordingRepository::default());
    let generator = generator_with(repository.clone(), vec![], Arc::new(SequentialIds::default()));

    let results = generator
        .add_data_to_aas("YWFz", &[], &json!({}), "en")
        .await;

    assert!(results.is_empty());
    assert!(repository.posts().is_empty());
}

#[tokio::test]
async fn test_success_posts_instance_then_reference() {
    let repository = Arc::new(RecordingRepository::default());
    let generator = generator_with(
        repository.clone(),
        vec![("urn:t:nameplate", template("Nameplate", "$.name", "One"))],
        Arc::new(SequentialIds::default()),
    );

    let results = generator
        .add_data_to_aas("YWFz", &ids(&["urn:t:nameplate"]), &json!({"name": "Pump"}), "en")
        .await;

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert!(result.success, "{}", result.message);
    assert_eq!(result.template_id, "urn:t:nameplate");
    assert_eq!(result.generated_submodel_id, "urn:sm:0");
    assert_eq!(result.message, "");
    assert_eq!(result.error_info, None);

    let posts = repository.posts();
    assert_eq!(posts.len(), 2);

    assert_eq!(posts[0].0, "/submodels");
    let instance: Value = serde_json::from_str(&posts[0].1).unwrap();
    assert_eq!(instance["id"], "urn:sm:0");
    assert_eq!(instance["kind"], "Instance");
    assert_eq!(instance["submodelElements"][0]["value"], "Pump");

    assert_eq!(posts[1].0, "/submodel-references/YWFz");
    let reference: SubmodelReference = serde_json::from_str(&posts[1].1).unwrap();
    assert_eq!(reference, SubmodelReference::to_submodel("urn:sm:0"));
}

#[tokio::test]
async fn test_failures_stay_with_their_template() {
    let repository = Arc::new(RecordingRepository::default());
    let generator = generator_with(
        repository.clone(),
        vec![
            ("ok", template("Ok", "$.name", "One")),
            ("broken", template("Broken", "$.missing", "One")),
        ],
        Arc::new(SequentialIds::default()),
    );

    let results = generator
        .add_data_to_aas(
            "YWFz",
            &ids(&["ok", "unknown", "broken"]),
            &json!({"name": "Pump"}),
            "en",
        )
        .await;

    let outcome: Vec<(&str, bool)> = results
        .iter()
        .map(|result| (result.template_id.as_str(), result.success))
        .collect();
    assert_eq!(
        outcome,
        vec![("ok", true), ("unknown", false), ("broken", false)]
    );

    assert_eq!(
        results[1].message,
        format!(
            "Failed to fetch template from custom template provider: unknown template {}",
            encode_template_id("unknown")
        )
    );
    assert_eq!(results[1].error_info, None);

    assert_eq!(results[2].message, "Mandatory mapping '$.missing' not found.");
    let info = results[2].error_info.as_ref().unwrap();
    assert_eq!(
        info.qualifier_path.as_deref(),
        Some("$.submodelElements[0].qualifiers[0]")
    );
    assert_eq!(
        info.qualifier.as_deref(),
        Some(r#"{"type":"SMT/MappingInfo","value":"$.missing"}"#)
    );
    assert!(!info.logs.is_empty());

    // only the successful template reaches the repository
    assert_eq!(repository.posts().len(), 2);
}

#[tokio::test]
async fn test_template_without_id_short_fails() {
    let repository = Arc::new(RecordingRepository::default());
    let mut anonymous = template("Anonymous", "$.name", "One");
    anonymous.as_object_mut().unwrap().remove("idShort");
    let generator = generator_with(
        repository.clone(),
        vec![("anonymous", anonymous)],
        Arc::new(SequentialIds::default()),
    );

    let results = generator
        .add_data_to_aas("YWFz", &ids(&["anonymous"]), &json!({"name": "x"}), "en")
        .await;

    assert!(!results[0].success);
    assert_eq!(
        results[0].message,
        "template idShort of anonymous needs to be not null"
    );
    assert!(repository.posts().is_empty());
}

#[tokio::test]
async fn test_id_generation_failure() {
    let repository = Arc::new(RecordingRepository::default());
    let generator = generator_with(
        repository.clone(),
        vec![("t", template("T", "$.name", "One"))],
        Arc::new(FailingIds),
    );

    let results = generator
        .add_data_to_aas("YWFz", &ids(&["t"]), &json!({"name": "x"}), "en")
        .await;

    assert!(!results[0].success);
    assert_eq!(results[0].message, "could not generate submodel id");
    assert!(repository.posts().is_empty());
}

#[tokio::test]
async fn test_blank_aas_id_is_rejected() {
    let repository = Arc::new(RecordingRepository::default());
    let generator = generator_with(
        repository.clone(),
        vec![("t", template("T", "$.name", "One"))],
        Arc::new(SequentialIds::default()),
    );

    let results = generator
        .add_data_to_aas("  ", &ids(&["t"]), &json!({"name": "x"}), "en")
        .await;

    assert!(!results[0].success);
    assert_eq!(results[0].message, "The aas id cannot be empty!");
    assert!(repository.posts().is_empty());
}

#[tokio::test]
async fn test_results_follow_request_order() {
    let repository = Arc::new(RecordingRepository::default());
    let names = ["a", "b", "c", "d", "e"];
    let templates = names
        .iter()
        .map(|name| (*name, template(name, "$.name", "ZeroToOne")))
        .collect();
    let generator = generator_with(repository.clone(), templates, Arc::new(SequentialIds::default()));

    let results = generator
        .add_data_to_aas("YWFz", &ids(&names), &json!({}), "en")
        .await;

    let returned: Vec<&str> = results.iter().map(|r| r.template_id.as_str()).collect();
    assert_eq!(returned, names.to_vec());
    assert!(results.iter().all(|r| r.success));
    assert_eq!(repository.posts().len(), names.len() * 2);
}
