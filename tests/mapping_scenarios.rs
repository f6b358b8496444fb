//! End-to-end template to instance scenarios
//!
//! Each scenario maps a small submodel template through the full pass
//! sequence and checks the resulting instance or the reported failure.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use smt_mapper::{MappingErrorKind, SubmodelMapper, map_template_to_instance};

fn property(id_short: &str, path: &str, cardinality: Option<&str>) -> Value {
    let mut qualifiers = vec![json!({"type": "SMT/MappingInfo", "value": path})];
    if let Some(cardinality) = cardinality {
        qualifiers.push(json!({"type": "SMT/Cardinality", "value": cardinality}));
    }
    json!({
        "idShort": id_short,
        "modelType": "Property",
        "valueType": "xs:string",
        "value": "",
        "qualifiers": qualifiers
    })
}

fn collection(id_short: &str, path: &str, cardinality: Option<&str>, children: Value) -> Value {
    let mut qualifiers = vec![json!({"type": "SMT/CollectionMappingInfo", "value": path})];
    if let Some(cardinality) = cardinality {
        qualifiers.push(json!({"type": "SMT/Cardinality", "value": cardinality}));
    }
    json!({
        "idShort": id_short,
        "modelType": "SubmodelElementCollection",
        "qualifiers": qualifiers,
        "value": children
    })
}

fn submodel(elements: Vec<Value>) -> Value {
    json!({
        "id": "urn:template:nameplate",
        "idShort": "Nameplate",
        "kind": "Template",
        "modelType": "Submodel",
        "qualifiers": [{"type": "Template/Origin", "value": "catalog"}],
        "submodelElements": elements
    })
}

fn nameplate() -> Value {
    submodel(vec![
        property("ManufacturerName", "$.manufacturer", Some("One")),
        property("SerialNumber", "$.serial", Some("ZeroToOne")),
    ])
}

fn item_list(list_cardinality: Option<&str>, serial_cardinality: Option<&str>) -> Value {
    submodel(vec![collection(
        "Item",
        "$.items[*]",
        list_cardinality,
        json!([
            property("Name", "$.items[*].name", None),
            property("Serial", "$.items[*].serial", serial_cardinality)
        ]),
    )])
}

fn map(template: &Value, data: &Value) -> Value {
    map_template_to_instance(template, data, "en", "urn:instance:1").unwrap()
}

fn values(instance: &Value, field: &str) -> Vec<Value> {
    instance["submodelElements"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|element| element["value"].as_array().unwrap())
        .filter(|child| child["idShort"] == field)
        .map(|child| child["value"].clone())
        .collect()
}

#[test]
fn test_mandatory_and_optional_field() {
    let data = json!({"manufacturer": "ACME", "serial": "SN-1"});
    let instance = map(&nameplate(), &data);

    assert_eq!(instance["submodelElements"][0]["value"], "ACME");
    assert_eq!(instance["submodelElements"][1]["value"], "SN-1");
}

#[test]
fn test_only_mandatory_field_present() {
    let data = json!({"manufacturer": "ACME"});
    let instance = map(&nameplate(), &data);

    assert_eq!(instance["submodelElements"][0]["value"], "ACME");
    assert_eq!(instance["submodelElements"][1]["value"], "");
}

#[test]
fn test_only_optional_field_present_fails() {
    let data = json!({"serial": "SN-1"});
    let error = map_template_to_instance(&nameplate(), &data, "en", "urn:instance:1").unwrap_err();

    assert_eq!(
        error.kind(),
        &MappingErrorKind::MandatoryMappingMissing {
            path: "$.manufacturer".to_string()
        }
    );
    assert_eq!(error.message(), "Mandatory mapping '$.manufacturer' not found.");
    assert_eq!(
        error.qualifier_path(),
        Some("$.submodelElements[0].qualifiers[0]")
    );
    assert_eq!(
        error.qualifier(),
        Some(&json!({"type": "SMT/MappingInfo", "value": "$.manufacturer"}))
    );
    assert!(error.logs().iter().any(|line| line.ends_with("Started MapScalarFieldsStep")));
}

#[test]
fn test_list_expands_into_indexed_copies() {
    let template = submodel(vec![collection(
        "Item",
        "$.items[*]",
        None,
        json!([property("Name", "$.items[*].name", None)]),
    )]);
    let data = json!({"items": [{"name": "A"}, {"name": "B"}]});

    let expected = json!({
        "id": "urn:instance:1",
        "idShort": "Nameplate",
        "kind": "Instance",
        "modelType": "Submodel",
        "qualifiers": [],
        "submodelElements": [
            {
                "idShort": "Item_0",
                "modelType": "SubmodelElementCollection",
                "qualifiers": [],
                "value": [{
                    "idShort": "Name",
                    "modelType": "Property",
                    "valueType": "xs:string",
                    "value": "A",
                    "qualifiers": [{"type": "SMT/MappingInfo", "value": "$.items[0].name"}]
                }]
            },
            {
                "idShort": "Item_1",
                "modelType": "SubmodelElementCollection",
                "qualifiers": [],
                "value": [{
                    "idShort": "Name",
                    "modelType": "Property",
                    "valueType": "xs:string",
                    "value": "B",
                    "qualifiers": [{"type": "SMT/MappingInfo", "value": "$.items[1].name"}]
                }]
            }
        ]
    });
    assert_eq!(map(&template, &data), expected);
}

#[test]
fn test_collection_path_with_field_suffix() {
    // the collection is annotated with the field path rather than the array
    let template = submodel(vec![collection(
        "Item",
        "$.items[*].name",
        Some("ZeroToMany"),
        json!([property("Name", "$.items[*].name", None)]),
    )]);
    let data = json!({"items": [{"name": "A"}, {"name": "B"}]});
    let instance = map_template_to_instance(&template, &data, "en", "NEW").unwrap();

    let elements = instance["submodelElements"].as_array().unwrap();
    let id_shorts: Vec<&str> = elements
        .iter()
        .map(|element| element["idShort"].as_str().unwrap())
        .collect();
    assert_eq!(id_shorts, vec!["Item_0", "Item_1"]);
    assert_eq!(values(&instance, "Name"), vec![json!("A"), json!("B")]);
    assert_eq!(
        elements[1]["value"][0]["qualifiers"][0]["value"],
        "$.items[1].name"
    );
    assert_eq!(instance["id"], "NEW");
    assert_eq!(instance["qualifiers"], json!([]));
    assert_eq!(instance["kind"], "Instance");
}

#[test]
fn test_nested_lists_expand_per_parent() {
    let template = submodel(vec![collection(
        "Line",
        "$.lines[*]",
        None,
        json!([collection(
            "Part",
            "$.lines[*].parts[*]",
            None,
            json!([property("Code", "$.lines[*].parts[*].code", None)])
        )]),
    )]);
    let data = json!({
        "lines": [
            {"parts": [{"code": "L0P0"}, {"code": "L0P1"}]},
            {"parts": [{"code": "L1P0"}]}
        ]
    });
    let instance = map(&template, &data);

    let lines = instance["submodelElements"].as_array().unwrap();
    let line_ids: Vec<&str> = lines
        .iter()
        .map(|line| line["idShort"].as_str().unwrap())
        .collect();
    assert_eq!(line_ids, vec!["Line_0", "Line_1"]);

    let parts: Vec<(&str, &str)> = lines
        .iter()
        .flat_map(|line| line["value"].as_array().unwrap())
        .map(|part| {
            (
                part["idShort"].as_str().unwrap(),
                part["value"][0]["value"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        parts,
        vec![("Part_0", "L0P0"), ("Part_1", "L0P1"), ("Part_0", "L1P0")]
    );
}

#[test]
fn test_list_with_mandatory_element_missing_fails() {
    let data = json!({"items": [{"name": "A", "serial": "1"}, {"name": "B"}]});
    let error = map_template_to_instance(&item_list(None, Some("One")), &data, "en", "x")
        .unwrap_err();

    assert_eq!(
        error.kind(),
        &MappingErrorKind::MandatoryMappingMissing {
            path: "$.items[1].serial".to_string()
        }
    );
}

#[test]
fn test_list_with_mandatory_list_missing_fails() {
    let data = json!({"other": []});
    let error = map_template_to_instance(&item_list(Some("OneToMany"), None), &data, "en", "x")
        .unwrap_err();

    assert_eq!(
        error.kind(),
        &MappingErrorKind::PathNotFound {
            path: "$.items[*]".to_string()
        }
    );
    assert_eq!(error.message(), "could not find $.items[*] in data json");
}

#[test]
fn test_list_with_optional_element_missing() {
    let data = json!({"items": [{"name": "A", "serial": "1"}, {"name": "B"}]});
    let instance = map(&item_list(None, Some("ZeroToOne")), &data);

    assert_eq!(values(&instance, "Name"), vec![json!("A"), json!("B")]);
    assert_eq!(values(&instance, "Serial"), vec![json!("1"), json!("")]);
}

#[test]
fn test_list_with_optional_list_missing() {
    let instance = map(&item_list(Some("ZeroToMany"), None), &json!({}));
    assert_eq!(instance["submodelElements"], json!([]));
    assert_eq!(instance["kind"], "Instance");
}

#[test]
fn test_multi_language_property_gets_language_tag() {
    let template = submodel(vec![json!({
        "idShort": "Description",
        "modelType": "MultiLanguageProperty",
        "qualifiers": [{"type": "SMT/MappingInfo", "value": "$.description"}]
    })]);
    let data = json!({"description": "Kreiselpumpe"});
    let instance = map_template_to_instance(&template, &data, "de", "x").unwrap();

    assert_eq!(
        instance["submodelElements"][0]["value"],
        json!([{"text": "Kreiselpumpe", "language": "de"}])
    );
}

#[test]
fn test_template_and_data_are_left_untouched() {
    let template = item_list(None, None);
    let data = json!({"items": [{"name": "A"}]});
    let template_before = template.clone();
    let data_before = data.clone();

    let mapper = SubmodelMapper::new();
    let first = mapper.map(&template, &data, "en", "urn:a").unwrap();
    let second = mapper.map(&template, &data, "en", "urn:b").unwrap();

    assert_eq!(template, template_before);
    assert_eq!(data, data_before);
    assert_eq!(first["id"], "urn:a");
    assert_eq!(second["id"], "urn:b");
    assert_eq!(first["submodelElements"], second["submodelElements"]);
}

#[test]
fn test_template_without_id_fails() {
    let mut template = nameplate();
    template.as_object_mut().unwrap().remove("id");
    let error = map_template_to_instance(&template, &json!({"manufacturer": "ACME"}), "en", "x")
        .unwrap_err();
    assert_eq!(error.kind(), &MappingErrorKind::MissingIdentifierField);
}

#[test]
fn test_ten_thousand_list_entries() {
    let items: Vec<Value> = (0..10_000)
        .map(|i| json!({"name": format!("Item {i}")}))
        .collect();
    let template = submodel(vec![collection(
        "Item",
        "$.items[*]",
        None,
        json!([property("Name", "$.items[*].name", None)]),
    )]);
    let instance = map(&template, &json!({"items": items}));

    let elements = instance["submodelElements"].as_array().unwrap();
    assert_eq!(elements.len(), 10_000);
    assert_eq!(elements[9_999]["idShort"], "Item_9999");
    assert_eq!(elements[9_999]["value"][0]["value"], "Item 9999");
}
