//! Path resolver behaviour over a representative source document

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use smt_mapper::path::{JsonPath, ParseError, PathError, select_many, select_one};

#[fixture]
fn order() -> Value {
    json!({
        "orderId": "PO-17",
        "customer": {"name": "ACME", "address": {"city": "Berlin"}},
        "lines": [
            {"sku": "P-1", "quantity": 2, "price": 9.5, "tags": ["pump"]},
            {"sku": "P-2", "quantity": 1, "price": 120},
            {"sku": "V-9", "quantity": 10, "price": 3.25, "tags": []}
        ]
    })
}

#[rstest]
#[case("$.orderId", json!(["PO-17"]))]
#[case("$['customer']['address'].city", json!(["Berlin"]))]
#[case("customer.name", json!(["ACME"]))]
#[case("$.lines[1].sku", json!(["P-2"]))]
#[case("$.lines[*].sku", json!(["P-1", "P-2", "V-9"]))]
#[case("$..city", json!(["Berlin"]))]
#[case("$.lines[?(@.quantity > 1)].sku", json!(["P-1", "V-9"]))]
#[case("$.lines[?(@.price == 120.0)].sku", json!(["P-2"]))]
#[case("$.lines[?(@.sku != 'P-1' && @.tags)].sku", json!(["V-9"]))]
#[case("$.lines[?(!@.tags)].quantity", json!([1]))]
#[case("$.lines[9]", json!([]))]
#[case("$.nothing[*].here", json!([]))]
fn test_selects(order: Value, #[case] path: &str, #[case] expected: Value) {
    let selected: Vec<Value> = select_many(&order, path, false)
        .unwrap()
        .into_iter()
        .cloned()
        .collect();
    assert_eq!(Value::Array(selected), expected);
}

#[rstest]
fn test_single_selection(order: Value) {
    assert_eq!(select_one(&order, "$.lines[0].price").unwrap(), Some(&json!(9.5)));
    assert_eq!(select_one(&order, "$.lines[0].missing").unwrap(), None);
    assert_eq!(
        select_one(&order, "$.lines[*].sku").unwrap_err(),
        PathError::MultipleMatches {
            path: "$.lines[*].sku".to_string(),
            count: 3
        }
    );
}

#[rstest]
fn test_mandatory_selection_reports_path(order: Value) {
    let error = select_many(&order, "$.shipments[*]", true).unwrap_err();
    assert_eq!(error.to_string(), "could not find $.shipments[*] in data json");
}

#[rstest]
#[case("")]
#[case("$.lines[")]
#[case("$.lines[-1]")]
#[case("$.lines[?(@.sku == 'P-1']")]
#[case("$.a.")]
fn test_rejects_malformed_paths(#[case] path: &str) {
    assert!(JsonPath::parse(path).is_err());
    assert!(matches!(
        path.parse::<JsonPath>(),
        Err(PathError::Syntax { .. })
    ));
}

#[test]
fn test_empty_expression_error() {
    assert_eq!(JsonPath::parse(""), Err(ParseError::EmptyExpression));
}

#[rstest]
fn test_compiled_path_is_reusable(order: Value) {
    let path: JsonPath = "$.lines[*].quantity".parse().unwrap();
    let other = json!({"lines": [{"quantity": 5}]});

    assert_eq!(path.select(&order).len(), 3);
    assert_eq!(path.select(&other), vec![&json!(5)]);
    assert_eq!(path.expression(), "$.lines[*].quantity");
}
