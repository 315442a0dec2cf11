//! Batch-level tests for the custom-skill interface.

use std::collections::BTreeSet;

use mdtablejson::{
    ConvertOptions, MISSING_TEXT_WARNING, TableConverterRequest, TableConverterResponse,
    convert_batch, convert_request_json,
    skill::{Issue, SkillInputRecord, SkillRequest, TableConverterInput},
};
use serde_json::{Value, json};

mod prelude;
use prelude::*;

fn run(body: &Value) -> TableConverterResponse {
    let request: TableConverterRequest =
        serde_json::from_value(body.clone()).expect("valid request");
    convert_batch(request, &ConvertOptions::default())
}

#[fixture]
fn mixed_batch() -> Value {
    skill_request(&[
        ("a", Some("| A | B |\n|---|---|\n| 1 | 2 |")),
        ("b", None),
        ("c", Some("no tables here")),
        ("d", Some("")),
        ("e", Some("x\n\n| K |\n|---|\n| v |")),
    ])
}

#[rstest]
fn every_record_is_answered_once(mixed_batch: Value) {
    let response = run(&mixed_batch);
    assert_eq!(response.values.len(), 5);
    let ids: BTreeSet<_> = response.values.iter().map(|r| r.record_id.as_str()).collect();
    assert_eq!(ids, BTreeSet::from(["a", "b", "c", "d", "e"]));
}

#[rstest]
fn partition_then_concatenate_order(mixed_batch: Value) {
    let ids: Vec<_> = run(&mixed_batch)
        .values
        .into_iter()
        .map(|r| r.record_id)
        .collect();
    assert_eq!(ids, vec!["a", "c", "e", "b", "d"]);
}

#[rstest]
fn records_without_text_get_one_warning(mixed_batch: Value) {
    let response = run(&mixed_batch);
    for record in response.values.iter().filter(|r| ["b", "d"].contains(&r.record_id.as_str())) {
        assert_eq!(record.data.text, None);
        assert_eq!(record.warnings, vec![Issue::new(MISSING_TEXT_WARNING)]);
        assert!(record.errors.is_empty());
    }
}

#[rstest]
fn records_with_text_are_converted_without_issues(mixed_batch: Value) {
    let response = run(&mixed_batch);
    let by_id = |id: &str| {
        response
            .values
            .iter()
            .find(|r| r.record_id == id)
            .expect("record present")
    };
    assert_eq!(
        by_id("a").data.text.as_deref(),
        Some(fenced(r#"[  {    "A": "1",    "B": "2"  }]"#).as_str())
    );
    assert_eq!(by_id("c").data.text.as_deref(), Some("no tables here"));
    assert_eq!(
        by_id("e").data.text.as_deref(),
        Some(format!("x  {}", fenced(r#"[  {    "K": "v"  }]"#)).as_str())
    );
    for id in ["a", "c", "e"] {
        assert!(by_id(id).warnings.is_empty());
        assert!(by_id(id).errors.is_empty());
    }
}

#[test]
fn two_record_batch_end_to_end() {
    let body = skill_request(&[("r1", Some("| A |\n|---|\n| 1 |")), ("r2", None)]);
    let out = convert_request_json(&body.to_string(), &ConvertOptions::default())
        .expect("valid request");
    let response: Value = serde_json::from_str(&out).expect("response is JSON");
    assert_eq!(
        response,
        json!({"values": [
            {
                "recordId": "r1",
                "data": {"text": fenced(r#"[  {    "A": "1"  }]"#)},
                "errors": [],
                "warnings": [],
            },
            {
                "recordId": "r2",
                "data": {"text": null},
                "errors": [],
                "warnings": [{"message": "No input text provided."}],
            },
        ]})
    );
}

#[test]
fn record_ids_are_opaque() {
    let id = "  weird/ID with spaces & ünïcode  ";
    let response = run(&skill_request(&[(id, Some("t"))]));
    assert_eq!(response.values[0].record_id, id);
}

#[test]
fn missing_data_is_treated_as_missing_text() {
    let response = run(&json!({"values": [{"recordId": "solo"}]}));
    assert_eq!(response.values[0].warnings.len(), 1);
}

#[test]
fn empty_batch_yields_empty_response() {
    let response = run(&json!({"values": []}));
    assert!(response.values.is_empty());
}

#[test]
fn typed_requests_can_be_built_directly() {
    let request = SkillRequest {
        values: vec![SkillInputRecord {
            record_id: String::from("typed"),
            data: TableConverterInput {
                text: Some(String::from("a\nb")),
            },
        }],
    };
    let response = convert_batch(
        request,
        &ConvertOptions {
            newlines: mdtablejson::NewlineMode::Strip,
        },
    );
    assert_eq!(response.values[0].data.text.as_deref(), Some("ab"));
}

#[rstest(
    body,
    case::not_json("values"),
    case::wrong_shape(r#"{"values": {"recordId": "a"}}"#),
    case::missing_id(r#"{"values": [{"data": {"text": "x"}}]}"#),
)]
fn invalid_requests_are_rejected(body: &str) {
    let err = convert_request_json(body, &ConvertOptions::default())
        .expect_err("request should be rejected");
    assert!(matches!(err, mdtablejson::Error::InvalidRequest(_)));
}
