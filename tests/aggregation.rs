//! Aggregation Tests
//!
//! Feeds CoreNLP-shaped JSON documents through the decoder and aggregator and
//! checks the resulting entity and reference collections.

use instanlp::nlp::{aggregate, aggregate_response, AnnotationResponse, EntityType, NlpError};
use serde_json::{json, Value};

fn edge(governor: &str, dependent: &str) -> Value {
    json!({"dep": "dep", "governorGloss": governor, "dependentGloss": dependent})
}

fn sentence(mentions: Value, basic: Vec<Value>, enhanced: Vec<Value>, plus: Vec<Value>) -> Value {
    json!({
        "entitymentions": mentions,
        "basicDependencies": basic,
        "enhancedDependencies": enhanced,
        "enhancedPlusPlusDependencies": plus,
    })
}

fn decode(document: Value) -> AnnotationResponse {
    AnnotationResponse::from_value(document).unwrap()
}

#[test]
fn person_is_collected_but_never_governs() {
    let doc = json!({"sentences": [sentence(
        json!([
            {"text": "Dr. Smith", "ner": "PERSON"},
            {"text": "Acme Corp", "ner": "ORGANIZATION"}
        ]),
        vec![edge("Acme Corp", "sponsor"), edge("Dr. Smith", "present")],
        vec![],
        vec![],
    )]});

    let result = aggregate_response(&decode(doc)).unwrap();

    assert_eq!(
        result.entities.get(EntityType::Person),
        Some(&["Dr. Smith".to_string()][..])
    );
    assert_eq!(
        result.entities.get(EntityType::Organization),
        Some(&["Acme Corp".to_string()][..])
    );
    assert_eq!(result.entities.len(), 2);

    assert_eq!(result.references.len(), 1);
    assert_eq!(
        result.references.get("Acme Corp"),
        Some(&["sponsor".to_string()][..])
    );
    assert!(result.references.get("Dr. Smith").is_none());
}

#[test]
fn dependent_seen_in_several_graphs_is_recorded_once() {
    let doc = json!({"sentences": [sentence(
        json!([{"text": "Acme Corp", "ner": "ORGANIZATION"}]),
        vec![edge("Acme Corp", "sponsor")],
        vec![edge("Acme Corp", "sponsor")],
        vec![edge("Acme Corp", "sponsor"), edge("Acme Corp", "event")],
    )]});

    let result = aggregate_response(&decode(doc)).unwrap();

    assert_eq!(
        result.references.get("Acme Corp"),
        Some(&["sponsor".to_string(), "event".to_string()][..])
    );
}

#[test]
fn governor_spanning_sentences_merges_dependents() {
    let doc = json!({"sentences": [
        sentence(
            json!([{"text": "CEO", "ner": "TITLE"}]),
            vec![edge("CEO", "founder")],
            vec![],
            vec![],
        ),
        sentence(
            json!([{"text": "CEO", "ner": "TITLE"}]),
            vec![edge("CEO", "investor")],
            vec![edge("CEO", "founder")],
            vec![],
        ),
    ]});

    let result = aggregate_response(&decode(doc)).unwrap();

    assert_eq!(result.references.len(), 1);
    assert_eq!(
        result.references.get("CEO"),
        Some(&["founder".to_string(), "investor".to_string()][..])
    );
    // Duplicate mentions across sentences are kept
    assert_eq!(
        result.entities.get(EntityType::Title),
        Some(&["CEO".to_string(), "CEO".to_string()][..])
    );
}

#[test]
fn governor_not_mentioned_in_sentence_is_ignored() {
    let doc = json!({"sentences": [
        sentence(
            json!([{"text": "Acme Corp", "ner": "ORGANIZATION"}]),
            vec![],
            vec![],
            vec![],
        ),
        // Acme Corp governs here, but this sentence does not mention it
        sentence(json!([]), vec![edge("Acme Corp", "sponsor")], vec![], vec![]),
    ]});

    let result = aggregate_response(&decode(doc)).unwrap();
    assert!(result.references.is_empty());
    assert_eq!(result.entities.mention_count(), 1);
}

#[test]
fn mention_counts_match_input() {
    let doc = json!({"sentences": [
        sentence(
            json!([
                {"text": "Roma", "ner": "CITY"},
                {"text": "Milano", "ner": "CITY"},
                {"text": "2021", "ner": "DATE"}
            ]),
            vec![],
            vec![],
            vec![],
        ),
        sentence(
            json!([
                {"text": "Roma", "ner": "CITY"},
                {"text": "info@example.com", "ner": "EMAIL"}
            ]),
            vec![],
            vec![],
            vec![],
        ),
    ]});

    let response = decode(doc);
    let first = aggregate_response(&response).unwrap();
    let second = aggregate_response(&response).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.entities.get(EntityType::City).map(|m| m.len()), Some(3));
    assert_eq!(first.entities.get(EntityType::Date).map(|m| m.len()), Some(1));
    assert_eq!(first.entities.get(EntityType::Email).map(|m| m.len()), Some(1));
    assert_eq!(first.entities.mention_count(), 5);
}

#[test]
fn unknown_types_and_empty_input_produce_nothing() {
    let doc = json!({"sentences": [sentence(
        json!([
            {"text": "yesterday", "ner": "DURATION"},
            {"text": "Rossi", "ner": "MISC"}
        ]),
        vec![edge("Rossi", "artist")],
        vec![],
        vec![],
    )]});
    assert!(aggregate_response(&decode(doc)).unwrap().is_empty());

    let empty = decode(json!({"sentences": []}));
    assert!(aggregate_response(&empty).unwrap().is_empty());
}

#[test]
fn bare_string_is_upstream_failure() {
    let response = decode(json!("CoreNLP request timed out. Your document may be too long."));
    let err = aggregate_response(&response).unwrap_err();
    assert!(err.is_upstream_failure());
}

#[test]
fn missing_dependency_list_is_malformed() {
    let doc = json!({"sentences": [{
        "entitymentions": [],
        "basicDependencies": [],
        "enhancedDependencies": []
    }]});
    let err = AnnotationResponse::from_value(doc).unwrap_err();
    assert!(matches!(err, NlpError::MalformedAnnotation(_)));
}

#[test]
fn output_shape_is_list_of_single_key_maps() {
    let doc = json!({"sentences": [sentence(
        json!([
            {"text": "Acme Corp", "ner": "ORGANIZATION"},
            {"text": "Italia", "ner": "COUNTRY"}
        ]),
        vec![edge("Acme Corp", "sponsor")],
        vec![],
        vec![],
    )]});

    let response = decode(doc);
    let AnnotationResponse::Structured(ref annotated) = response else {
        panic!("expected structured response");
    };
    let value = serde_json::to_value(aggregate(annotated)).unwrap();

    assert_eq!(
        value,
        json!({
            "entities": [{"ORGANIZATION": ["Acme Corp"]}, {"COUNTRY": ["Italia"]}],
            "references": [{"Acme Corp": ["sponsor"]}]
        })
    );
}
