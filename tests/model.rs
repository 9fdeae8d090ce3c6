use std::fs;
use std::path::PathBuf;

use serde_json::json;

use coach_terminal::error::ModelError;
use coach_terminal::game_mode::GameMode;
use coach_terminal::model::{
    AgendaStatus, Capability, CapabilityPayload, ComparisonPair, Severity, envelope,
    parse_envelope, parse_result,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_insights_fixture() {
    let raw = read_fixture("insights_valorant.json");
    let result = parse_result(Capability::Insights, &GameMode::valorant(), &raw)
        .expect("fixture should parse");
    let CapabilityPayload::Insights(data) = result.payload else {
        panic!("expected insights");
    };
    assert_eq!(data.player_name, "OXY");
    assert_eq!(data.data_points.len(), 3);
    assert_eq!(data.data_points[1].value, json!(1.45));
    assert_eq!(data.data_points[2].context, None);
    assert_eq!(data.insights[0].severity, Some(Severity::Critical));
    assert_eq!(data.insights[1].explanation, None);
    assert_eq!(data.strategic_recommendations[1].action, None);
    assert!(data.ai_commentary.is_some());
}

#[test]
fn unknown_status_is_kept() {
    let raw = read_fixture("macro_review_valorant.json");
    let result = parse_result(Capability::MacroReview, &GameMode::valorant(), &raw)
        .expect("fixture should parse");
    let CapabilityPayload::MacroReview(data) = result.payload else {
        panic!("expected macro review");
    };
    assert_eq!(
        data.agenda_items[0].status,
        Some(AgendaStatus::Other("won_both".to_string()))
    );
    assert_eq!(data.agenda_items[2].status, Some(AgendaStatus::Critical));
    assert_eq!(data.tournament, None);
}

#[test]
fn camel_case_fields_are_accepted() {
    let raw = r#"{
        "playerName": "Berserker",
        "dataPoints": [{"metric": "KDA", "value": 10}],
        "aiCommentary": "Clean laning."
    }"#;
    let result = parse_result(Capability::Insights, &GameMode::league_of_legends(), raw)
        .expect("camelCase payload");
    let CapabilityPayload::Insights(data) = result.payload else {
        panic!("expected insights");
    };
    assert_eq!(data.player_name, "Berserker");
    assert_eq!(data.data_points.len(), 1);
    assert_eq!(data.ai_commentary.as_deref(), Some("Clean laning."));
}

#[test]
fn both_pairs_resolve_to_generic_actions() {
    let raw = read_fixture("prediction_both_pairs.json");
    let result = parse_result(Capability::Prediction, &GameMode::league_of_legends(), &raw)
        .expect("fixture should parse");
    let CapabilityPayload::Prediction(data) = result.payload else {
        panic!("expected prediction");
    };
    let ComparisonPair::Actions {
        original,
        alternative,
    } = data.comparison
    else {
        panic!("generic pair should win");
    };
    assert_eq!(original.map(|o| o.action), Some("Contest".to_string()));
    assert_eq!(alternative.map(|a| a.action), Some("Concede".to_string()));
}

#[test]
fn missing_required_field_is_rejected() {
    let err = parse_result(
        Capability::Insights,
        &GameMode::valorant(),
        r#"{"data_points": []}"#,
    )
    .expect_err("player_name is required");
    assert!(matches!(
        err,
        ModelError::InvalidPayload {
            capability: Capability::Insights,
            ..
        }
    ));

    let err = parse_result(
        Capability::Prediction,
        &GameMode::valorant(),
        r#"{"recommendation": "Save"}"#,
    )
    .expect_err("scenario is required");
    assert!(err.to_string().contains("scenario"));
}

#[test]
fn wrong_kinds_are_rejected() {
    for (cap, raw) in [
        (
            Capability::Insights,
            r#"{"player_name": "OXY", "data_points": [{"metric": "KDA", "value": true}]}"#,
        ),
        (
            Capability::Insights,
            r#"{"player_name": "OXY", "insights": [{"finding": "x", "severity": 3}]}"#,
        ),
        (
            Capability::MacroReview,
            r#"{"match_id": "m", "agenda_items": {"category": "x"}}"#,
        ),
        (
            Capability::Prediction,
            r#"{"scenario": "x", "game_state": ["not", "a", "map"]}"#,
        ),
        (
            Capability::Prediction,
            r#"{"scenario": "x", "original_action": {"action": 5}}"#,
        ),
        (
            Capability::Prediction,
            r#"{"scenario": "x", "alternative_action": {"success_probability": "60%"}}"#,
        ),
    ] {
        let err = parse_result(cap, &GameMode::valorant(), raw).expect_err(raw);
        assert!(
            matches!(err, ModelError::InvalidPayload { .. }),
            "{raw}: {err}"
        );
    }
}

#[test]
fn non_objects_and_garbage_are_rejected() {
    let err = parse_result(Capability::Insights, &GameMode::valorant(), "[1, 2]")
        .expect_err("array");
    assert!(matches!(err, ModelError::NotAnObject { found: "array" }));

    let err = parse_result(Capability::Insights, &GameMode::valorant(), "{not json")
        .expect_err("garbage");
    assert!(matches!(err, ModelError::Malformed(_)));
}

#[test]
fn envelope_fixture_round_trips_through_the_registry() {
    let raw = read_fixture("envelope_prediction_lol.json");
    let result = parse_envelope(&raw).expect("envelope should parse");
    assert_eq!(result.capability(), Capability::Prediction);
    assert_eq!(result.game_mode, GameMode::league_of_legends());

    let raw = read_fixture("envelope_insights_valorant.json");
    let result = parse_envelope(&raw).expect("envelope should parse");
    assert_eq!(result.capability(), Capability::Insights);
    assert_eq!(result.game_mode, GameMode::valorant());
}

#[test]
fn envelope_accepts_aliases_and_defaults_mode() {
    let raw = json!({
        "capability": "macro-review",
        "gameMode": "LoL",
        "payload": {"match_id": "m1"}
    })
    .to_string();
    let result = parse_envelope(&raw).expect("aliased mode");
    assert_eq!(result.game_mode, GameMode::league_of_legends());

    let raw = json!({"capability": "macro-review", "payload": {}}).to_string();
    let result = parse_envelope(&raw).expect("mode defaults");
    assert_eq!(result.game_mode, GameMode::valorant());

    let built = envelope(
        Capability::Prediction,
        &GameMode::valorant(),
        json!({"scenario": "Save?"}),
    );
    let result = parse_envelope(&built.to_string()).expect("built envelope");
    assert_eq!(result.capability(), Capability::Prediction);
}

#[test]
fn envelope_errors_are_typed() {
    let err = parse_envelope(r#"{"payload": {}}"#).expect_err("no capability");
    assert!(matches!(err, ModelError::MissingDiscriminant));

    let err = parse_envelope(r#"{"capability": null, "payload": {}}"#).expect_err("null");
    assert!(matches!(err, ModelError::MissingDiscriminant));

    let err = parse_envelope(r#"{"capability": "draft-helper", "payload": {}}"#)
        .expect_err("unknown capability");
    assert!(matches!(err, ModelError::UnknownCapability(id) if id == "draft-helper"));

    let err = parse_envelope(r#"{"capability": "predict-scenario"}"#).expect_err("no payload");
    assert!(matches!(err, ModelError::InvalidPayload { .. }));
}
