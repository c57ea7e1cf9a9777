use std::fs;
use std::path::PathBuf;

use bluesbook_client::api::{
    parse_chat_health_json, parse_chat_reply_json, parse_manager_json, parse_managers_json,
    parse_player_json, parse_players_json, parse_search_json, parse_statistics_json,
    parse_suggestions_json,
};
use bluesbook_client::error::FetchError;
use bluesbook_client::models::{EntityKind, SearchHit};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_players_fixture() {
    let raw = read_fixture("players.json");
    let players = parse_players_json(&raw).expect("fixture should parse");
    assert_eq!(players.len(), 3);
    assert_eq!(players[0].id, "cp20");
    assert_eq!(players[0].name, "Cole Palmer");
    assert_eq!(players[0].jersey_number, 20);
    assert_eq!(players[0].signing_fee.as_deref(), Some("£42.5M"));
    assert_eq!(players[0].fun_facts.len(), 2);
    // Optional profile fields absent in the payload read as empty defaults.
    assert_eq!(players[1].age, None);
    assert!(players[1].fun_facts.is_empty());
}

#[test]
fn parses_single_player_fixture() {
    let raw = read_fixture("player.json");
    let player = parse_player_json(&raw).expect("fixture should parse");
    assert_eq!(player.id, "cp20");
    assert_eq!(player.weekly_salary.as_deref(), Some("£130,000"));
}

#[test]
fn parses_mixed_search_hits() {
    let raw = read_fixture("search_hits.json");
    let hits = parse_search_json(&raw).expect("fixture should parse");
    assert_eq!(hits.len(), 2);
    match &hits[0] {
        SearchHit::Player(p) => {
            assert_eq!(p.name, "Cole Palmer");
            assert_eq!(p.jersey_number, Some(20));
        }
        other => panic!("expected player hit, got {other:?}"),
    }
    match &hits[1] {
        SearchHit::Manager(m) => {
            assert_eq!(m.name, "Enzo Maresca");
            assert_eq!(m.nationality.as_deref(), Some("Italy"));
        }
        other => panic!("expected manager hit, got {other:?}"),
    }
}

#[test]
fn parses_suggestions_fixture() {
    let raw = read_fixture("suggestions.json");
    let suggestions = parse_suggestions_json(&raw).expect("fixture should parse");
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].kind, EntityKind::Player);
    assert_eq!(suggestions[0].position.as_deref(), Some("MID"));
    assert_eq!(suggestions[1].kind, EntityKind::Manager);
    assert_eq!(suggestions[1].jersey_number, None);
}

#[test]
fn parses_manager_fixture() {
    let raw = read_fixture("manager.json");
    let manager = parse_manager_json(&raw).expect("fixture should parse");
    assert_eq!(manager.name, "Enzo Maresca");
    assert_eq!(manager.tenure_start.as_deref(), Some("2024-07-01"));
}

#[test]
fn parses_manager_search_results() {
    let raw = r#"{"success": true, "data": [
        {"id": "em1", "name": "Enzo Maresca", "nationality": "Italy"},
        {"id": "tt1", "name": "Thomas Tuchel", "nationality": "Germany"}
    ]}"#;
    let managers = parse_managers_json(raw).expect("inline payload should parse");
    assert_eq!(managers.len(), 2);
    assert_eq!(managers[1].nationality, "Germany");
}

#[test]
fn parses_statistics_fixture() {
    let raw = read_fixture("statistics.json");
    let stats = parse_statistics_json(&raw).expect("fixture should parse");
    assert_eq!(stats.basic_metrics.total_players, 28);
    assert!((stats.basic_metrics.average_age - 24.3).abs() < 1e-9);
    assert_eq!(stats.tactical_analysis.position_depth.get("MID"), Some(&10));
    assert_eq!(
        stats.squad_demographics.nationality_breakdown.get("England"),
        Some(&8)
    );
}

#[test]
fn chat_reply_payload_sits_beside_success() {
    let raw = read_fixture("chat_reply.json");
    let reply = parse_chat_reply_json(&raw).expect("fixture should parse");
    assert!(reply.message.contains("22 goals"));
    assert_eq!(reply.timestamp, Some(1756200000));
}

#[test]
fn chat_failure_surfaces_backend_error() {
    let raw = r#"{"success": false, "error": "AI service unavailable"}"#;
    let err = parse_chat_reply_json(raw).expect_err("failure envelope should error");
    assert_eq!(err, FetchError::Server("AI service unavailable".to_string()));
}

#[test]
fn parses_chat_health_fixture() {
    let raw = read_fixture("chat_health.json");
    let health = parse_chat_health_json(&raw).expect("fixture should parse");
    assert!(health.healthy);
    assert_eq!(health.status.as_deref(), Some("operational"));
    assert_eq!(health.service.as_deref(), Some("bluesbook-chat"));
}

#[test]
fn failure_envelope_carries_backend_message() {
    let raw = read_fixture("error_envelope.json");
    let err = parse_player_json(&raw).expect_err("failure envelope should error");
    assert_eq!(err, FetchError::Server("Player not found".to_string()));
}

#[test]
fn failure_envelope_without_message_still_errors() {
    let err = parse_players_json(r#"{"success": false}"#)
        .expect_err("failure envelope should error");
    assert!(matches!(err, FetchError::Server(_)));
}

#[test]
fn successful_envelope_without_data_is_malformed() {
    let err = parse_players_json(r#"{"success": true}"#)
        .expect_err("missing data should error");
    assert!(matches!(err, FetchError::MalformedResponse(_)));
}

#[test]
fn empty_result_set_is_not_an_error() {
    let players =
        parse_players_json(r#"{"success": true, "data": []}"#).expect("empty list should parse");
    assert!(players.is_empty());
}

#[test]
fn garbage_body_is_malformed() {
    let err = parse_players_json("<html>502 Bad Gateway</html>")
        .expect_err("non-json should error");
    assert!(matches!(err, FetchError::MalformedResponse(_)));
}
