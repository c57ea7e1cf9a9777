use std::time::{Duration, Instant, SystemTime};

use bluesbook_client::cache::SearchKey;
use bluesbook_client::error::FetchError;
use bluesbook_client::models::{EntityKind, ManagerHit, PlayerHit, SearchCategory, SearchHit};
use bluesbook_client::search::SearchSession;

fn player_hit(name: &str, position: &str, number: u32) -> SearchHit {
    SearchHit::Player(PlayerHit {
        id: name.to_lowercase().replace(' ', "-"),
        name: name.to_string(),
        position: Some(position.to_string()),
        jersey_number: Some(number),
        nationality: None,
        image_url: None,
    })
}

fn manager_hit(name: &str, nationality: &str) -> SearchHit {
    SearchHit::Manager(ManagerHit {
        id: name.to_lowercase().replace(' ', "-"),
        name: name.to_string(),
        nationality: Some(nationality.to_string()),
        tenure_start: None,
        photo: None,
    })
}

fn session() -> SearchSession {
    SearchSession::with_settings(Duration::from_secs(300), Duration::from_millis(300))
}

#[test]
fn typing_burst_fetches_once_with_final_query() {
    let start = Instant::now();
    let wall = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    let mut session = session();
    let mut fetches = 0;

    session.on_input("pa", SearchCategory::All, 10, start);
    session.on_input("pal", SearchCategory::All, 10, start + Duration::from_millis(120));
    session.on_input("palmer", SearchCategory::All, 10, start + Duration::from_millis(250));

    // Nothing due while the user is still typing.
    assert_eq!(session.poll_due(start + Duration::from_millis(400)), None);

    let key = session
        .poll_due(start + Duration::from_millis(600))
        .expect("quiesced query should fire");
    assert_eq!(key, SearchKey::new("palmer", SearchCategory::All, 10));

    let hits = session
        .run(&key, wall, || {
            fetches += 1;
            Ok(vec![player_hit("Cole Palmer", "MID", 20)])
        })
        .expect("fetch should succeed");
    assert_eq!(fetches, 1);
    assert_eq!(hits.len(), 1);

    // One burst, one fetch; nothing else pending.
    assert_eq!(session.poll_due(start + Duration::from_secs(5)), None);
}

#[test]
fn repeated_query_is_served_from_cache() {
    let start = Instant::now();
    let wall = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    let mut session = session();
    let mut fetches = 0;

    for round in 0..3u64 {
        let typed_at = start + Duration::from_secs(round * 10);
        session.on_input("palmer", SearchCategory::All, 10, typed_at);
        let key = session
            .poll_due(typed_at + Duration::from_millis(301))
            .expect("query should fire");
        session
            .run(&key, wall + Duration::from_secs(round * 10), || {
                fetches += 1;
                Ok(vec![player_hit("Cole Palmer", "MID", 20)])
            })
            .expect("fetch should succeed");
    }

    assert_eq!(fetches, 1);
    assert_eq!(session.cache_stats().entries, 1);
}

#[test]
fn fetch_failure_leaves_cache_retryable() {
    let start = Instant::now();
    let wall = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    let mut session = session();

    session.on_input("palmer", SearchCategory::All, 10, start);
    let key = session
        .poll_due(start + Duration::from_millis(301))
        .expect("query should fire");

    let err = session
        .run(&key, wall, || {
            Err(FetchError::Network("connection refused".to_string()))
        })
        .expect_err("fetch failure should propagate");
    assert!(matches!(err, FetchError::Network(_)));
    assert_eq!(session.cache_stats().entries, 0);

    let mut fetches = 0;
    session
        .run(&key, wall, || {
            fetches += 1;
            Ok(vec![player_hit("Cole Palmer", "MID", 20)])
        })
        .expect("retry should succeed");
    assert_eq!(fetches, 1);
}

#[test]
fn hits_become_highlighted_suggestion_rows() {
    let session = session();
    let hits = vec![
        player_hit("Cole Palmer", "MID", 20),
        manager_hit("Enzo Maresca", "Italy"),
    ];

    let records = session.suggest_from_hits(&hits, "pal");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text, "Cole [Pal]mer");
    assert_eq!(records[0].kind, EntityKind::Player);
    assert_eq!(records[0].summary, "MID • #20");
    assert_eq!(records[1].text, "Enzo Maresca");
    assert_eq!(records[1].summary, "Manager • Italy");
}

#[test]
fn suggestion_rows_are_capped() {
    let session = session();
    let hits: Vec<SearchHit> = (0..20)
        .map(|idx| player_hit(&format!("Player {idx}"), "MID", idx))
        .collect();

    let records = session.suggest_from_hits(&hits, "player");
    assert_eq!(records.len(), session.max_suggestions());
}

#[test]
fn clear_cache_forces_refetch() {
    let start = Instant::now();
    let wall = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    let mut session = session();
    let mut fetches = 0;
    let key = SearchKey::new("palmer", SearchCategory::All, 10);

    session.on_input("palmer", SearchCategory::All, 10, start);
    let due = session
        .poll_due(start + Duration::from_millis(301))
        .expect("query should fire");
    assert_eq!(due, key);
    session
        .run(&key, wall, || {
            fetches += 1;
            Ok(vec![player_hit("Cole Palmer", "MID", 20)])
        })
        .expect("fetch should succeed");

    session.clear_cache();
    session
        .run(&key, wall, || {
            fetches += 1;
            Ok(vec![player_hit("Cole Palmer", "MID", 20)])
        })
        .expect("refetch should succeed");
    assert_eq!(fetches, 2);
}
