//! Integration tests for vigil-store
//!
//! These tests exercise the full persistence cycle: observations, claims,
//! support links, counters, transactions and full-text search.

use vigil_domain::traits::{ClaimStore, CorpusSearch};
use vigil_domain::{Claim, ClaimDraft, ClaimId, Observation, RevisionGroup};
use vigil_store::{FtsSearch, SqliteStore, StoreError};

fn claim(text: &str, reasoning: &str) -> Claim {
    Claim::from_draft(
        ClaimDraft::new(text, reasoning).with_confidence(7),
        RevisionGroup::new(),
        1_000,
    )
}

fn observation(content: &str) -> Observation {
    Observation::new("screen", content, "input_text", 1_000)
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_insert_and_get_claim() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let c = Claim {
        decay: Some(4),
        ..claim("Prefers dark mode", "Switched theme in three apps")
    };

    store.insert_claim(&c).unwrap();
    let retrieved = store.get_claim(c.id).unwrap().expect("claim should exist");
    assert_eq!(retrieved, c);

    assert!(store.get_claim(ClaimId::new()).unwrap().is_none());
}

#[test]
fn test_claim_without_confidence_round_trips_as_none() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let c = Claim::from_draft(ClaimDraft::new("Uses vim", ""), RevisionGroup::new(), 5);
    store.insert_claim(&c).unwrap();

    let retrieved = store.get_claim(c.id).unwrap().unwrap();
    assert_eq!(retrieved.confidence, None);
    assert_eq!(retrieved.reasoning, "");
}

#[test]
fn test_link_is_idempotent() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let o = observation("typing in terminal");
    let c = claim("Works in the terminal", "Terminal frontmost");
    store.insert_observation(&o).unwrap();
    store.insert_claim(&c).unwrap();

    assert!(store.link_observation(o.id, c.id).unwrap());
    assert!(!store.link_observation(o.id, c.id).unwrap());
    assert_eq!(store.count_links().unwrap(), 1);

    let linked = store.observations_for_claim(c.id).unwrap();
    assert_eq!(linked, vec![o.clone()]);
    assert_eq!(store.claims_for_observation(o.id).unwrap().len(), 1);
}

#[test]
fn test_delete_claim_cascades_links() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let o = observation("reading docs");
    let keep = claim("Reads documentation", "docs.rs open");
    let gone = claim("Learns Rust", "docs.rs open");
    store.insert_observation(&o).unwrap();
    store.insert_claim(&keep).unwrap();
    store.insert_claim(&gone).unwrap();
    store.link_observation(o.id, keep.id).unwrap();
    store.link_observation(o.id, gone.id).unwrap();

    assert!(store.delete_claim(gone.id).unwrap());
    assert!(!store.delete_claim(gone.id).unwrap());

    assert_eq!(store.count_claims().unwrap(), 1);
    assert_eq!(store.count_links().unwrap(), 1);
    // observation itself survives
    assert!(store.get_observation(o.id).unwrap().is_some());
}

#[test]
fn test_touch_updates_only_timestamp() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let c = claim("Writes tests first", "Opened tests before src");
    store.insert_claim(&c).unwrap();

    store.touch_claim(c.id, 9_999).unwrap();
    let touched = store.get_claim(c.id).unwrap().unwrap();
    assert_eq!(touched.updated_at, 9_999);
    assert_eq!(touched.created_at, c.created_at);
    assert_eq!(touched.text, c.text);
}

#[test]
fn test_counter_advance_and_reset() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    assert_eq!(store.counter("claims_since_consolidation").unwrap(), 0);
    assert_eq!(store.advance_counter("claims_since_consolidation", 3).unwrap(), 3);
    assert_eq!(store.advance_counter("claims_since_consolidation", 4).unwrap(), 7);
    assert_eq!(store.advance_counter("other", 1).unwrap(), 1);

    store.reset_counter("claims_since_consolidation").unwrap();
    assert_eq!(store.counter("claims_since_consolidation").unwrap(), 0);
    assert_eq!(store.counter("other").unwrap(), 1);
}

#[test]
fn test_rollback_discards_everything() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let o = observation("about to be rolled back");
    let c = claim("Transient", "never committed");

    store.begin().unwrap();
    store.insert_observation(&o).unwrap();
    store.insert_claim(&c).unwrap();
    store.link_observation(o.id, c.id).unwrap();
    store.advance_counter("n", 2).unwrap();
    store.rollback().unwrap();

    assert!(!store.in_transaction());
    assert_eq!(store.count_observations().unwrap(), 0);
    assert_eq!(store.count_claims().unwrap(), 0);
    assert_eq!(store.count_links().unwrap(), 0);
    assert_eq!(store.counter("n").unwrap(), 0);
}

#[test]
fn test_commit_persists() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let c = claim("Committed", "kept");

    store.begin().unwrap();
    store.insert_claim(&c).unwrap();
    store.commit().unwrap();

    assert_eq!(store.count_claims().unwrap(), 1);
}

#[test]
fn test_transaction_misuse() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    assert!(matches!(store.commit(), Err(StoreError::Transaction(_))));
    store.begin().unwrap();
    assert!(matches!(store.begin(), Err(StoreError::Transaction(_))));
    store.rollback().unwrap();
    // rollback with nothing open is a no-op
    store.rollback().unwrap();
}

#[test]
fn test_recent_claims_newest_first() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let a = claim("A", "");
    let b = claim("B", "");
    store.insert_claim(&a).unwrap();
    store.insert_claim(&b).unwrap();
    store.touch_claim(a.id, 5_000).unwrap();

    let recent = store.recent_claims(10).unwrap();
    assert_eq!(recent[0].id, a.id);
    assert_eq!(recent[1].id, b.id);
    assert_eq!(store.recent_claims(1).unwrap().len(), 1);
}

#[test]
fn test_search_ranks_matching_claims() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let rust = claim("Programs in Rust", "Edits Cargo.toml and .rs files");
    let cooking = claim("Enjoys cooking", "Browses recipe sites");
    store.insert_claim(&rust).unwrap();
    store.insert_claim(&cooking).unwrap();

    let hits = store.search_claims("rust cargo", 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].claim.id, rust.id);
    assert!(hits[0].score.is_finite());

    assert!(store.search_claims("", 5).unwrap().is_empty());
    assert!(store.search_claims("rust", 0).unwrap().is_empty());
}

#[test]
fn test_search_respects_limit() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    for i in 0..5 {
        store.insert_claim(&claim(&format!("Rust habit {i}"), "rust")).unwrap();
    }
    assert_eq!(store.search_claims("rust", 3).unwrap().len(), 3);
}

#[test]
fn test_search_index_follows_deletes() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let c = claim("Plays chess online", "lichess tab");
    store.insert_claim(&c).unwrap();
    assert_eq!(store.search_claims("chess", 5).unwrap().len(), 1);

    store.delete_claim(c.id).unwrap();
    assert!(store.search_claims("chess", 5).unwrap().is_empty());
}

#[tokio::test]
async fn test_fts_search_sees_committed_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vigil.db");

    let mut writer = SqliteStore::new(&path).unwrap();
    let search = FtsSearch::open(&path).unwrap();

    let c = claim("Listens to jazz while coding", "Music app next to editor");
    writer.begin().unwrap();
    writer.insert_claim(&c).unwrap();

    // uncommitted rows are invisible to the search connection
    assert!(search.search("jazz", 5).await.unwrap().is_empty());

    writer.commit().unwrap();
    let hits = search.search("jazz", 5).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].claim.id, c.id);
}
