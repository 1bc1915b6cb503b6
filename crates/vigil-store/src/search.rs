//! Corpus search over the FTS5 index

use crate::{SqliteStore, StoreError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use vigil_domain::traits::CorpusSearch;
use vigil_domain::ScoredClaim;

/// Upper bound on distinct words sent to a single MATCH expression
const MAX_QUERY_TERMS: usize = 64;

/// Turn free text into an FTS5 MATCH expression
///
/// Words are quoted individually and OR-ed together, so punctuation and FTS
/// operators in the input are never interpreted. Returns `None` when the text
/// holds no words.
///
/// # Examples
///
/// ```
/// use vigil_store::build_match_query;
///
/// assert_eq!(build_match_query("Writes Rust, daily!").as_deref(),
///            Some("\"writes\" OR \"rust\" OR \"daily\""));
/// assert_eq!(build_match_query("  ...  "), None);
/// ```
pub fn build_match_query(text: &str) -> Option<String> {
    let mut seen = HashSet::new();
    let terms: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .filter(|w| seen.insert(w.clone()))
        .take(MAX_QUERY_TERMS)
        .map(|w| format!("\"{}\"", w.replace('"', "\"\"")))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Async corpus search backed by its own SQLite connection
///
/// Open it on the same database file as the writer store. With WAL enabled,
/// searches read the last committed state and never wait on the writer's
/// transaction lock.
#[derive(Clone)]
pub struct FtsSearch {
    store: Arc<Mutex<SqliteStore>>,
}

impl FtsSearch {
    /// Open a search connection on a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self::from_store(SqliteStore::new(path)?))
    }

    /// Wrap an existing store
    pub fn from_store(store: SqliteStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

#[async_trait]
impl CorpusSearch for FtsSearch {
    type Error = StoreError;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ScoredClaim>, Self::Error> {
        let store = Arc::clone(&self.store);
        let query = query.to_string();

        tokio::task::spawn_blocking(move || {
            let guard = store.lock().map_err(|_| StoreError::LockPoisoned)?;
            guard.search_claims(&query, limit)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}
