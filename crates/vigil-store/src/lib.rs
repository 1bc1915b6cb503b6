//! Vigil Storage Layer
//!
//! Implements the ClaimStore trait on SQLite, with an FTS5 index over claim
//! text and reasoning for corpus search.
//!
//! # Architecture
//!
//! - SQLite for observations, claims, support links and counters
//! - FTS5 external-content table kept in sync by triggers
//! - Write transactions driven explicitly by the reconciler
//!
//! # Examples
//!
//! ```no_run
//! use vigil_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for claim operations
//! ```

#![warn(missing_docs)]

mod search;

pub use search::{build_match_query, FtsSearch};

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use vigil_domain::traits::ClaimStore;
use vigil_domain::{Claim, ClaimId, Observation, ObservationId, RevisionGroup, ScoredClaim};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Transaction misuse (nested begin, commit without begin)
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Shared connection lock was poisoned
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// Blocking search task failed
    #[error("Search task failed: {0}")]
    Task(String),
}

/// Columns selected for every claim read, in `claim_from_row` order
const CLAIM_COLUMNS: &str = "c.id, c.text, c.reasoning, c.confidence, c.decay, \
                             c.revision_group, c.version, c.created_at, c.updated_at";

const OBSERVATION_COLUMNS: &str = "o.id, o.source, o.content, o.content_type, o.created_at";

/// SQLite-based implementation of ClaimStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each owner should hold its own
/// SqliteStore; share one behind a mutex when several tasks need it.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("Opened store at {} (journal_mode={})", path.as_ref().display(), mode);

        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// True while a transaction opened by `begin` is pending
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Get an observation by ID
    pub fn get_observation(&self, id: ObservationId) -> Result<Option<Observation>, StoreError> {
        let sql = format!("SELECT {OBSERVATION_COLUMNS} FROM observations o WHERE o.id = ?1");
        let obs = self
            .conn
            .query_row(&sql, params![id.to_bytes().as_slice()], observation_from_row)
            .optional()?;
        Ok(obs)
    }

    /// Claims supported by an observation
    pub fn claims_for_observation(&self, id: ObservationId) -> Result<Vec<Claim>, StoreError> {
        let sql = format!(
            "SELECT {CLAIM_COLUMNS} FROM claims c
             JOIN observation_claims l ON l.claim_id = c.id
             WHERE l.observation_id = ?1
             ORDER BY c.seq"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let claims = stmt
            .query_map(params![id.to_bytes().as_slice()], claim_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(claims)
    }

    /// Number of stored observations
    pub fn count_observations(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM observations", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Current value of a named counter (0 when never advanced)
    pub fn counter(&self, name: &str) -> Result<u64, StoreError> {
        let value: Option<i64> = self
            .conn
            .query_row("SELECT value FROM counters WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value.unwrap_or(0) as u64)
    }

    /// Full-text search over claim text and reasoning
    ///
    /// Each word of `query` is matched independently; results are ranked by
    /// BM25 and scored so that higher is better. A query with no searchable
    /// words returns nothing.
    pub fn search_claims(&self, query: &str, limit: usize) -> Result<Vec<ScoredClaim>, StoreError> {
        let Some(fts_query) = build_match_query(query) else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {CLAIM_COLUMNS}, bm25(claims_fts) AS rank
             FROM claims_fts
             JOIN claims c ON c.seq = claims_fts.rowid
             WHERE claims_fts MATCH ?1
             ORDER BY rank, c.seq
             LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let hits = stmt
            .query_map(params![fts_query, limit as i64], |row| {
                let claim = claim_from_row(row)?;
                let rank: f64 = row.get(9)?;
                Ok(ScoredClaim { claim, score: -rank })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(hits)
    }
}

impl ClaimStore for SqliteStore {
    type Error = StoreError;

    fn begin(&mut self) -> Result<(), Self::Error> {
        if self.in_transaction() {
            return Err(StoreError::Transaction("transaction already open".to_string()));
        }
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        if !self.in_transaction() {
            return Err(StoreError::Transaction("no open transaction".to_string()));
        }
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), Self::Error> {
        if self.in_transaction() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    fn insert_observation(&mut self, observation: &Observation) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO observations (id, source, content, content_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                observation.id.to_bytes().as_slice(),
                &observation.source,
                &observation.content,
                &observation.content_type,
                observation.created_at as i64,
            ],
        )?;
        Ok(())
    }

    fn insert_claim(&mut self, claim: &Claim) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO claims (id, text, reasoning, confidence, decay, revision_group,
                                 version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                claim.id.to_bytes().as_slice(),
                &claim.text,
                &claim.reasoning,
                claim.confidence,
                claim.decay,
                claim.revision_group.to_bytes().as_slice(),
                claim.version,
                claim.created_at as i64,
                claim.updated_at as i64,
            ],
        )?;
        Ok(())
    }

    fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>, Self::Error> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims c WHERE c.id = ?1");
        let claim = self
            .conn
            .query_row(&sql, params![id.to_bytes().as_slice()], claim_from_row)
            .optional()?;
        Ok(claim)
    }

    fn delete_claim(&mut self, id: ClaimId) -> Result<bool, Self::Error> {
        let n = self
            .conn
            .execute("DELETE FROM claims WHERE id = ?1", params![id.to_bytes().as_slice()])?;
        Ok(n > 0)
    }

    fn link_observation(
        &mut self,
        observation: ObservationId,
        claim: ClaimId,
    ) -> Result<bool, Self::Error> {
        let n = self.conn.execute(
            "INSERT OR IGNORE INTO observation_claims (observation_id, claim_id) VALUES (?1, ?2)",
            params![observation.to_bytes().as_slice(), claim.to_bytes().as_slice()],
        )?;
        Ok(n > 0)
    }

    fn touch_claim(&mut self, id: ClaimId, now: u64) -> Result<(), Self::Error> {
        self.conn.execute(
            "UPDATE claims SET updated_at = ?2 WHERE id = ?1",
            params![id.to_bytes().as_slice(), now as i64],
        )?;
        Ok(())
    }

    fn observations_for_claim(&self, id: ClaimId) -> Result<Vec<Observation>, Self::Error> {
        let sql = format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations o
             JOIN observation_claims l ON l.observation_id = o.id
             WHERE l.claim_id = ?1
             ORDER BY o.seq"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let observations = stmt
            .query_map(params![id.to_bytes().as_slice()], observation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(observations)
    }

    fn count_claims(&self) -> Result<usize, Self::Error> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM claims", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn count_links(&self) -> Result<usize, Self::Error> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM observation_claims", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn advance_counter(&mut self, name: &str, by: u64) -> Result<u64, Self::Error> {
        self.conn.execute(
            "INSERT INTO counters (name, value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET value = value + excluded.value",
            params![name, by as i64],
        )?;
        self.counter(name)
    }

    fn reset_counter(&mut self, name: &str) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO counters (name, value) VALUES (?1, 0)
             ON CONFLICT(name) DO UPDATE SET value = 0",
            params![name],
        )?;
        Ok(())
    }

    fn recent_claims(&self, limit: usize) -> Result<Vec<Claim>, Self::Error> {
        let sql = format!(
            "SELECT {CLAIM_COLUMNS} FROM claims c ORDER BY c.updated_at DESC, c.seq DESC LIMIT ?1"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let claims = stmt
            .query_map(params![limit as i64], claim_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(claims)
    }
}

fn invalid_blob(idx: usize, e: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Blob,
        Box::new(StoreError::InvalidData(e)),
    )
}

fn claim_from_row(row: &Row<'_>) -> rusqlite::Result<Claim> {
    let id_bytes: Vec<u8> = row.get(0)?;
    let id = ClaimId::from_bytes(&id_bytes).map_err(|e| invalid_blob(0, e))?;
    let group_bytes: Vec<u8> = row.get(5)?;
    let revision_group = RevisionGroup::from_bytes(&group_bytes).map_err(|e| invalid_blob(5, e))?;

    Ok(Claim {
        id,
        text: row.get(1)?,
        reasoning: row.get(2)?,
        confidence: row.get(3)?,
        decay: row.get(4)?,
        revision_group,
        version: row.get(6)?,
        created_at: row.get::<_, i64>(7)? as u64,
        updated_at: row.get::<_, i64>(8)? as u64,
    })
}

fn observation_from_row(row: &Row<'_>) -> rusqlite::Result<Observation> {
    let id_bytes: Vec<u8> = row.get(0)?;
    let id = ObservationId::from_bytes(&id_bytes).map_err(|e| invalid_blob(0, e))?;

    Ok(Observation {
        id,
        source: row.get(1)?,
        content: row.get(2)?,
        content_type: row.get(3)?,
        created_at: row.get::<_, i64>(4)? as u64,
    })
}
