//! Discdoor Storage Layer
//!
//! Implements the RelationshipStore trait on SQLite.
//!
//! # Architecture
//!
//! - One row per ordered pair `(owner_id, target_id)`; the pair is the primary key
//! - Secondary index on `owner_id` for per-user listings
//! - Multi-record writes run inside one SQLite transaction
//!
//! # Examples
//!
//! ```no_run
//! use discdoor_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for relationship operations
//! ```

#![warn(missing_docs)]

mod config;

pub use config::StoreConfig;

use discdoor_domain::{RecordWrite, RelationshipRecord, RelationshipStore, RelationshipType};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database stayed busy or locked past the busy timeout
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                StoreError::Unavailable(e.to_string())
            }
            _ => StoreError::Database(e),
        }
    }
}

impl StoreError {
    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// SQLite-based implementation of RelationshipStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance; concurrent writers are serialised by SQLite and wait
/// up to the configured busy timeout.
pub struct SqliteStore {
    conn: Connection,
}

const SELECT_COLUMNS: &str = "SELECT owner_id, target_id, kind, updated_at FROM relationships";

impl SqliteStore {
    /// Create a new SqliteStore with the given database path and default settings
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use discdoor_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("discdoor.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let config = StoreConfig {
            path: path.as_ref().to_path_buf(),
            ..StoreConfig::default()
        };
        Self::with_config(&config)
    }

    /// Create a new SqliteStore from configuration
    pub fn with_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(&config.path)?;
        conn.busy_timeout(config.busy_timeout())?;

        let mut store = Self { conn };
        store.initialize_schema()?;
        debug!(path = %config.path.display(), "Opened relationship store");
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert a row into a record
    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<RelationshipRecord> {
        let code: i64 = row.get(2)?;
        let relationship_type = RelationshipType::from_code(code).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Integer,
                format!("Unknown relationship type code: {}", code).into(),
            )
        })?;

        Ok(RelationshipRecord {
            owner: row.get(0)?,
            target: row.get(1)?,
            relationship_type,
            updated_at: row.get::<_, i64>(3)? as u64,
        })
    }

    /// Map a row decoding failure back to InvalidData
    fn decode_error(e: rusqlite::Error) -> StoreError {
        match e {
            rusqlite::Error::FromSqlConversionFailure(_, _, inner) => {
                StoreError::InvalidData(inner.to_string())
            }
            other => other.into(),
        }
    }

    fn upsert_on(conn: &Connection, record: &RelationshipRecord) -> Result<bool, StoreError> {
        let changed = conn.execute(
            "INSERT INTO relationships (owner_id, target_id, kind, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(owner_id, target_id) DO UPDATE SET
             kind = excluded.kind, updated_at = excluded.updated_at",
            params![
                &record.owner,
                &record.target,
                record.relationship_type.code(),
                record.updated_at as i64,
            ],
        )?;
        Ok(changed == 1)
    }

    fn delete_on(conn: &Connection, owner: &str, target: &str) -> Result<bool, StoreError> {
        // A delete that matched nothing is still acknowledged
        conn.execute(
            "DELETE FROM relationships WHERE owner_id = ?1 AND target_id = ?2",
            params![owner, target],
        )?;
        Ok(true)
    }

    fn write_on(conn: &Connection, write: &RecordWrite) -> Result<bool, StoreError> {
        match write {
            RecordWrite::Upsert(record) => Self::upsert_on(conn, record),
            RecordWrite::Delete { owner, target } => Self::delete_on(conn, owner, target),
        }
    }
}

impl RelationshipStore for SqliteStore {
    type Error = StoreError;

    fn find(
        &self,
        owner: &str,
        type_filter: Option<RelationshipType>,
    ) -> Result<Vec<RelationshipRecord>, Self::Error> {
        let records = match type_filter {
            Some(relationship_type) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} WHERE owner_id = ?1 AND kind = ?2 ORDER BY rowid",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(
                    params![owner, relationship_type.code()],
                    Self::row_to_record,
                )?;
                rows.collect::<Result<Vec<_>, _>>()
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} WHERE owner_id = ?1 ORDER BY rowid",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![owner], Self::row_to_record)?;
                rows.collect::<Result<Vec<_>, _>>()
            }
        }
        .map_err(Self::decode_error)?;

        Ok(records)
    }

    fn find_one(
        &self,
        owner: &str,
        target: &str,
    ) -> Result<Option<RelationshipRecord>, Self::Error> {
        self.conn
            .query_row(
                &format!("{} WHERE owner_id = ?1 AND target_id = ?2", SELECT_COLUMNS),
                params![owner, target],
                Self::row_to_record,
            )
            .optional()
            .map_err(Self::decode_error)
    }

    fn upsert(&mut self, record: &RelationshipRecord) -> Result<bool, Self::Error> {
        Self::upsert_on(&self.conn, record)
    }

    fn delete(&mut self, owner: &str, target: &str) -> Result<bool, Self::Error> {
        Self::delete_on(&self.conn, owner, target)
    }

    fn apply(&mut self, writes: &[RecordWrite]) -> Result<bool, Self::Error> {
        let tx = self.conn.transaction()?;

        for write in writes {
            if !Self::write_on(&tx, write)? {
                let (owner, target) = write.key();
                error!(owner, target, "Write not acknowledged, rolling back");
                // Dropping the transaction rolls it back
                return Ok(false);
            }
        }

        tx.commit()?;
        Ok(true)
    }

    fn supports_atomic_writes(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_code_is_invalid_data() {
        let store = SqliteStore::new(":memory:").unwrap();
        store
            .conn
            .execute(
                "INSERT INTO relationships (owner_id, target_id, kind, updated_at)
                 VALUES ('a', 'b', 9, 0)",
                [],
            )
            .unwrap();

        let result = store.find_one("a", "b");
        assert!(matches!(result, Err(StoreError::InvalidData(_))));

        let result = store.find("a", None);
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_apply_rolls_back_on_failed_second_write() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER refuse_bob BEFORE INSERT ON relationships
                 WHEN NEW.owner_id = 'bob'
                 BEGIN SELECT RAISE(ABORT, 'writes for bob are refused'); END;",
            )
            .unwrap();

        let outgoing = RelationshipRecord::new("alice", "bob", RelationshipType::Outgoing, 1);
        let incoming = RelationshipRecord::new("bob", "alice", RelationshipType::Incoming, 1);
        let writes = [RecordWrite::Upsert(outgoing), RecordWrite::Upsert(incoming)];
        let result = store.apply(&writes);
        assert!(matches!(result, Err(StoreError::Database(_))));

        // The first half was written inside the transaction and rolled back with it
        assert!(store.find_one("alice", "bob").unwrap().is_none());
        assert!(store.find_one("bob", "alice").unwrap().is_none());

        // The connection is usable again after the rollback
        let record = RelationshipRecord::new("alice", "carol", RelationshipType::Block, 2);
        assert!(store.apply(&[RecordWrite::Upsert(record)]).unwrap());
    }

    #[test]
    fn test_busy_error_is_transient() {
        let err: StoreError = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        )
        .into();
        assert!(err.is_transient());

        let err: StoreError = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
            None,
        )
        .into();
        assert!(matches!(err, StoreError::Database(_)));
        assert!(!err.is_transient());

        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(!err.is_transient());
    }
}
