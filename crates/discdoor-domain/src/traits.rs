//! Trait definitions for external interactions
//!
//! These traits define the boundary between the relationship rules and the
//! persistent store. Implementations live in other crates.

use crate::{RelationshipRecord, RelationshipType};

/// A single write against one ordered pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordWrite {
    /// Insert the record, or update it in place if the pair exists
    Upsert(RelationshipRecord),

    /// Delete the record for (owner, target)
    Delete {
        /// Owner of the record
        owner: String,
        /// Target of the record
        target: String,
    },
}

impl RecordWrite {
    /// Build a delete for the given ordered pair
    pub fn delete(owner: impl Into<String>, target: impl Into<String>) -> Self {
        RecordWrite::Delete {
            owner: owner.into(),
            target: target.into(),
        }
    }

    /// The ordered pair this write touches
    pub fn key(&self) -> (&str, &str) {
        match self {
            RecordWrite::Upsert(record) => record.key(),
            RecordWrite::Delete { owner, target } => (owner, target),
        }
    }
}

/// Trait for storing and retrieving relationship records
///
/// Every operation is keyed by the ordered pair (owner, target). Writes
/// return the store's acknowledgement; callers must treat `false` as a
/// failed write.
///
/// Implemented by the infrastructure layer (discdoor-store)
pub trait RelationshipStore {
    /// Error type for store operations
    type Error;

    /// Records owned by `owner`, optionally restricted to one type
    fn find(
        &self,
        owner: &str,
        type_filter: Option<RelationshipType>,
    ) -> Result<Vec<RelationshipRecord>, Self::Error>;

    /// The record for (owner, target), if any
    fn find_one(&self, owner: &str, target: &str)
        -> Result<Option<RelationshipRecord>, Self::Error>;

    /// Insert the record, or update the existing record for its pair in place
    fn upsert(&mut self, record: &RelationshipRecord) -> Result<bool, Self::Error>;

    /// Delete the record for (owner, target)
    fn delete(&mut self, owner: &str, target: &str) -> Result<bool, Self::Error>;

    /// Apply several writes as one unit
    ///
    /// The default applies them in order and stops at the first negative
    /// acknowledgement, so a reader may observe the writes one at a time.
    /// Stores that can do better override this together with
    /// [`supports_atomic_writes`](Self::supports_atomic_writes).
    fn apply(&mut self, writes: &[RecordWrite]) -> Result<bool, Self::Error> {
        for write in writes {
            let acked = match write {
                RecordWrite::Upsert(record) => self.upsert(record)?,
                RecordWrite::Delete { owner, target } => self.delete(owner, target)?,
            };
            if !acked {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether [`apply`](Self::apply) is all-or-nothing
    fn supports_atomic_writes(&self) -> bool {
        false
    }
}
