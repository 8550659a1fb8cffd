//! Discdoor Relations
//!
//! The relationship state machine: which transitions between friend, block
//! and pending states are legal, and how the two stored records of one
//! logical relationship are kept consistent.
//!
//! # Overview
//!
//! A logical relationship between users A and B is stored as up to two
//! records, (A,B) and (B,A):
//!
//! | (A,B) | (B,A) | Meaning |
//! |-------|-------|---------|
//! | absent | absent | no relationship |
//! | Outgoing | Incoming | A has requested B |
//! | Incoming | Outgoing | B has requested A |
//! | Friend | Friend | mutual friendship |
//! | Block | anything or absent | A has blocked B |
//!
//! # Usage
//!
//! ```
//! use discdoor_domain::{RelationshipFilter, RelationshipType};
//! use discdoor_relations::{RelationshipManager, RelationsConfig, Transition};
//! use discdoor_store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new(":memory:")?;
//! let mut manager = RelationshipManager::new(store, RelationsConfig::default());
//!
//! assert_eq!(manager.send_friend_request("alice", "bob")?, Transition::Applied);
//!
//! let pending = manager.get_relations("bob", RelationshipFilter::Pending)?;
//! assert_eq!(pending[0].relationship_type, RelationshipType::Incoming);
//! # Ok(())
//! # }
//! ```
//!
//! # Pair writes
//!
//! With `pair_writes = "atomic"` (the default) both records are written in
//! one store transaction. With `pair_writes = "sequential"` they are written
//! one after the other and a concurrent reader may briefly see only the first.
//!
//! ```toml
//! [relations]
//! pair_writes = "atomic"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod manager;
mod metrics;

pub use config::{PairWriteMode, RelationsConfig};
pub use error::{RelationError, RelationErrorKind};
pub use manager::{RelationshipManager, Transition};
pub use metrics::{Operation, RelationsMetrics};
