//! Discdoor Domain Layer
//!
//! This crate contains the domain model for user relationships. It has ZERO
//! external dependencies and defines the value types and the store trait that
//! the other crates depend upon.
//!
//! ## Key Concepts
//!
//! - **Relationship record**: one directed edge keyed by the ordered pair (owner, target)
//! - **Logical relationship**: the combined state of the (A,B) and (B,A) records
//! - **Filters**: read views over a user's records, including the derived `Pending` view
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Infrastructure implementations live in other crates (`discdoor-store`)
//! - Business rules live in `discdoor-relations`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod relationship;
pub mod traits;

// Re-exports for convenience
pub use relationship::{
    ParseRelationshipError, RelationshipFilter, RelationshipRecord, RelationshipType,
};
pub use traits::{RecordWrite, RelationshipStore};
