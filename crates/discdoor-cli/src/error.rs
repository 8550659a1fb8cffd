//! Error types for the CLI application.

use discdoor_relations::{RelationError, RelationErrorKind};
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Relationship rule or store failure
    #[error("{0}")]
    Relation(#[from] RelationError),

    /// Store could not be opened
    #[error("Store error: {0}")]
    Store(#[from] discdoor_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// Business-rule rejections use 2-7, store failures 10-11, anything else 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Relation(e) => match e.kind() {
                RelationErrorKind::SelfReference => 2,
                RelationErrorKind::AlreadyRequested => 3,
                RelationErrorKind::AlreadyFriends => 4,
                RelationErrorKind::SelfBlockedTarget => 5,
                RelationErrorKind::BlockedByTarget => 6,
                RelationErrorKind::NoOutgoingRequest => 7,
                RelationErrorKind::StoreUnavailable => 10,
                RelationErrorKind::StoreWriteFailed => 11,
            },
            CliError::Store(e) if e.is_transient() => 10,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::from(RelationError::SelfReference).exit_code(), 2);
        assert_eq!(CliError::from(RelationError::BlockedByTarget).exit_code(), 6);
        assert_eq!(
            CliError::from(RelationError::StoreUnavailable("busy".into())).exit_code(),
            10
        );
        assert_eq!(CliError::Config("bad".into()).exit_code(), 1);
    }

    #[test]
    fn test_relation_message_passes_through() {
        let err = CliError::from(RelationError::AlreadyFriends);
        assert_eq!(err.to_string(), "This user is already your friend.");
    }
}
