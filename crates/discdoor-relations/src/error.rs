//! Error types for relationship operations

use thiserror::Error;

/// Classification of a failed relationship operation
///
/// Business-rule kinds are final; only [`StoreUnavailable`](Self::StoreUnavailable)
/// may succeed on retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationErrorKind {
    /// The acting user and the target are the same user
    SelfReference,
    /// A friend request to the target is already pending
    AlreadyRequested,
    /// The users are already friends
    AlreadyFriends,
    /// The acting user has blocked the target
    SelfBlockedTarget,
    /// The target has blocked the acting user
    BlockedByTarget,
    /// There is no outgoing request to retract
    NoOutgoingRequest,
    /// The store could not be reached or failed a read
    StoreUnavailable,
    /// The store did not acknowledge a write
    StoreWriteFailed,
}

impl RelationErrorKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationErrorKind::SelfReference => "self_reference",
            RelationErrorKind::AlreadyRequested => "already_requested",
            RelationErrorKind::AlreadyFriends => "already_friends",
            RelationErrorKind::SelfBlockedTarget => "self_blocked_target",
            RelationErrorKind::BlockedByTarget => "blocked_by_target",
            RelationErrorKind::NoOutgoingRequest => "no_outgoing_request",
            RelationErrorKind::StoreUnavailable => "store_unavailable",
            RelationErrorKind::StoreWriteFailed => "store_write_failed",
        }
    }

    /// Whether this kind comes from the store rather than a business rule
    pub fn is_store_fault(&self) -> bool {
        matches!(
            self,
            RelationErrorKind::StoreUnavailable | RelationErrorKind::StoreWriteFailed
        )
    }
}

/// Errors that can occur during relationship operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelationError {
    /// uid == target
    #[error("You cannot do this to yourself.")]
    SelfReference,

    /// (uid, target) is already Outgoing
    #[error("You have already sent this user a friend request.")]
    AlreadyRequested,

    /// (uid, target) is already Friend
    #[error("This user is already your friend.")]
    AlreadyFriends,

    /// (uid, target) is Block
    #[error("You have blocked this user - please unblock them before sending a request.")]
    SelfBlockedTarget,

    /// (target, uid) is Block
    #[error("You have been blocked by this user.")]
    BlockedByTarget,

    /// retract without an Outgoing record
    #[error("You have no pending friend request to this user.")]
    NoOutgoingRequest,

    /// Store read or connection failure
    #[error("Relationship store unavailable: {0}")]
    StoreUnavailable(String),

    /// Store refused to acknowledge a write
    #[error("Relationship store did not acknowledge write to ({owner}, {target})")]
    StoreWriteFailed {
        /// Owner of the record that failed to write
        owner: String,
        /// Target of the record that failed to write
        target: String,
    },
}

impl RelationError {
    /// The taxonomy kind of this error
    pub fn kind(&self) -> RelationErrorKind {
        match self {
            RelationError::SelfReference => RelationErrorKind::SelfReference,
            RelationError::AlreadyRequested => RelationErrorKind::AlreadyRequested,
            RelationError::AlreadyFriends => RelationErrorKind::AlreadyFriends,
            RelationError::SelfBlockedTarget => RelationErrorKind::SelfBlockedTarget,
            RelationError::BlockedByTarget => RelationErrorKind::BlockedByTarget,
            RelationError::NoOutgoingRequest => RelationErrorKind::NoOutgoingRequest,
            RelationError::StoreUnavailable(_) => RelationErrorKind::StoreUnavailable,
            RelationError::StoreWriteFailed { .. } => RelationErrorKind::StoreWriteFailed,
        }
    }

    /// Whether the caller may retry the same operation
    pub fn is_retryable(&self) -> bool {
        self.kind() == RelationErrorKind::StoreUnavailable
    }

    /// Any store fault, transient or not, is reported as unavailable
    pub(crate) fn store<E: std::fmt::Display>(e: E) -> Self {
        RelationError::StoreUnavailable(e.to_string())
    }
}
