//! Relationship module - directed edges between two users

use std::fmt;
use std::str::FromStr;

/// Type of a directed relationship record
///
/// The stored integer codes are part of the persisted format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipType {
    /// Mutual friendship (mirrored on both sides)
    Friend,

    /// The owner has blocked the target (never mirrored)
    Block,

    /// The target has sent the owner a friend request
    Incoming,

    /// The owner has sent the target a friend request
    Outgoing,
}

impl RelationshipType {
    /// All stored types, in code order
    pub const ALL: [RelationshipType; 4] = [
        RelationshipType::Friend,
        RelationshipType::Block,
        RelationshipType::Incoming,
        RelationshipType::Outgoing,
    ];

    /// Persisted integer code
    pub fn code(&self) -> i64 {
        match self {
            RelationshipType::Friend => 1,
            RelationshipType::Block => 2,
            RelationshipType::Incoming => 3,
            RelationshipType::Outgoing => 4,
        }
    }

    /// Decode a persisted integer code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(RelationshipType::Friend),
            2 => Some(RelationshipType::Block),
            3 => Some(RelationshipType::Incoming),
            4 => Some(RelationshipType::Outgoing),
            _ => None,
        }
    }

    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Friend => "friend",
            RelationshipType::Block => "block",
            RelationshipType::Incoming => "incoming",
            RelationshipType::Outgoing => "outgoing",
        }
    }

    /// The type the other side holds when the pair is consistent
    ///
    /// Block has no mirror.
    pub fn mirror(&self) -> Option<Self> {
        match self {
            RelationshipType::Friend => Some(RelationshipType::Friend),
            RelationshipType::Incoming => Some(RelationshipType::Outgoing),
            RelationshipType::Outgoing => Some(RelationshipType::Incoming),
            RelationshipType::Block => None,
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = ParseRelationshipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "friend" => Ok(RelationshipType::Friend),
            "block" => Ok(RelationshipType::Block),
            "incoming" => Ok(RelationshipType::Incoming),
            "outgoing" => Ok(RelationshipType::Outgoing),
            _ => Err(ParseRelationshipError(s.to_string())),
        }
    }
}

/// Error returned when a relationship type or filter name is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRelationshipError(pub String);

impl fmt::Display for ParseRelationshipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown relationship type: {:?}", self.0)
    }
}

impl std::error::Error for ParseRelationshipError {}

/// Read filter over the records owned by one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelationshipFilter {
    /// Every record owned by the user
    #[default]
    All,
    /// Friend records only
    Friend,
    /// Block records only
    Block,
    /// Incoming requests only
    Incoming,
    /// Outgoing requests only
    Outgoing,
    /// Derived view: incoming requests followed by outgoing requests
    Pending,
}

impl RelationshipFilter {
    /// Stored types this filter selects, in the order results are returned
    ///
    /// `None` means no type restriction.
    pub fn stored_types(&self) -> Option<&'static [RelationshipType]> {
        match self {
            RelationshipFilter::All => None,
            RelationshipFilter::Friend => Some(&[RelationshipType::Friend]),
            RelationshipFilter::Block => Some(&[RelationshipType::Block]),
            RelationshipFilter::Incoming => Some(&[RelationshipType::Incoming]),
            RelationshipFilter::Outgoing => Some(&[RelationshipType::Outgoing]),
            RelationshipFilter::Pending => {
                Some(&[RelationshipType::Incoming, RelationshipType::Outgoing])
            }
        }
    }

    /// Get the filter name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipFilter::All => "all",
            RelationshipFilter::Friend => "friend",
            RelationshipFilter::Block => "block",
            RelationshipFilter::Incoming => "incoming",
            RelationshipFilter::Outgoing => "outgoing",
            RelationshipFilter::Pending => "pending",
        }
    }
}

impl From<RelationshipType> for RelationshipFilter {
    fn from(relationship_type: RelationshipType) -> Self {
        match relationship_type {
            RelationshipType::Friend => RelationshipFilter::Friend,
            RelationshipType::Block => RelationshipFilter::Block,
            RelationshipType::Incoming => RelationshipFilter::Incoming,
            RelationshipType::Outgoing => RelationshipFilter::Outgoing,
        }
    }
}

impl fmt::Display for RelationshipFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipFilter {
    type Err = ParseRelationshipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(RelationshipFilter::All),
            "pending" => Ok(RelationshipFilter::Pending),
            other => other
                .parse::<RelationshipType>()
                .map(Into::into)
                .map_err(|_| ParseRelationshipError(s.to_string())),
        }
    }
}

/// One directed relationship record, keyed by (owner, target)
///
/// A logical relationship between two users is made of up to two of these:
/// (A,B) and (B,A).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRecord {
    /// The user this record belongs to (partition key)
    pub owner: String,

    /// The other user
    pub target: String,

    /// Type of relationship
    pub relationship_type: RelationshipType,

    /// When this record was last mutated (ms since Unix epoch)
    pub updated_at: u64,
}

impl RelationshipRecord {
    /// Create a new record
    pub fn new(
        owner: impl Into<String>,
        target: impl Into<String>,
        relationship_type: RelationshipType,
        updated_at: u64,
    ) -> Self {
        Self {
            owner: owner.into(),
            target: target.into(),
            relationship_type,
            updated_at,
        }
    }

    /// The ordered pair identifying this record
    pub fn key(&self) -> (&str, &str) {
        (&self.owner, &self.target)
    }
}
