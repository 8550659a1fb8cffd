//! Configuration for relationship operations

use serde::{Deserialize, Serialize};

/// How the two records of a logical relationship are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairWriteMode {
    /// Both writes go through one atomic store call
    #[default]
    Atomic,

    /// Each write is issued and acknowledged in turn
    ///
    /// A concurrent reader may see the first write without the second.
    Sequential,
}

/// Configuration for the [`RelationshipManager`](crate::RelationshipManager)
///
/// # Examples
///
/// ```
/// use discdoor_relations::{PairWriteMode, RelationsConfig};
///
/// let config = RelationsConfig::default();
/// assert_eq!(config.pair_writes, PairWriteMode::Atomic);
///
/// let config = RelationsConfig::sequential();
/// assert_eq!(config.pair_writes, PairWriteMode::Sequential);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationsConfig {
    /// Write mode for dual-record transitions
    /// Default: atomic
    #[serde(default)]
    pub pair_writes: PairWriteMode,
}

impl RelationsConfig {
    /// Configuration that writes the two records one after the other
    pub fn sequential() -> Self {
        Self {
            pair_writes: PairWriteMode::Sequential,
        }
    }
}
