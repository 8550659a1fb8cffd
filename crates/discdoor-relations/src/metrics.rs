//! Metrics collection for relationship operations

use std::collections::HashMap;
use std::fmt;

/// A mutating relationship operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// block_user
    Block,
    /// unblock_user
    Unblock,
    /// send_friend_request
    SendRequest,
    /// accept_friend_request
    AcceptRequest,
    /// deny_friend_request
    DenyRequest,
    /// retract_friend_request
    RetractRequest,
    /// remove_friend
    RemoveFriend,
}

impl Operation {
    /// Get the operation name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Block => "block",
            Operation::Unblock => "unblock",
            Operation::SendRequest => "send_request",
            Operation::AcceptRequest => "accept_request",
            Operation::DenyRequest => "deny_request",
            Operation::RetractRequest => "retract_request",
            Operation::RemoveFriend => "remove_friend",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for mutating operations
///
/// Tracks transitions applied, fails-soft no-ops and rejections per operation.
#[derive(Debug, Clone, Default)]
pub struct RelationsMetrics {
    /// Operations that wrote records
    pub applied: HashMap<Operation, usize>,

    /// Operations that found nothing to do
    pub unchanged: HashMap<Operation, usize>,

    /// Operations that failed (business rule or store)
    pub rejected: HashMap<Operation, usize>,
}

impl RelationsMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied transition
    pub fn record_applied(&mut self, op: Operation) {
        *self.applied.entry(op).or_insert(0) += 1;
    }

    /// Record a fails-soft no-op
    pub fn record_unchanged(&mut self, op: Operation) {
        *self.unchanged.entry(op).or_insert(0) += 1;
    }

    /// Record a failure
    pub fn record_rejected(&mut self, op: Operation) {
        *self.rejected.entry(op).or_insert(0) += 1;
    }

    /// Total applied transitions across all operations
    pub fn total_applied(&self) -> usize {
        self.applied.values().sum()
    }

    /// Total no-ops across all operations
    pub fn total_unchanged(&self) -> usize {
        self.unchanged.values().sum()
    }

    /// Total failures across all operations
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        self.applied.clear();
        self.unchanged.clear();
        self.rejected.clear();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Relationship Metrics Summary".to_string(),
            "============================".to_string(),
        ];

        for (label, counts, total) in [
            ("Applied", &self.applied, self.total_applied()),
            ("Unchanged", &self.unchanged, self.total_unchanged()),
            ("Rejected", &self.rejected, self.total_rejected()),
        ] {
            if counts.is_empty() {
                continue;
            }
            lines.push(format!("{}:", label));
            let mut entries: Vec<_> = counts.iter().collect();
            entries.sort();
            for (op, count) in entries {
                lines.push(format!("  {}: {}", op, count));
            }
            lines.push(format!("  Total: {}", total));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = RelationsMetrics::new();
        assert_eq!(metrics.total_applied(), 0);
        assert_eq!(metrics.total_unchanged(), 0);
        assert_eq!(metrics.total_rejected(), 0);
    }

    #[test]
    fn test_record_and_reset() {
        let mut metrics = RelationsMetrics::new();
        metrics.record_applied(Operation::Block);
        metrics.record_applied(Operation::Block);
        metrics.record_unchanged(Operation::Unblock);
        metrics.record_rejected(Operation::SendRequest);

        assert_eq!(metrics.applied[&Operation::Block], 2);
        assert_eq!(metrics.total_applied(), 2);
        assert_eq!(metrics.total_unchanged(), 1);
        assert_eq!(metrics.total_rejected(), 1);

        metrics.reset();
        assert_eq!(metrics.total_applied(), 0);
        assert!(metrics.rejected.is_empty());
    }

    #[test]
    fn test_summary() {
        let mut metrics = RelationsMetrics::new();
        metrics.record_applied(Operation::SendRequest);
        metrics.record_rejected(Operation::RetractRequest);

        let summary = metrics.summary();
        assert!(summary.contains("Applied:"));
        assert!(summary.contains("send_request: 1"));
        assert!(summary.contains("retract_request: 1"));
        assert!(!summary.contains("Unchanged:"));
    }
}
