//! Relationship state machine
//!
//! Every mutating operation reads at most two records, decides the transition
//! from the current state, and writes one or two records back. The two halves
//! of a logical relationship are written as one unit when the store supports
//! it and [`PairWriteMode::Atomic`](crate::PairWriteMode::Atomic) is configured.

use crate::{Operation, PairWriteMode, RelationError, RelationsConfig, RelationsMetrics};
use discdoor_domain::{
    RecordWrite, RelationshipFilter, RelationshipRecord, RelationshipStore, RelationshipType,
};
use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

/// Current timestamp in milliseconds since Unix epoch
fn current_timestamp() -> u64 {
    millis_since_epoch(SystemTime::now())
}

fn millis_since_epoch(now: SystemTime) -> u64 {
    match now.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_millis() as u64,
        Err(e) => {
            warn!("System clock is before the Unix epoch, stamping 0: {}", e);
            0
        }
    }
}

fn upsert(owner: &str, target: &str, relationship_type: RelationshipType, at: u64) -> RecordWrite {
    RecordWrite::Upsert(RelationshipRecord::new(owner, target, relationship_type, at))
}

/// Outcome of a successful mutating operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Records were written
    Applied,
    /// Nothing to do; the operation still succeeded
    Unchanged,
}

impl Transition {
    /// Whether records were written
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Relationship state machine over a [`RelationshipStore`]
///
/// Constructed once at process start and owned by the dispatcher; every
/// operation goes through it. `uid` is always the acting user and `target`
/// the other user.
///
/// # Examples
///
/// ```
/// use discdoor_domain::RelationshipType;
/// use discdoor_relations::{RelationshipManager, RelationsConfig};
/// use discdoor_store::SqliteStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::new(":memory:")?;
/// let mut manager = RelationshipManager::new(store, RelationsConfig::default());
///
/// manager.send_friend_request("alice", "bob")?;
/// manager.accept_friend_request("bob", "alice")?;
///
/// let rel = manager.get_relation("alice", "bob")?.unwrap();
/// assert_eq!(rel.relationship_type, RelationshipType::Friend);
/// # Ok(())
/// # }
/// ```
pub struct RelationshipManager<S> {
    store: S,
    config: RelationsConfig,
    metrics: RelationsMetrics,
    atomic_pairs: bool,
}

impl<S> RelationshipManager<S>
where
    S: RelationshipStore,
    S::Error: Display,
{
    /// Create a new manager over the given store
    pub fn new(store: S, config: RelationsConfig) -> Self {
        let atomic_pairs = match config.pair_writes {
            PairWriteMode::Atomic if store.supports_atomic_writes() => true,
            PairWriteMode::Atomic => {
                warn!("Store does not support atomic writes, using sequential pair writes");
                false
            }
            PairWriteMode::Sequential => false,
        };

        Self {
            store,
            config,
            metrics: RelationsMetrics::new(),
            atomic_pairs,
        }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &RelationsConfig {
        &self.config
    }

    /// Whether the two halves of a relationship are written atomically
    pub fn atomic_pairs(&self) -> bool {
        self.atomic_pairs
    }

    /// Get a reference to the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &RelationsMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// The record (uid, target), if any
    pub fn get_relation(
        &self,
        uid: &str,
        target: &str,
    ) -> Result<Option<RelationshipRecord>, RelationError> {
        debug!(uid, target, "Looking up relation");
        self.store.find_one(uid, target).map_err(|e| {
            error!(uid, target, "Relation lookup failed: {}", e);
            RelationError::store(e)
        })
    }

    /// Records owned by `uid` that pass `filter`
    ///
    /// `Pending` returns incoming records followed by outgoing records.
    pub fn get_relations(
        &self,
        uid: &str,
        filter: RelationshipFilter,
    ) -> Result<Vec<RelationshipRecord>, RelationError> {
        debug!(uid, filter = %filter, "Listing relations");

        let lookup_failed = |e: S::Error| {
            error!(uid, filter = %filter, "Relation listing failed: {}", e);
            RelationError::store(e)
        };

        match filter.stored_types() {
            None => self.store.find(uid, None).map_err(&lookup_failed),
            Some(types) => {
                let mut records = Vec::new();
                for relationship_type in types {
                    let found = self
                        .store
                        .find(uid, Some(*relationship_type))
                        .map_err(&lookup_failed)?;
                    records.extend(found);
                }
                Ok(records)
            }
        }
    }

    /// Every record owned by `uid`
    pub fn get_all(&self, uid: &str) -> Result<Vec<RelationshipRecord>, RelationError> {
        self.get_relations(uid, RelationshipFilter::All)
    }

    /// Set (uid, target) to Block regardless of prior state
    ///
    /// (target, uid) is left untouched. Blocking twice only re-stamps the record.
    pub fn block_user(&mut self, uid: &str, target: &str) -> Result<Transition, RelationError> {
        let result = self.block(uid, target);
        self.track(Operation::Block, uid, target, result)
    }

    /// Delete (uid, target) if and only if it is a Block
    pub fn unblock_user(&mut self, uid: &str, target: &str) -> Result<Transition, RelationError> {
        let result = self.unblock(uid, target);
        self.track(Operation::Unblock, uid, target, result)
    }

    /// Send a friend request from `uid` to `target`
    ///
    /// On success (uid, target) is Outgoing and (target, uid) is Incoming.
    /// A request crossing an incoming one from `target` succeeds without writing.
    pub fn send_friend_request(
        &mut self,
        uid: &str,
        target: &str,
    ) -> Result<Transition, RelationError> {
        let result = self.send_request(uid, target);
        self.track(Operation::SendRequest, uid, target, result)
    }

    /// Accept the relation `uid` holds toward `target`, making both sides Friend
    ///
    /// Any existing (uid, target) record is accepted, whatever its type.
    /// With no record this is a no-op.
    pub fn accept_friend_request(
        &mut self,
        uid: &str,
        target: &str,
    ) -> Result<Transition, RelationError> {
        let result = self.accept_request(uid, target);
        self.track(Operation::AcceptRequest, uid, target, result)
    }

    /// Drop the incoming request `uid` holds from `target`
    ///
    /// Only the denier's own Incoming record is removed; the requester keeps
    /// its Outgoing record and is not told. Any other state is left as is.
    pub fn deny_friend_request(
        &mut self,
        uid: &str,
        target: &str,
    ) -> Result<Transition, RelationError> {
        let result = self.deny_request(uid, target);
        self.track(Operation::DenyRequest, uid, target, result)
    }

    /// Withdraw an outgoing request, deleting both records
    pub fn retract_friend_request(
        &mut self,
        uid: &str,
        target: &str,
    ) -> Result<Transition, RelationError> {
        let result = self.retract_request(uid, target);
        self.track(Operation::RetractRequest, uid, target, result)
    }

    /// Delete (uid, target) and (target, uid)
    ///
    /// No-op when `uid` holds no record toward `target`.
    pub fn remove_friend(&mut self, uid: &str, target: &str) -> Result<Transition, RelationError> {
        let result = self.remove(uid, target);
        self.track(Operation::RemoveFriend, uid, target, result)
    }

    fn block(&mut self, uid: &str, target: &str) -> Result<Transition, RelationError> {
        if uid == target {
            return Err(RelationError::SelfReference);
        }

        self.write_one(upsert(uid, target, RelationshipType::Block, current_timestamp()))?;
        Ok(Transition::Applied)
    }

    fn unblock(&mut self, uid: &str, target: &str) -> Result<Transition, RelationError> {
        match self.relation_type(uid, target)? {
            Some(RelationshipType::Block) => {
                self.write_one(RecordWrite::delete(uid, target))?;
                Ok(Transition::Applied)
            }
            other => {
                debug!(uid, target, current = ?other, "Nothing to unblock");
                Ok(Transition::Unchanged)
            }
        }
    }

    fn send_request(&mut self, uid: &str, target: &str) -> Result<Transition, RelationError> {
        if uid == target {
            return Err(RelationError::SelfReference);
        }

        match self.relation_type(uid, target)? {
            Some(RelationshipType::Outgoing) => return Err(RelationError::AlreadyRequested),
            Some(RelationshipType::Block) => return Err(RelationError::SelfBlockedTarget),
            Some(RelationshipType::Friend) => return Err(RelationError::AlreadyFriends),
            Some(RelationshipType::Incoming) => {
                debug!(uid, target, "Request crosses an incoming request, nothing to write");
                return Ok(Transition::Unchanged);
            }
            None => {}
        }

        if self.relation_type(target, uid)? == Some(RelationshipType::Block) {
            return Err(RelationError::BlockedByTarget);
        }

        let now = current_timestamp();
        self.write_pair([
            upsert(uid, target, RelationshipType::Outgoing, now),
            upsert(target, uid, RelationshipType::Incoming, now),
        ])?;
        Ok(Transition::Applied)
    }

    fn accept_request(&mut self, uid: &str, target: &str) -> Result<Transition, RelationError> {
        let Some(current) = self.relation_type(uid, target)? else {
            debug!(uid, target, "No request to accept");
            return Ok(Transition::Unchanged);
        };

        if current != RelationshipType::Incoming {
            debug!(uid, target, current = %current, "Accepting a relation that is not a request");
        }

        let now = current_timestamp();
        self.write_pair([
            upsert(uid, target, RelationshipType::Friend, now),
            upsert(target, uid, RelationshipType::Friend, now),
        ])?;
        Ok(Transition::Applied)
    }

    fn deny_request(&mut self, uid: &str, target: &str) -> Result<Transition, RelationError> {
        match self.relation_type(uid, target)? {
            Some(RelationshipType::Incoming) => {
                self.write_one(RecordWrite::delete(uid, target))?;
                Ok(Transition::Applied)
            }
            other => {
                debug!(uid, target, current = ?other, "No incoming request to deny");
                Ok(Transition::Unchanged)
            }
        }
    }

    fn retract_request(&mut self, uid: &str, target: &str) -> Result<Transition, RelationError> {
        if self.relation_type(uid, target)? != Some(RelationshipType::Outgoing) {
            return Err(RelationError::NoOutgoingRequest);
        }

        self.write_pair([RecordWrite::delete(uid, target), RecordWrite::delete(target, uid)])?;
        Ok(Transition::Applied)
    }

    fn remove(&mut self, uid: &str, target: &str) -> Result<Transition, RelationError> {
        if self.relation_type(uid, target)?.is_none() {
            debug!(uid, target, "No relation to remove");
            return Ok(Transition::Unchanged);
        }

        self.write_pair([RecordWrite::delete(uid, target), RecordWrite::delete(target, uid)])?;
        Ok(Transition::Applied)
    }

    fn relation_type(
        &self,
        owner: &str,
        target: &str,
    ) -> Result<Option<RelationshipType>, RelationError> {
        Ok(self
            .get_relation(owner, target)?
            .map(|record| record.relationship_type))
    }

    /// Issue one write and check its acknowledgement
    fn write_one(&mut self, write: RecordWrite) -> Result<(), RelationError> {
        let acked = match &write {
            RecordWrite::Upsert(record) => self.store.upsert(record),
            RecordWrite::Delete { owner, target } => self.store.delete(owner, target),
        };
        let (owner, target) = write.key();

        match acked {
            Ok(true) => Ok(()),
            Ok(false) => {
                error!(owner, target, "Store did not acknowledge write");
                Err(RelationError::StoreWriteFailed {
                    owner: owner.to_string(),
                    target: target.to_string(),
                })
            }
            Err(e) => {
                error!(owner, target, "Store write failed: {}", e);
                Err(RelationError::store(e))
            }
        }
    }

    /// Write both halves of a logical relationship
    ///
    /// In sequential mode the first write is visible before the second one
    /// lands, and a failed second write leaves the first in place.
    fn write_pair(&mut self, writes: [RecordWrite; 2]) -> Result<(), RelationError> {
        if !self.atomic_pairs {
            for write in writes {
                self.write_one(write)?;
            }
            return Ok(());
        }

        let (owner, target) = writes[0].key();
        match self.store.apply(&writes) {
            Ok(true) => Ok(()),
            Ok(false) => {
                error!(owner, target, "Store did not acknowledge pair write");
                Err(RelationError::StoreWriteFailed {
                    owner: owner.to_string(),
                    target: target.to_string(),
                })
            }
            Err(e) => {
                error!(owner, target, "Store pair write failed: {}", e);
                Err(RelationError::store(e))
            }
        }
    }

    /// Count and log the outcome of an operation
    fn track(
        &mut self,
        op: Operation,
        uid: &str,
        target: &str,
        result: Result<Transition, RelationError>,
    ) -> Result<Transition, RelationError> {
        match &result {
            Ok(Transition::Applied) => {
                info!(op = %op, uid, target, "Relationship updated");
                self.metrics.record_applied(op);
            }
            Ok(Transition::Unchanged) => {
                self.metrics.record_unchanged(op);
            }
            Err(e) => {
                debug!(
                    op = %op,
                    uid,
                    target,
                    kind = e.kind().as_str(),
                    "Operation rejected: {}",
                    e
                );
                self.metrics.record_rejected(op);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RelationErrorKind;
    use std::collections::BTreeMap;

    /// In-memory store whose writes and reads can be made to fail
    #[derive(Default)]
    struct ScriptedStore {
        records: BTreeMap<(String, String), RelationshipRecord>,
        refuse_writes_for: Option<String>,
        unavailable: bool,
        fail_apply: bool,
        atomic: bool,
        writes: usize,
    }

    impl ScriptedStore {
        fn seed(&mut self, owner: &str, target: &str, t: RelationshipType) {
            self.records.insert(
                (owner.to_string(), target.to_string()),
                RelationshipRecord::new(owner, target, t, 1),
            );
        }
    }

    impl RelationshipStore for ScriptedStore {
        type Error = String;

        fn find(
            &self,
            owner: &str,
            type_filter: Option<RelationshipType>,
        ) -> Result<Vec<RelationshipRecord>, String> {
            if self.unavailable {
                return Err("connection refused".to_string());
            }
            Ok(self
                .records
                .values()
                .filter(|r| r.owner == owner)
                .filter(|r| type_filter.map_or(true, |t| r.relationship_type == t))
                .cloned()
                .collect())
        }

        fn find_one(
            &self,
            owner: &str,
            target: &str,
        ) -> Result<Option<RelationshipRecord>, String> {
            if self.unavailable {
                return Err("connection refused".to_string());
            }
            Ok(self.records.get(&(owner.to_string(), target.to_string())).cloned())
        }

        fn upsert(&mut self, record: &RelationshipRecord) -> Result<bool, String> {
            self.writes += 1;
            if self.refuse_writes_for.as_deref() == Some(record.owner.as_str()) {
                return Ok(false);
            }
            self.records
                .insert((record.owner.clone(), record.target.clone()), record.clone());
            Ok(true)
        }

        fn delete(&mut self, owner: &str, target: &str) -> Result<bool, String> {
            self.writes += 1;
            if self.refuse_writes_for.as_deref() == Some(owner) {
                return Ok(false);
            }
            self.records.remove(&(owner.to_string(), target.to_string()));
            Ok(true)
        }

        fn apply(&mut self, writes: &[RecordWrite]) -> Result<bool, String> {
            if self.unavailable || self.fail_apply {
                return Err("connection refused".to_string());
            }

            if self.atomic {
                // All-or-nothing: a refused write means none of them land
                let refused = writes
                    .iter()
                    .any(|w| self.refuse_writes_for.as_deref() == Some(w.key().0));
                if refused {
                    return Ok(false);
                }
            }

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

        fn supports_atomic_writes(&self) -> bool {
            self.atomic
        }
    }

    #[test]
    fn test_atomic_falls_back_without_store_support() {
        let store = ScriptedStore::default();
        let manager = RelationshipManager::new(store, RelationsConfig::default());
        assert!(!manager.atomic_pairs());

        let store = ScriptedStore {
            atomic: true,
            ..Default::default()
        };
        let manager = RelationshipManager::new(store, RelationsConfig::default());
        assert!(manager.atomic_pairs());

        let store = ScriptedStore {
            atomic: true,
            ..Default::default()
        };
        let manager = RelationshipManager::new(store, RelationsConfig::sequential());
        assert!(!manager.atomic_pairs());
    }

    #[test]
    fn test_negative_ack_is_write_failed() {
        let store = ScriptedStore {
            refuse_writes_for: Some("alice".to_string()),
            ..Default::default()
        };
        let mut manager = RelationshipManager::new(store, RelationsConfig::sequential());

        let err = manager.block_user("alice", "bob").unwrap_err();
        assert_eq!(err.kind(), RelationErrorKind::StoreWriteFailed);
        assert!(!err.is_retryable());
        assert_eq!(manager.metrics().total_rejected(), 1);
    }

    #[test]
    fn test_sequential_window_on_second_write_failure() {
        // The requester's half lands, the target's half is refused
        let store = ScriptedStore {
            refuse_writes_for: Some("bob".to_string()),
            ..Default::default()
        };
        let mut manager = RelationshipManager::new(store, RelationsConfig::sequential());

        let err = manager.send_friend_request("alice", "bob").unwrap_err();
        assert_eq!(
            err,
            RelationError::StoreWriteFailed {
                owner: "bob".to_string(),
                target: "alice".to_string()
            }
        );
        assert_eq!(
            manager.get_relation("alice", "bob").unwrap().unwrap().relationship_type,
            RelationshipType::Outgoing
        );
        assert!(manager.get_relation("bob", "alice").unwrap().is_none());
    }

    #[test]
    fn test_clock_before_epoch_stamps_zero() {
        let before = UNIX_EPOCH - std::time::Duration::from_secs(5);
        assert_eq!(millis_since_epoch(before), 0);

        let after = UNIX_EPOCH + std::time::Duration::from_millis(1500);
        assert_eq!(millis_since_epoch(after), 1500);
    }

    #[test]
    fn test_atomic_pair_refusal_leaves_no_half() {
        let store = ScriptedStore {
            refuse_writes_for: Some("bob".to_string()),
            atomic: true,
            ..Default::default()
        };
        let mut manager = RelationshipManager::new(store, RelationsConfig::default());
        assert!(manager.atomic_pairs());

        let err = manager.send_friend_request("alice", "bob").unwrap_err();
        assert_eq!(
            err,
            RelationError::StoreWriteFailed {
                owner: "alice".to_string(),
                target: "bob".to_string()
            }
        );
        assert!(!err.is_retryable());
        assert!(manager.get_relation("alice", "bob").unwrap().is_none());
        assert!(manager.get_relation("bob", "alice").unwrap().is_none());
        assert_eq!(manager.store().writes, 0);
    }

    #[test]
    fn test_atomic_pair_store_error_is_unavailable() {
        let mut store = ScriptedStore {
            fail_apply: true,
            atomic: true,
            ..Default::default()
        };
        store.seed("alice", "bob", RelationshipType::Friend);
        store.seed("bob", "alice", RelationshipType::Friend);
        let mut manager = RelationshipManager::new(store, RelationsConfig::default());

        // The lookup succeeds, the pair write fails
        let err = manager.remove_friend("alice", "bob");
        assert_eq!(
            err,
            Err(RelationError::StoreUnavailable("connection refused".to_string()))
        );
        assert_eq!(manager.get_all("alice").unwrap().len(), 1);
        assert_eq!(manager.metrics().total_rejected(), 1);
    }

    #[test]
    fn test_store_error_is_unavailable() {
        let store = ScriptedStore {
            unavailable: true,
            ..Default::default()
        };
        let mut manager = RelationshipManager::new(store, RelationsConfig::default());

        let err = manager.get_relation("alice", "bob").unwrap_err();
        assert_eq!(err, RelationError::StoreUnavailable("connection refused".to_string()));
        assert!(err.is_retryable());

        let err = manager.send_friend_request("alice", "bob").unwrap_err();
        assert_eq!(err.kind(), RelationErrorKind::StoreUnavailable);

        let err = manager.get_relations("alice", RelationshipFilter::Pending).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_remove_friend_is_exactly_two_writes() {
        let mut store = ScriptedStore::default();
        store.seed("alice", "bob", RelationshipType::Friend);
        store.seed("bob", "alice", RelationshipType::Friend);
        let mut manager = RelationshipManager::new(store, RelationsConfig::sequential());

        assert_eq!(manager.remove_friend("alice", "bob").unwrap(), Transition::Applied);
        assert_eq!(manager.store().writes, 2);
        assert!(manager.get_all("alice").unwrap().is_empty());
        assert!(manager.get_all("bob").unwrap().is_empty());
    }

    #[test]
    fn test_business_rejection_writes_nothing() {
        let mut store = ScriptedStore::default();
        store.seed("bob", "alice", RelationshipType::Block);
        let mut manager = RelationshipManager::new(store, RelationsConfig::default());

        let err = manager.send_friend_request("alice", "bob").unwrap_err();
        assert_eq!(err, RelationError::BlockedByTarget);
        assert_eq!(manager.store().writes, 0);
    }

    #[test]
    fn test_metrics_track_outcomes() {
        let store = ScriptedStore::default();
        let mut manager = RelationshipManager::new(store, RelationsConfig::default());

        manager.block_user("alice", "bob").unwrap();
        manager.unblock_user("alice", "carol").unwrap();
        manager.retract_friend_request("alice", "dave").unwrap_err();

        let metrics = manager.metrics();
        assert_eq!(metrics.applied[&Operation::Block], 1);
        assert_eq!(metrics.unchanged[&Operation::Unblock], 1);
        assert_eq!(metrics.rejected[&Operation::RetractRequest], 1);

        manager.reset_metrics();
        assert_eq!(manager.metrics().total_applied(), 0);
    }
}
