//! State-changing commands.

use crate::cli::PairArgs;
use crate::error::Result;
use crate::output::Formatter;
use discdoor_domain::RelationshipStore;
use discdoor_relations::{Operation, RelationshipManager};
use std::fmt::Display;

/// Execute a mutating command for the pair in `args`.
pub fn execute_mutation<S>(
    op: Operation,
    args: PairArgs,
    manager: &mut RelationshipManager<S>,
    formatter: &Formatter,
) -> Result<String>
where
    S: RelationshipStore,
    S::Error: Display,
{
    let (uid, target) = (args.uid.as_str(), args.target.as_str());

    let transition = match op {
        Operation::Block => manager.block_user(uid, target)?,
        Operation::Unblock => manager.unblock_user(uid, target)?,
        Operation::SendRequest => manager.send_friend_request(uid, target)?,
        Operation::AcceptRequest => manager.accept_friend_request(uid, target)?,
        Operation::DenyRequest => manager.deny_friend_request(uid, target)?,
        Operation::RetractRequest => manager.retract_friend_request(uid, target)?,
        Operation::RemoveFriend => manager.remove_friend(uid, target)?,
    };

    formatter.format_transition(op, uid, target, transition)
}
