//! Command implementations.

pub mod mutate;
pub mod query;

pub use self::mutate::execute_mutation;
pub use self::query::{execute_get, execute_list};

use crate::cli::Command;
use crate::error::Result;
use crate::output::Formatter;
use discdoor_domain::RelationshipStore;
use discdoor_relations::{Operation, RelationshipManager};
use std::fmt::Display;

/// Dispatch a parsed command and return the text to print.
pub fn execute<S>(
    command: Command,
    manager: &mut RelationshipManager<S>,
    formatter: &Formatter,
) -> Result<String>
where
    S: RelationshipStore,
    S::Error: Display,
{
    let (op, args) = match command {
        Command::Get(args) => return execute_get(args, manager, formatter),
        Command::List(args) => return execute_list(args, manager, formatter),
        Command::Block(args) => (Operation::Block, args),
        Command::Unblock(args) => (Operation::Unblock, args),
        Command::Request(args) => (Operation::SendRequest, args),
        Command::Accept(args) => (Operation::AcceptRequest, args),
        Command::Deny(args) => (Operation::DenyRequest, args),
        Command::Retract(args) => (Operation::RetractRequest, args),
        Command::Unfriend(args) => (Operation::RemoveFriend, args),
    };

    execute_mutation(op, args, manager, formatter)
}
