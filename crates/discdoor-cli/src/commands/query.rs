//! Read-only commands.

use crate::cli::{ListArgs, PairArgs};
use crate::error::Result;
use crate::output::Formatter;
use discdoor_domain::RelationshipStore;
use discdoor_relations::RelationshipManager;
use std::fmt::Display;

/// Execute the get command.
pub fn execute_get<S>(
    args: PairArgs,
    manager: &RelationshipManager<S>,
    formatter: &Formatter,
) -> Result<String>
where
    S: RelationshipStore,
    S::Error: Display,
{
    let record = manager.get_relation(&args.uid, &args.target)?;
    formatter.format_relation(&args.uid, &args.target, record.as_ref())
}

/// Execute the list command.
pub fn execute_list<S>(
    args: ListArgs,
    manager: &RelationshipManager<S>,
    formatter: &Formatter,
) -> Result<String>
where
    S: RelationshipStore,
    S::Error: Display,
{
    let records = manager.get_relations(&args.uid, args.filter.into())?;
    formatter.format_records(&records)
}
