//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use discdoor_domain::RelationshipFilter;
use std::path::PathBuf;

/// Discdoor CLI - Manage friend, block and pending relationships between users.
#[derive(Debug, Parser)]
#[command(name = "discdoor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DISCDOOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path (overrides the config file)
    #[arg(long, global = true, env = "DISCDOOR_DB")]
    pub db: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (types or outcomes only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the relation a user holds toward another user
    Get(PairArgs),

    /// List a user's relations
    List(ListArgs),

    /// Block a user
    Block(PairArgs),

    /// Unblock a user
    Unblock(PairArgs),

    /// Send a friend request
    Request(PairArgs),

    /// Accept a friend request
    Accept(PairArgs),

    /// Deny a friend request
    Deny(PairArgs),

    /// Retract a sent friend request
    Retract(PairArgs),

    /// Remove a friend
    Unfriend(PairArgs),
}

/// Acting user and target user.
#[derive(Debug, Parser)]
pub struct PairArgs {
    /// Acting user ID
    pub uid: String,

    /// Target user ID
    pub target: String,
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// User ID
    pub uid: String,

    /// Relation filter
    #[arg(long, value_enum, default_value = "all")]
    pub filter: FilterArg,
}

/// Filter argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FilterArg {
    /// Every relation
    All,
    /// Friends
    Friend,
    /// Blocked users
    Block,
    /// Incoming requests
    Incoming,
    /// Outgoing requests
    Outgoing,
    /// Incoming and outgoing requests
    Pending,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<FilterArg> for RelationshipFilter {
    fn from(filter: FilterArg) -> Self {
        match filter {
            FilterArg::All => RelationshipFilter::All,
            FilterArg::Friend => RelationshipFilter::Friend,
            FilterArg::Block => RelationshipFilter::Block,
            FilterArg::Incoming => RelationshipFilter::Incoming,
            FilterArg::Outgoing => RelationshipFilter::Outgoing,
            FilterArg::Pending => RelationshipFilter::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_command() {
        let cli = Cli::parse_from(["discdoor", "request", "alice", "bob"]);
        match cli.command {
            Command::Request(args) => {
                assert_eq!(args.uid, "alice");
                assert_eq!(args.target, "bob");
            }
            _ => panic!("Expected Request command"),
        }
    }

    #[test]
    fn test_list_filter() {
        let cli = Cli::parse_from([
            "discdoor", "--db", ":memory:", "list", "alice", "--filter", "pending",
        ]);
        match cli.command {
            Command::List(args) => assert_eq!(args.filter, FilterArg::Pending),
            _ => panic!("Expected List command"),
        }
        assert_eq!(cli.db, Some(PathBuf::from(":memory:")));

        let cli = Cli::parse_from(["discdoor", "list", "alice"]);
        match cli.command {
            Command::List(args) => assert_eq!(args.filter, FilterArg::All),
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::parse_from(["discdoor", "-vv", "get", "alice", "bob"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_filter_conversion() {
        let filter: RelationshipFilter = FilterArg::Pending.into();
        assert_eq!(filter, RelationshipFilter::Pending);
    }

    #[test]
    fn test_missing_target_rejected() {
        assert!(Cli::try_parse_from(["discdoor", "block", "alice"]).is_err());
    }
}
