//! Discdoor CLI - Command-line interface for the Discdoor relationship store.

use clap::Parser;
use discdoor_cli::commands;
use discdoor_cli::config::OutputFormat;
use discdoor_cli::{Cli, Config, Formatter};
use discdoor_relations::RelationshipManager;
use discdoor_store::SqliteStore;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let color_enabled = !cli.no_color;

    match run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            let formatter = Formatter::new(OutputFormat::Table, color_enabled);
            eprintln!("{}", formatter.error(&format!("Error: {}", e)));
            std::process::exit(e.exit_code());
        }
    }
}

fn run(cli: Cli) -> discdoor_cli::Result<String> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(db) = cli.db {
        config.store.path = db;
    }

    let format = cli.format.map(Into::into).unwrap_or(config.output.format);
    let color_enabled = !cli.no_color && config.output.color;
    let formatter = Formatter::new(format, color_enabled);

    let store = SqliteStore::with_config(&config.store)?;
    let mut manager = RelationshipManager::new(store, config.relations.clone());
    tracing::debug!(
        pair_writes = ?manager.config().pair_writes,
        atomic = manager.atomic_pairs(),
        "Relationship manager ready"
    );

    let output = commands::execute(cli.command, &mut manager, &formatter)?;
    tracing::debug!(metrics = %manager.metrics().summary(), "Command finished");
    Ok(output)
}

/// Logs go to stderr so command output stays parseable. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}
