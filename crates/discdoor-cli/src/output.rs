//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use discdoor_domain::RelationshipRecord;
use discdoor_relations::{Operation, Transition};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a list of relationship records.
    pub fn format_records(&self, records: &[RelationshipRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = records.iter().map(record_json).collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => Ok(self.format_records_table(records)),
            OutputFormat::Quiet => Ok(records
                .iter()
                .map(|r| format!("{} {}", r.target, r.relationship_type))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format the result of a single-pair lookup.
    pub fn format_relation(
        &self,
        uid: &str,
        target: &str,
        record: Option<&RelationshipRecord>,
    ) -> Result<String> {
        match (self.format, record) {
            (OutputFormat::Json, Some(record)) => {
                Ok(serde_json::to_string_pretty(&record_json(record))?)
            }
            (OutputFormat::Json, None) => Ok("null".to_string()),
            (OutputFormat::Quiet, Some(record)) => Ok(record.relationship_type.to_string()),
            (OutputFormat::Quiet, None) => Ok("none".to_string()),
            (OutputFormat::Table, Some(record)) => {
                Ok(self.format_records_table(std::slice::from_ref(record)))
            }
            (OutputFormat::Table, None) => {
                Ok(self.info(&format!("{} has no relation to {}", uid, target)))
            }
        }
    }

    /// Format the outcome of a mutating operation.
    pub fn format_transition(
        &self,
        op: Operation,
        uid: &str,
        target: &str,
        transition: Transition,
    ) -> Result<String> {
        let outcome = if transition.is_applied() {
            "applied"
        } else {
            "unchanged"
        };

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "operation": op.as_str(),
                "uid": uid,
                "target": target,
                "result": outcome,
            }))?),
            OutputFormat::Quiet => Ok(outcome.to_string()),
            OutputFormat::Table if transition.is_applied() => {
                Ok(self.success(&format!("{}: {} -> {}", op, uid, target)))
            }
            OutputFormat::Table => {
                Ok(self.info(&format!("{}: nothing to do for {} -> {}", op, uid, target)))
            }
        }
    }

    /// Format records as a table.
    fn format_records_table(&self, records: &[RelationshipRecord]) -> String {
        if records.is_empty() {
            return self.colorize("No relations found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Owner", "Target", "Type", "Updated"]);

        for record in records {
            builder.push_record([
                record.owner.clone(),
                record.target.clone(),
                record.relationship_type.to_string(),
                record.updated_at.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn record_json(record: &RelationshipRecord) -> serde_json::Value {
    serde_json::json!({
        "owner": record.owner,
        "target": record.target,
        "type": record.relationship_type.as_str(),
        "updated_at": record.updated_at,
    })
}
