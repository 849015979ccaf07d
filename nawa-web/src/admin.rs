//! `manage-submissions` operator CLI
//!
//! Each subcommand maps to exactly one repository call. Output goes to the
//! writer passed to [`run`] so tests can capture it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nawa_common::config::{load_config_file, ConfigLayer, DEFAULT_CONFIG_FILE, DEFAULT_DATABASE_URL};
use nawa_common::db::{Registry, Table};
use std::io::Write;
use std::path::PathBuf;

/// Command-line arguments for manage-submissions
#[derive(Parser, Debug)]
#[command(name = "manage-submissions")]
#[command(about = "Inspect and prune stored site submissions")]
#[command(version)]
pub struct AdminArgs {
    /// TOML config file (only `database_url` is read)
    #[arg(long, global = true, env = "NAWA_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Database connection string
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Print every record, oldest first
    List { table: TableArg },
    /// Delete one record by id
    Delete { table: TableArg, id: i64 },
    /// Delete every record with this email address
    DeleteEmail { table: TableArg, email: String },
    /// Delete records older than the given number of days
    DeleteOld {
        table: TableArg,
        #[arg(default_value_t = 30)]
        days: u32,
    },
    /// Delete every record in the table
    Clear { table: TableArg },
    /// Print the number of records per table
    Counts,
}

/// Table names accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableArg {
    Workshops,
    Contacts,
    Newsletters,
}

impl From<TableArg> for Table {
    fn from(arg: TableArg) -> Self {
        match arg {
            TableArg::Workshops => Table::Workshops,
            TableArg::Contacts => Table::Contacts,
            TableArg::Newsletters => Table::Newsletters,
        }
    }
}

impl AdminArgs {
    /// Database URL: flag/env, then config file, then the default
    pub fn database_url(&self) -> Result<String> {
        let file = load_config_file(&self.config)
            .with_context(|| format!("Failed to read {}", self.config.display()))?;
        let layer = ConfigLayer {
            database_url: self.database_url.clone(),
            ..ConfigLayer::default()
        }
        .over(file);
        Ok(layer
            .database_url
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()))
    }
}

/// Execute one command against the registry
pub async fn run(command: &AdminCommand, registry: &Registry, out: &mut impl Write) -> Result<()> {
    match command {
        AdminCommand::List { table } => {
            let table = Table::from(*table);
            let lines = registry.store(table).list_summaries().await?;
            for line in &lines {
                writeln!(out, "{}", line)?;
            }
            writeln!(out, "Total: {} {}", lines.len(), table)?;
        }
        AdminCommand::Delete { table, id } => {
            let table = Table::from(*table);
            if registry.store(table).delete_by_id(*id).await? {
                writeln!(out, "Deleted {} #{}", table.label(), id)?;
            } else {
                writeln!(out, "No {} with id {}", table.label(), id)?;
            }
        }
        AdminCommand::DeleteEmail { table, email } => {
            let table = Table::from(*table);
            let removed = registry.store(table).delete_by_email(email).await?;
            writeln!(out, "Deleted {} {} record(s) for {}", removed, table, email)?;
        }
        AdminCommand::DeleteOld { table, days } => {
            let table = Table::from(*table);
            let removed = registry.store(table).delete_older_than(*days).await?;
            writeln!(
                out,
                "Deleted {} {} record(s) older than {} day(s)",
                removed, table, days
            )?;
        }
        AdminCommand::Clear { table } => {
            let table = Table::from(*table);
            let removed = registry.store(table).clear().await?;
            writeln!(out, "Cleared {} {} record(s)", removed, table)?;
        }
        AdminCommand::Counts => {
            for (table, count) in registry.counts().await? {
                writeln!(out, "{:<12} {}", table.as_str(), count)?;
            }
        }
    }
    Ok(())
}
