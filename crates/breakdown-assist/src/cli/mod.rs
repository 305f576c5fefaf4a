//! Command-line interface for breakdown-assist.
//!
//! This module provides the CLI structure for the `bdassist` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, CardsCommand, ConfigCommand, ExportCommand, ListCommand, OutputFormat,
    PriorityArg, ShowCommand, StatusArg, UpdateCommand, VehicleTypeArg,
};

/// bdassist - Log and track vehicle breakdown incidents
///
/// Records live in a row-oriented tabular store; every command is a single
/// read or write against it.
#[derive(Debug, Parser)]
#[command(name = "bdassist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Act as this user (overrides the configured session actor)
    #[arg(short, long, global = true, value_name = "NAME")]
    pub actor: Option<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log a new breakdown
    Add(AddCommand),

    /// Change status, priority, or follow-up owner of a breakdown
    Update(UpdateCommand),

    /// Show one breakdown by identifier
    Show(ShowCommand),

    /// List breakdowns, most recent first
    List(ListCommand),

    /// Export filtered breakdowns as CSV
    Export(ExportCommand),

    /// Render printable breakdown cards
    Cards(CardsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
