//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::record::{Priority, Status, VehicleType};

/// Add command arguments.
///
/// Required fields are validated by the record manager so that a rejected
/// submission writes nothing; clap only shapes the flags.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Rental booking identifier (required)
    #[arg(long)]
    pub booking_id: Option<String>,

    /// Customer name
    #[arg(long)]
    pub customer_name: Option<String>,

    /// Customer mobile number (required)
    #[arg(long)]
    pub customer_mobile: Option<String>,

    /// Pickup location
    #[arg(long)]
    pub pickup_location: Option<String>,

    /// Booking duration in days
    #[arg(long)]
    pub booking_days: Option<u32>,

    /// Issue description (required)
    #[arg(long)]
    pub issue: Option<String>,

    /// Vehicle registration number
    #[arg(long)]
    pub vehicle_number: Option<String>,

    /// Vehicle model name
    #[arg(long)]
    pub vehicle_model: Option<String>,

    /// Kind of vehicle (required)
    #[arg(long, value_enum)]
    pub vehicle_type: Option<VehicleTypeArg>,

    /// Customer map link (coordinates are extracted when lat/lon are absent)
    #[arg(long)]
    pub location_url: Option<String>,

    /// Explicit latitude
    #[arg(long)]
    pub latitude: Option<String>,

    /// Explicit longitude
    #[arg(long)]
    pub longitude: Option<String>,

    /// Initial priority
    #[arg(long, value_enum, default_value = "medium")]
    pub priority: PriorityArg,

    /// Initial status
    #[arg(long, value_enum, default_value = "open")]
    pub status: StatusArg,

    /// Follow-up owner (technician)
    #[arg(long)]
    pub followup_by: Option<String>,
}

/// Update command arguments.
///
/// Omitted flags keep the stored value, the way the edit form pre-fills every
/// field before a re-save.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Breakdown identifier, e.g. BD-98877
    pub id: String,

    /// New status
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// New priority
    #[arg(long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// New follow-up owner
    #[arg(long)]
    pub followup_by: Option<String>,

    /// Resolver name (used when entering Resolved)
    #[arg(long)]
    pub resolved_by: Option<String>,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Breakdown identifier, e.g. BD-98877
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Keep only these statuses
    #[arg(short, long, value_enum)]
    pub status: Vec<StatusArg>,

    /// Keep only these priorities
    #[arg(short, long, value_enum)]
    pub priority: Vec<PriorityArg>,

    /// Keep only these vehicle types
    #[arg(short = 't', long, value_enum)]
    pub vehicle_type: Vec<VehicleTypeArg>,

    /// Keep records whose follow-up owner contains this text
    #[arg(long)]
    pub followup_contains: Option<String>,

    /// Keep records created on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Keep records created on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Maximum number of records to show
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Export command arguments (CSV).
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Keep only these statuses
    #[arg(short, long, value_enum)]
    pub status: Vec<StatusArg>,

    /// Keep only these priorities
    #[arg(short, long, value_enum)]
    pub priority: Vec<PriorityArg>,

    /// Keep only these vehicle types
    #[arg(short = 't', long, value_enum)]
    pub vehicle_type: Vec<VehicleTypeArg>,

    /// Keep records whose follow-up owner contains this text
    #[arg(long)]
    pub followup_contains: Option<String>,

    /// Keep records created on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Keep records created on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Cards command arguments (printable text pages).
#[derive(Debug, Args)]
pub struct CardsCommand {
    /// Include only these statuses
    #[arg(short, long, value_enum)]
    pub status: Vec<StatusArg>,

    /// Include only these vehicle types
    #[arg(short = 't', long, value_enum)]
    pub vehicle_type: Vec<VehicleTypeArg>,

    /// Lines per page (defaults to the configured value)
    #[arg(long)]
    pub page_lines: Option<usize>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Status argument for filtering and transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Newly logged
    Open,
    /// Being worked
    InProgress,
    /// Fixed
    Resolved,
    /// Withdrawn
    Cancelled,
}

impl From<StatusArg> for Status {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Open => Self::Open,
            StatusArg::InProgress => Self::InProgress,
            StatusArg::Resolved => Self::Resolved,
            StatusArg::Cancelled => Self::Cancelled,
        }
    }
}

/// Priority argument for filtering and transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    /// Can wait
    Low,
    /// Normal handling
    Medium,
    /// Customer stranded
    High,
    /// Safety issue
    Critical,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Self::Low,
            PriorityArg::Medium => Self::Medium,
            PriorityArg::High => Self::High,
            PriorityArg::Critical => Self::Critical,
        }
    }
}

/// Vehicle type argument for filtering and creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VehicleTypeArg {
    /// Two-wheeler
    Bike,
    /// Four-wheeler
    Car,
}

impl From<VehicleTypeArg> for VehicleType {
    fn from(arg: VehicleTypeArg) -> Self {
        match arg {
            VehicleTypeArg::Bike => Self::Bike,
            VehicleTypeArg::Car => Self::Car,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
