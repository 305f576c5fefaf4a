//! `breakdown-assist` - A logbook for vehicle breakdown incidents
//!
//! This library provides the core functionality for logging breakdown
//! records, moving them through their lifecycle, and exporting them. All
//! persistent state lives in a row-oriented tabular store behind the
//! [`store::TabularStore`] trait; the application itself only holds a
//! short-lived snapshot cache.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod geo;
pub mod logging;
pub mod manager;
pub mod record;
pub mod store;

pub use cache::SnapshotCache;
pub use config::Config;
pub use error::{Error, Result};
pub use filter::RecordFilter;
pub use logging::init_logging;
pub use manager::{NewBreakdown, Policy, RecordManager, Session, Transition};
pub use record::{BreakdownRecord, Priority, Status, VehicleType};
pub use store::{MemoryStore, SqliteStore, TabularStore};
