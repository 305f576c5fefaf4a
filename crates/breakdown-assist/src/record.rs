//! Core record types for breakdown-assist.
//!
//! This module defines the breakdown record entity, its lifecycle enums, the
//! fixed column schema shared with the tabular store, and the row codec that
//! serializes records to and from stored rows of strings.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Prefix applied to every derived breakdown identifier.
pub const ID_PREFIX: &str = "BD-";

/// Timestamp format used for every stored timestamp, e.g. `2026-08-07 14:03:21+0530`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// The fixed column schema of the breakdowns table, in storage order.
pub const COLUMNS: [&str; 21] = [
    "id",
    "created_at",
    "last_updated",
    "booking_id",
    "customer_name",
    "customer_mobile",
    "pickup_location",
    "booking_days",
    "issue",
    "vehicle_number",
    "vehicle_model",
    "vehicle_type",
    "customer_location_url",
    "latitude",
    "longitude",
    "priority",
    "status",
    "followup_by",
    "added_by",
    "resolved_by",
    "resolved_at",
];

/// Lifecycle status of a breakdown record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    /// Newly logged, nobody working on it yet.
    #[default]
    Open,
    /// A follow-up owner is actively working the incident.
    #[serde(rename = "In Progress")]
    InProgress,
    /// The incident was fixed; resolver and resolution time are recorded.
    Resolved,
    /// The incident was withdrawn without resolution.
    Cancelled,
}

impl Status {
    /// All statuses, in the order they are offered as choices.
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Resolved, Self::Cancelled];

    /// Parse a stored cell value, coercing anything unrecognized to the
    /// default rather than failing the read path.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        trimmed.parse().unwrap_or_else(|_| {
            warn!("unknown stored status {trimmed:?}, coercing to {}", Self::default());
            Self::default()
        })
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "open" => Ok(Self::Open),
            "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid status: {s}")),
        }
    }
}

/// Urgency of a breakdown record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    /// Can wait for a convenient slot.
    Low,
    /// Normal handling.
    #[default]
    Medium,
    /// Customer is stranded or blocking a booking.
    High,
    /// Safety issue or escalation.
    Critical,
}

impl Priority {
    /// All priorities, in the order they are offered as choices.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Parse a stored cell value, coercing anything unrecognized to the
    /// default rather than failing the read path.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        trimmed.parse().unwrap_or_else(|_| {
            warn!("unknown stored priority {trimmed:?}, coercing to {}", Self::default());
            Self::default()
        })
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("invalid priority: {s}")),
        }
    }
}

/// Kind of vehicle involved in the breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VehicleType {
    /// Two-wheeler.
    #[default]
    Bike,
    /// Four-wheeler.
    Car,
}

impl VehicleType {
    /// All vehicle types, in the order they are offered as choices.
    pub const ALL: [Self; 2] = [Self::Bike, Self::Car];

    /// Parse a stored cell value, coercing anything unrecognized to the
    /// default rather than failing the read path.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        trimmed.parse().unwrap_or_else(|_| {
            warn!("unknown stored vehicle type {trimmed:?}, coercing to {}", Self::default());
            Self::default()
        })
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bike => write!(f, "Bike"),
            Self::Car => write!(f, "Car"),
        }
    }
}

impl std::str::FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bike" => Ok(Self::Bike),
            "car" => Ok(Self::Car),
            _ => Err(format!("invalid vehicle type: {s}")),
        }
    }
}

/// One breakdown incident with its full field set and lifecycle state.
///
/// The authoritative copy of every record lives in the tabular store; this
/// struct is the in-memory view used for validation, transitions, and
/// rendering. Timestamps are optional because stored cells may hold
/// unparsable text, which the read path degrades to `None` instead of
/// failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BreakdownRecord {
    /// Derived identifier, e.g. `BD-98877`.
    pub id: String,
    /// When the record was first logged.
    pub created_at: Option<DateTime<FixedOffset>>,
    /// When the record was last written.
    pub last_updated: Option<DateTime<FixedOffset>>,
    /// The rental booking this breakdown belongs to.
    pub booking_id: String,
    /// Customer name.
    pub customer_name: String,
    /// Customer mobile number.
    pub customer_mobile: String,
    /// Where the vehicle was picked up.
    pub pickup_location: String,
    /// Booking duration in days, if known.
    pub booking_days: Option<u32>,
    /// Free-text issue description.
    pub issue: String,
    /// Vehicle registration number.
    pub vehicle_number: String,
    /// Vehicle model name.
    pub vehicle_model: String,
    /// Kind of vehicle.
    pub vehicle_type: VehicleType,
    /// Free-text map link supplied by the customer.
    pub customer_location_url: String,
    /// Customer latitude, explicit or extracted from the map link.
    pub latitude: Option<f64>,
    /// Customer longitude, explicit or extracted from the map link.
    pub longitude: Option<f64>,
    /// Urgency.
    pub priority: Priority,
    /// Lifecycle status.
    pub status: Status,
    /// Name of the follow-up owner (technician).
    pub followup_by: String,
    /// Name of whoever logged the record.
    pub added_by: String,
    /// Name of whoever resolved the record; empty unless Resolved.
    pub resolved_by: String,
    /// When the record was resolved; empty unless Resolved.
    pub resolved_at: Option<DateTime<FixedOffset>>,
}

impl BreakdownRecord {
    /// Check whether this record is in the Resolved status.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.status == Status::Resolved
    }

    /// Serialize this record to one stored row, one string per column in
    /// [`COLUMNS`] order. Absent values serialize as empty strings.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.created_at.map(format_timestamp).unwrap_or_default(),
            self.last_updated.map(format_timestamp).unwrap_or_default(),
            self.booking_id.clone(),
            self.customer_name.clone(),
            self.customer_mobile.clone(),
            self.pickup_location.clone(),
            self.booking_days.map(|d| d.to_string()).unwrap_or_default(),
            self.issue.clone(),
            self.vehicle_number.clone(),
            self.vehicle_model.clone(),
            self.vehicle_type.to_string(),
            self.customer_location_url.clone(),
            self.latitude.map(|v| v.to_string()).unwrap_or_default(),
            self.longitude.map(|v| v.to_string()).unwrap_or_default(),
            self.priority.to_string(),
            self.status.to_string(),
            self.followup_by.clone(),
            self.added_by.clone(),
            self.resolved_by.clone(),
            self.resolved_at.map(format_timestamp).unwrap_or_default(),
        ]
    }

    /// Deserialize a stored row into a record.
    ///
    /// The codec is deliberately lenient: short rows read as empty cells,
    /// unparsable numbers and timestamps degrade to `None`, and enum cells
    /// outside the defined sets are coerced to their defaults. The read path
    /// never fails on bad cell data.
    #[must_use]
    pub fn from_row(row: &[String]) -> Self {
        let cell = |index: usize| row.get(index).map(String::as_str).unwrap_or_default();

        Self {
            id: cell(0).trim().to_string(),
            created_at: parse_timestamp(cell(1)),
            last_updated: parse_timestamp(cell(2)),
            booking_id: cell(3).to_string(),
            customer_name: cell(4).to_string(),
            customer_mobile: cell(5).to_string(),
            pickup_location: cell(6).to_string(),
            booking_days: cell(7).trim().parse().ok(),
            issue: cell(8).to_string(),
            vehicle_number: cell(9).to_string(),
            vehicle_model: cell(10).to_string(),
            vehicle_type: VehicleType::from_stored(cell(11)),
            customer_location_url: cell(12).to_string(),
            latitude: cell(13).trim().parse().ok(),
            longitude: cell(14).trim().parse().ok(),
            priority: Priority::from_stored(cell(15)),
            status: Status::from_stored(cell(16)),
            followup_by: cell(17).to_string(),
            added_by: cell(18).to_string(),
            resolved_by: cell(19).to_string(),
            resolved_at: parse_timestamp(cell(20)),
        }
    }
}

/// Derive a breakdown identifier from a booking identifier.
///
/// Takes the last 5 characters of the booking identifier when it is at least
/// 5 characters long, the whole value otherwise, and prefixes the result with
/// [`ID_PREFIX`].
#[must_use]
pub fn derive_id(booking_id: &str) -> String {
    let chars: Vec<char> = booking_id.chars().collect();
    let suffix: String = if chars.len() >= 5 {
        chars[chars.len() - 5..].iter().collect()
    } else {
        booking_id.to_string()
    };
    format!("{ID_PREFIX}{suffix}")
}

/// Format a timestamp using the fixed storage format.
#[must_use]
pub fn format_timestamp(ts: DateTime<FixedOffset>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp cell.
///
/// Returns `None` for empty or unparsable values; stored timestamps are never
/// a reason to fail a read.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT).ok()
}
