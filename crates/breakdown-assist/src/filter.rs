//! Client-side record filtering.
//!
//! Filtering happens over the cached snapshot, never in the store: the table
//! is small and the store API has no query surface. An empty constraint means
//! no restriction, matching how an empty multi-select behaves in the filter
//! form.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::record::{BreakdownRecord, Priority, Status, VehicleType};

/// Record filter with optional constraints over the snapshot.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Keep records whose status is in this set; empty keeps all.
    pub statuses: Vec<Status>,
    /// Keep records whose priority is in this set; empty keeps all.
    pub priorities: Vec<Priority>,
    /// Keep records whose vehicle type is in this set; empty keeps all.
    pub vehicle_types: Vec<VehicleType>,
    /// Keep records whose follow-up owner contains this text
    /// (case-insensitive).
    pub followup_contains: Option<String>,
    /// Keep records created on or after this date.
    pub created_from: Option<NaiveDate>,
    /// Keep records created on or before this date.
    pub created_to: Option<NaiveDate>,
}

impl RecordFilter {
    /// Check whether a record passes every active constraint.
    ///
    /// A date-bounded filter excludes records whose `created_at` could not be
    /// parsed: an unknown creation time cannot be inside the range.
    #[must_use]
    pub fn matches(&self, record: &BreakdownRecord) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&record.status) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&record.priority) {
            return false;
        }
        if !self.vehicle_types.is_empty() && !self.vehicle_types.contains(&record.vehicle_type) {
            return false;
        }
        if let Some(needle) = self.followup_contains.as_deref() {
            let needle = needle.trim();
            if !needle.is_empty()
                && !record
                    .followup_by
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if self.created_from.is_some() || self.created_to.is_some() {
            let Some(created) = record.created_at.map(|ts| ts.date_naive()) else {
                return false;
            };
            if self.created_from.is_some_and(|from| created < from) {
                return false;
            }
            if self.created_to.is_some_and(|to| created > to) {
                return false;
            }
        }
        true
    }

    /// Apply the filter to a slice of records, keeping order.
    #[must_use]
    pub fn apply(&self, records: &[BreakdownRecord]) -> Vec<BreakdownRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// Sort records most recent first by creation time, records without a
/// parseable creation time last.
pub fn sort_recent_first(records: &mut [BreakdownRecord]) {
    records.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
