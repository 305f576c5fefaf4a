//! Snapshot cache over the tabular store's full-table read.
//!
//! Reads go through a time-boxed snapshot of the whole table; writes drop the
//! snapshot entirely so the writer's next read is never stale. There is no
//! partial invalidation — the table is small and re-fetching it whole is the
//! point.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;
use crate::record::BreakdownRecord;
use crate::store::TabularStore;

/// Default freshness window for a cached snapshot.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Snapshot {
    fetched_at: Instant,
    records: Vec<BreakdownRecord>,
}

/// A time-boxed, explicitly invalidated snapshot of the full table.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    snapshot: Option<Snapshot>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    /// Create a cache with the default freshness window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache with a custom freshness window.
    ///
    /// A zero TTL disables caching: every read re-fetches.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, snapshot: None }
    }

    /// The configured freshness window.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check whether a snapshot exists and is still within its window.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|snap| snap.fetched_at.elapsed() < self.ttl)
    }

    /// Read the full table through the cache.
    ///
    /// Serves the held snapshot while it is fresh; otherwise re-fetches from
    /// the store, parses every row leniently, and replaces the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is stale and the store read fails;
    /// the previous snapshot is kept in that case.
    pub fn records(&mut self, store: &dyn TabularStore) -> Result<Vec<BreakdownRecord>> {
        if let Some(snap) = &self.snapshot {
            if snap.fetched_at.elapsed() < self.ttl {
                debug!("serving {} records from snapshot", snap.records.len());
                return Ok(snap.records.clone());
            }
        }

        let rows = store.read_all()?;
        let records: Vec<BreakdownRecord> =
            rows.iter().map(|row| BreakdownRecord::from_row(row)).collect();
        debug!(
            "refreshed snapshot from {} store: {} records",
            store.name(),
            records.len()
        );
        self.snapshot = Some(Snapshot {
            fetched_at: Instant::now(),
            records: records.clone(),
        });
        Ok(records)
    }

    /// Drop the snapshot entirely; the next read re-fetches.
    pub fn invalidate(&mut self) {
        if self.snapshot.take().is_some() {
            debug!("snapshot invalidated");
        }
    }
}
