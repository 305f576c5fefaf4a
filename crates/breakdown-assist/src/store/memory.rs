//! In-memory tabular store backend.
//!
//! Holds the table as a plain `Vec` of rows. Useful for tests and for
//! ephemeral runs where nothing should outlive the process.

use tracing::debug;

use crate::error::{Error, Result};
use crate::store::{normalize_row, TabularStore};

/// An ephemeral tabular store backed by process memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    rows: Vec<Vec<String>>,
}

impl MemoryStore {
    /// Create an empty in-memory table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of data rows currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TabularStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read_all(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }

    fn append_row(&mut self, row: &[String]) -> Result<()> {
        self.rows.push(normalize_row(row));
        debug!("appended row, table now holds {} rows", self.rows.len());
        Ok(())
    }

    fn update_row(&mut self, index: usize, row: &[String]) -> Result<()> {
        let len = self.rows.len();
        let slot = self
            .rows
            .get_mut(index)
            .ok_or(Error::RowOutOfRange { index, len })?;
        *slot = normalize_row(row);
        debug!("overwrote row {index}");
        Ok(())
    }
}
