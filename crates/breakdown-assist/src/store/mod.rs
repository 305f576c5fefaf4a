//! Tabular store abstraction.
//!
//! All persistent state lives in an external row/column store reached through
//! a deliberately small API: read every data row, append one row, overwrite
//! one row in place. The [`TabularStore`] trait captures that contract;
//! backends own header and indexing concerns internally.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::record::COLUMNS;

/// Normalize a row to the fixed column count, padding short rows with empty
/// cells and dropping extra cells.
pub(crate) fn normalize_row(row: &[String]) -> Vec<String> {
    let mut cells: Vec<String> = row.iter().take(COLUMNS.len()).cloned().collect();
    cells.resize(COLUMNS.len(), String::new());
    cells
}

/// A row-oriented table of strings.
///
/// Rows are returned and accepted in storage order; the newest row is not
/// guaranteed to come first. Row indexes are 0-based over data rows (any
/// header row a backend keeps is its own concern). Backends normalize every
/// written row to the fixed [`COLUMNS`] width. There is no delete operation
/// and no conditional write: overwriting a row is last-writer-wins.
pub trait TabularStore {
    /// The name of this backend (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Read every data row of the table, in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or read.
    fn read_all(&self) -> Result<Vec<Vec<String>>>;

    /// Append one row to the end of the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or refuses the write.
    fn append_row(&mut self, row: &[String]) -> Result<()>;

    /// Overwrite the row at the given 0-based data row index in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the store cannot be
    /// reached.
    fn update_row(&mut self, index: usize, row: &[String]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shared contract checks run against both backends.
    fn roundtrip(store: &mut dyn TabularStore) {
        assert!(store.read_all().unwrap().is_empty());

        store
            .append_row(&["a".to_string(), "b".to_string()])
            .unwrap();
        store
            .append_row(&["c".to_string(), "d".to_string()])
            .unwrap();

        let rows = store.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "a");
        assert_eq!(rows[1][1], "d");

        store
            .update_row(0, &["x".to_string(), "y".to_string()])
            .unwrap();
        let rows = store.read_all().unwrap();
        assert_eq!(rows[0][0], "x");
        assert_eq!(rows[1][0], "c");

        let err = store.update_row(9, &[String::new()]).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_memory_store_contract() {
        let mut store = MemoryStore::new();
        roundtrip(&mut store);
    }

    #[test]
    fn test_sqlite_store_contract() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        roundtrip(&mut store);
    }
}
