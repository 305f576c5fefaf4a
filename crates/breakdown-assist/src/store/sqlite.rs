//! `SQLite`-backed tabular store.
//!
//! Persists the breakdowns table in a local `SQLite` file using the same
//! fixed column order as the record schema. Every cell is stored as text,
//! mirroring the spreadsheet the table models; a hidden `seq` column
//! preserves storage order so row indexes stay stable across reads.

use std::path::{Path, PathBuf};

use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::COLUMNS;
use crate::store::{normalize_row, TabularStore};

/// Default name of the breakdowns table.
pub const DEFAULT_TABLE: &str = "breakdowns";

/// The current schema version.
const CURRENT_VERSION: i32 = 1;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// A tabular store persisted in a local `SQLite` database.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Name of the table holding the rows.
    table: String,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store at the given path using the default table name.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_table(path, DEFAULT_TABLE)
    }

    /// Open or create a store at the given path with a custom table name.
    ///
    /// # Errors
    ///
    /// Returns an error if the table name is not a plain identifier, the
    /// database cannot be opened, or schema initialization fails.
    pub fn open_with_table(path: impl AsRef<Path>, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL keeps concurrent readers cheap
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        initialize_schema(&conn, table)?;

        info!("database opened at {}", path.display());
        Ok(Self {
            path,
            table: table.to_string(),
            conn,
        })
    }

    /// Create an in-memory store, mostly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        initialize_schema(&conn, DEFAULT_TABLE)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            table: DEFAULT_TABLE.to_string(),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the table name rows are stored under.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Look up the `seq` key of the row at the given 0-based data row index.
    fn seq_at(&self, index: usize) -> Result<Option<i64>> {
        let offset = i64::try_from(index).unwrap_or(i64::MAX);
        let seq = self
            .conn
            .query_row(
                &format!("SELECT seq FROM {} ORDER BY seq LIMIT 1 OFFSET ?1", self.table),
                [offset],
                |row| row.get(0),
            )
            .optional()?;
        Ok(seq)
    }

    /// Count data rows in the table.
    fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl TabularStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn read_all(&self) -> Result<Vec<Vec<String>>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY seq",
            COLUMNS.join(", "),
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                (0..COLUMNS.len())
                    .map(|i| row.get::<_, String>(i))
                    .collect::<rusqlite::Result<Vec<String>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn append_row(&mut self, row: &[String]) -> Result<()> {
        let cells = normalize_row(row);
        let placeholders: Vec<String> = (1..=COLUMNS.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            COLUMNS.join(", "),
            placeholders.join(", ")
        );
        self.conn.execute(&sql, params_from_iter(cells))?;
        debug!("appended row with seq {}", self.conn.last_insert_rowid());
        Ok(())
    }

    fn update_row(&mut self, index: usize, row: &[String]) -> Result<()> {
        let seq = match self.seq_at(index)? {
            Some(seq) => seq,
            None => {
                let len = self.count()?;
                return Err(Error::RowOutOfRange { index, len });
            }
        };

        let cells = normalize_row(row);
        let assignments: Vec<String> = COLUMNS
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{col} = ?{}", i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE seq = ?{}",
            self.table,
            assignments.join(", "),
            COLUMNS.len() + 1
        );

        let mut values: Vec<String> = cells;
        values.push(seq.to_string());
        self.conn.execute(&sql, params_from_iter(values))?;
        debug!("overwrote row {index} (seq {seq})");
        Ok(())
    }
}

/// Reject table names that are not plain identifiers; they are interpolated
/// into SQL and must never carry quoting or punctuation.
fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(Error::store(format!("invalid table name: {table:?}")))
    }
}

/// Initialize the database schema and bring it to the current version.
fn initialize_schema(conn: &Connection, table: &str) -> Result<()> {
    let columns_sql: Vec<String> = COLUMNS
        .iter()
        .map(|col| format!("{col} TEXT NOT NULL DEFAULT ''"))
        .collect();
    let create_table = format!(
        "CREATE TABLE IF NOT EXISTS {table} (seq INTEGER PRIMARY KEY AUTOINCREMENT, {})",
        columns_sql.join(", ")
    );
    conn.execute(&create_table, [])?;
    conn.execute(
        &format!("CREATE INDEX IF NOT EXISTS idx_{table}_id ON {table}(id)"),
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
    )?;

    let version = get_schema_version(conn)?;
    if version < CURRENT_VERSION {
        set_schema_version(conn, CURRENT_VERSION)?;
    }
    Ok(())
}

/// Get the schema version, or 0 for a fresh database.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value.parse().map_err(|_| {
            Error::store(format!("invalid schema version: {value}"))
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Set the schema version in the metadata table.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_append_and_read_preserves_order() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.append_row(&row_of(&["BD-1"])).unwrap();
        store.append_row(&row_of(&["BD-2"])).unwrap();
        store.append_row(&row_of(&["BD-3"])).unwrap();

        let rows = store.read_all().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "BD-1");
        assert_eq!(rows[2][0], "BD-3");
        assert!(rows.iter().all(|r| r.len() == COLUMNS.len()));
    }

    #[test]
    fn test_update_row_in_place() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.append_row(&row_of(&["BD-1", "", "", "RNT1"])).unwrap();
        store.append_row(&row_of(&["BD-2", "", "", "RNT2"])).unwrap();

        store
            .update_row(0, &row_of(&["BD-1", "", "", "RNT1-EDITED"]))
            .unwrap();

        let rows = store.read_all().unwrap();
        assert_eq!(rows[0][3], "RNT1-EDITED");
        assert_eq!(rows[1][3], "RNT2");
    }

    #[test]
    fn test_update_row_out_of_range() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.append_row(&row_of(&["BD-1"])).unwrap();

        let err = store.update_row(5, &row_of(&["BD-9"])).unwrap_err();
        assert!(matches!(err, Error::RowOutOfRange { index: 5, len: 1 }));
    }

    #[test]
    fn test_unicode_cells() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .append_row(&row_of(&["BD-1", "", "", "", "ಅಶಾ ರಾವ್ 🌍"]))
            .unwrap();
        let rows = store.read_all().unwrap();
        assert_eq!(rows[0][4], "ಅಶಾ ರಾವ್ 🌍");
    }

    #[test]
    fn test_open_file_based_and_reopen() {
        let temp_dir = std::env::temp_dir();
        let db_path = temp_dir.join(format!("breakdown_assist_test_{}.db", std::process::id()));

        {
            let mut store = SqliteStore::open(&db_path).unwrap();
            store.append_row(&row_of(&["BD-1"])).unwrap();
            assert_eq!(store.path(), db_path);
        }

        // Rows survive a reopen.
        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 1);

        drop(store);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = std::env::temp_dir();
        let nested = temp_dir.join(format!(
            "breakdown_assist_test_{}/nested/breakdowns.db",
            std::process::id()
        ));
        if let Some(parent) = nested.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }

        let store = SqliteStore::open(&nested).unwrap();
        assert!(nested.exists());

        drop(store);
        if let Some(parent) = nested.parent().and_then(Path::parent) {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn test_custom_table_name() {
        let temp_dir = std::env::temp_dir();
        let db_path = temp_dir.join(format!(
            "breakdown_assist_table_test_{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&db_path);

        let mut store = SqliteStore::open_with_table(&db_path, "incidents").unwrap();
        assert_eq!(store.table(), "incidents");
        store.append_row(&row_of(&["BD-1"])).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 1);

        drop(store);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let err = SqliteStore::open_with_table(":memory:", "bad name; DROP").unwrap_err();
        assert!(err.to_string().contains("invalid table name"));
        assert!(validate_table_name("breakdowns").is_ok());
        assert!(validate_table_name("_t1").is_ok());
        assert!(validate_table_name("1table").is_err());
        assert!(validate_table_name("").is_err());
    }

    #[test]
    fn test_schema_version_set() {
        let store = SqliteStore::open_in_memory().unwrap();
        let version = get_schema_version(&store.conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_initialize_schema_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        initialize_schema(&store.conn, DEFAULT_TABLE).unwrap();
        initialize_schema(&store.conn, DEFAULT_TABLE).unwrap();
        assert_eq!(get_schema_version(&store.conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_name() {
        assert_eq!(SqliteStore::open_in_memory().unwrap().name(), "sqlite");
    }
}
