//! Papers2 library access.
//!
//! Reads publication rows from the Papers2 SQLite database and hands them out
//! as typed [`RawRecord`]s.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use thiserror::Error;

/// Errors that can occur when talking to the library database.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("cannot open database '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// A publication row as stored by Papers2.
///
/// Numeric columns are turned into text here so the rest of the crate never
/// deals with SQLite value types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub citekey: String,
    /// Packed date code, e.g. `99200406011200000000222000`
    pub publication_date: Option<String>,
    /// Comma-and-"and" joined author list
    pub author_string: Option<String>,
    pub title: Option<String>,
    /// Journal or container label (`bundle_string`)
    pub venue: Option<String>,
    pub volume: Option<String>,
    pub number: Option<String>,
    pub start_page: Option<String>,
    pub end_page: Option<String>,
}

/// A source of publication rows, queried by citation key.
pub trait RecordStore {
    /// Returns the rows whose citekey is in `keys`, in one round trip.
    ///
    /// Keys without a row are simply not represented in the result.
    fn fetch(&self, keys: &[String]) -> Result<Vec<RawRecord>, LibraryError>;
}

const PUBLICATION_COLUMNS: &str = "citekey, publication_date, full_author_string, \
     attributed_title, bundle_string, volume, number, startpage, endpage";

/// Read-only handle on a Papers2 database.
pub struct PapersLibrary {
    conn: Connection,
}

impl PapersLibrary {
    /// Opens the database at `path` read-only.
    ///
    /// Fails if the file does not exist, is not a SQLite database, or has no
    /// `Publication` table with the expected columns.
    pub fn open(path: &Path) -> Result<Self, LibraryError> {
        let open_error = |source| LibraryError::Open {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(open_error)?;

        Self::check_schema(&conn).map_err(open_error)?;
        Ok(Self { conn })
    }

    /// Wraps an already open connection (useful for testing).
    pub fn from_connection(conn: Connection) -> Result<Self, LibraryError> {
        Self::check_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Preparing the column list catches missing tables and columns, and
    /// non-database files.
    fn check_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.prepare(&format!(
            "SELECT {} FROM Publication LIMIT 0",
            PUBLICATION_COLUMNS
        ))?;
        Ok(())
    }

    fn row_to_record(row: &Row) -> rusqlite::Result<RawRecord> {
        Ok(RawRecord {
            citekey: column_text(row, 0)?.unwrap_or_default(),
            publication_date: column_text(row, 1)?,
            author_string: column_text(row, 2)?,
            title: column_text(row, 3)?,
            venue: column_text(row, 4)?,
            volume: column_text(row, 5)?,
            number: column_text(row, 6)?,
            start_page: column_text(row, 7)?,
            end_page: column_text(row, 8)?,
        })
    }
}

impl RecordStore for PapersLibrary {
    fn fetch(&self, keys: &[String]) -> Result<Vec<RawRecord>, LibraryError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; keys.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM Publication WHERE citekey IN ({})",
            PUBLICATION_COLUMNS, placeholders
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(rusqlite::params_from_iter(keys), Self::row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }
}

/// Reads a column as text whatever its storage class. NULL becomes `None`.
fn column_text(row: &Row, idx: usize) -> rusqlite::Result<Option<String>> {
    let text = match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    };
    Ok(text)
}
