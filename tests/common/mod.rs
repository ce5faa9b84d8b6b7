//! Shared test fixtures: temporary Papers2 databases and input documents.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tempfile::TempDir;

/// The subset of the Papers2 `Publication` table the tool reads.
pub const PUBLICATION_SCHEMA: &str = "CREATE TABLE Publication (
    citekey TEXT,
    publication_date TEXT,
    full_author_string TEXT,
    attributed_title TEXT,
    bundle_string TEXT,
    volume TEXT,
    number TEXT,
    startpage INTEGER,
    endpage INTEGER
);";

/// A publication row to seed a test library with.
pub struct Publication<'a> {
    pub citekey: &'a str,
    pub publication_date: Option<&'a str>,
    pub authors: Option<&'a str>,
    pub title: Option<&'a str>,
    pub journal: Option<&'a str>,
    pub volume: Option<&'a str>,
    pub number: Option<&'a str>,
    pub start_page: Option<i64>,
    pub end_page: Option<i64>,
}

/// The example entry from the Papers2 documentation.
pub fn proudfoot() -> Publication<'static> {
    Publication {
        citekey: "Proudfoot:2004gs",
        publication_date: Some("99200406011200000000222000"),
        authors: Some("Nick Proudfoot"),
        title: Some("New perspectives on connecting messenger RNA 3' end formation to transcription"),
        journal: Some("Current opinion in cell biology"),
        volume: Some("16"),
        number: Some("3"),
        start_page: Some(272),
        end_page: Some(278),
    }
}

/// A publication with only a key and a title.
pub fn bare(citekey: &str) -> Publication<'_> {
    Publication {
        citekey,
        publication_date: None,
        authors: None,
        title: Some("Untitled"),
        journal: None,
        volume: None,
        number: None,
        start_page: None,
        end_page: None,
    }
}

/// Creates `Database.papersdb` inside `dir` holding `publications`.
pub fn create_library(dir: &Path, publications: &[Publication]) -> PathBuf {
    let path = dir.join("Database.papersdb");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(PUBLICATION_SCHEMA).unwrap();
    for p in publications {
        conn.execute(
            "INSERT INTO Publication (citekey, publication_date, full_author_string,
                attributed_title, bundle_string, volume, number, startpage, endpage)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                p.citekey,
                p.publication_date,
                p.authors,
                p.title,
                p.journal,
                p.volume,
                p.number,
                p.start_page,
                p.end_page,
            ],
        )
        .unwrap();
    }
    path
}

/// Writes `content` to `dir/name` and returns the path.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}
