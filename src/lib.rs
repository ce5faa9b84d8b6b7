//! papers-bibtex: build a minimal BibTeX file from the `\cite` keys in LaTeX
//! documents, using a Papers2 library as the source of metadata.
//!
//! This library provides functionality to:
//! - Extract and count `\cite`, `\citet` and `\citep` keys
//! - Look up the cited publications in a Papers2 SQLite database, in batches
//! - Normalize packed dates and author lists
//! - Serialize the results as BibTeX `@article` entries

pub mod bibtex;
pub mod cite;
pub mod config;
pub mod inputs;
pub mod library;
pub mod lookup;
pub mod normalize;

pub use bibtex::{to_bibtex, write_bibliography};
pub use cite::CitationFrequency;
pub use config::{load_rc, resolve_db_path};
pub use inputs::{expand_patterns, scan_file, scan_reader};
pub use library::{PapersLibrary, RawRecord, RecordStore};
pub use lookup::{lookup, unresolved_keys, NormalizedRecord, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};
pub use normalize::{normalize_authors, normalize_date, PublicationDate};
