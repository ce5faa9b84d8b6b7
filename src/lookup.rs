//! Batched citation lookup.
//!
//! Resolves citation keys against a [`RecordStore`] a batch at a time and
//! normalizes each returned row into a [`NormalizedRecord`].

use std::collections::BTreeMap;

use crate::cite::CitationFrequency;
use crate::library::{LibraryError, RawRecord, RecordStore};
use crate::normalize::{normalize_authors, normalize_date};

/// Keys per query; keeps the `IN (...)` list well below SQLite's limits.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Upper bound on keys per query: SQLite's host parameter limit.
pub const MAX_BATCH_SIZE: usize = 32766;

/// A publication in BibTeX terms, ready to be serialized.
///
/// Fields whose source value was missing are `None` and never emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// The citation key
    pub key: String,
    /// `Surname, Given and Surname, Given`
    pub author: Option<String>,
    pub title: Option<String>,
    pub journal: Option<String>,
    /// Four-digit year
    pub year: Option<String>,
    /// Three-letter month abbreviation (e.g. "jun")
    pub month: Option<String>,
    pub volume: Option<String>,
    pub number: Option<String>,
    /// Page range as `start--end`
    pub pages: Option<String>,
}

impl NormalizedRecord {
    /// Builds the BibTeX view of a raw publication row.
    ///
    /// The page range is only kept when both bounds are known.
    pub fn from_raw(raw: RawRecord) -> Self {
        let date = raw
            .publication_date
            .as_deref()
            .map(normalize_date)
            .unwrap_or_default();

        let pages = match (raw.start_page, raw.end_page) {
            (Some(start), Some(end)) => Some(format!("{}--{}", start, end)),
            _ => None,
        };

        NormalizedRecord {
            key: raw.citekey,
            author: raw.author_string.as_deref().map(normalize_authors),
            title: raw.title,
            journal: raw.venue,
            year: date.year,
            month: date.month.map(str::to_string),
            volume: raw.volume,
            number: raw.number,
            pages,
        }
    }
}

/// Looks up `keys` in `store`, at most `batch_size` keys per query.
///
/// Returns one record per key that has a matching row. Keys without a row are
/// absent from the map; an empty key list issues no query at all. A
/// `batch_size` of zero is treated as one.
pub fn lookup<S>(
    store: &S,
    keys: &[String],
    batch_size: usize,
) -> Result<BTreeMap<String, NormalizedRecord>, LibraryError>
where
    S: RecordStore + ?Sized,
{
    let mut results = BTreeMap::new();

    for (index, batch) in keys.chunks(batch_size.max(1)).enumerate() {
        let rows = store.fetch(batch)?;
        tracing::debug!(
            batch = index,
            requested = batch.len(),
            found = rows.len(),
            "queried citation batch"
        );

        for row in rows {
            let record = NormalizedRecord::from_raw(row);
            results.insert(record.key.clone(), record);
        }
    }

    Ok(results)
}

/// Cited keys that have no record, in key order.
pub fn unresolved_keys<'a>(
    frequency: &'a CitationFrequency,
    records: &BTreeMap<String, NormalizedRecord>,
) -> Vec<&'a str> {
    frequency
        .iter()
        .map(|(key, _)| key.as_str())
        .filter(|key| !records.contains_key(*key))
        .collect()
}
