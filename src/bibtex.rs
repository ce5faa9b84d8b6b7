//! BibTeX output.
//!
//! Renders [`NormalizedRecord`]s as minimal `@article` entries.

use std::io::{self, Write};

use crate::lookup::NormalizedRecord;

/// Renders one record as a BibTeX `@article` block.
///
/// Fields are written in a fixed order and only when present. The title is
/// wrapped in double braces so BibTeX keeps its capitalization. The block has
/// no trailing newline.
///
/// # Examples
///
/// ```
/// use papers_bibtex::{to_bibtex, NormalizedRecord};
///
/// let record = NormalizedRecord {
///     key: "Proudfoot:2004gs".to_string(),
///     title: Some("New perspectives".to_string()),
///     year: Some("2004".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(
///     to_bibtex(&record),
///     "@article{Proudfoot:2004gs,\ntitle = {{New perspectives}},\nyear = {2004}\n}"
/// );
/// ```
pub fn to_bibtex(record: &NormalizedRecord) -> String {
    let fields = [
        ("author", &record.author),
        ("title", &record.title),
        ("journal", &record.journal),
        ("year", &record.year),
        ("month", &record.month),
        ("volume", &record.volume),
        ("number", &record.number),
        ("pages", &record.pages),
    ];

    let lines: Vec<String> = fields
        .iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (*name, v)))
        .map(|(name, value)| match name {
            "title" => format!("title = {{{{{}}}}}", value),
            _ => format!("{} = {{{}}}", name, value),
        })
        .collect();

    let mut entry = format!("@article{{{},\n", record.key);
    if !lines.is_empty() {
        entry.push_str(&lines.join(",\n"));
        entry.push('\n');
    }
    entry.push('}');
    entry
}

/// Writes every record as a BibTeX block followed by a blank line.
pub fn write_bibliography<'a, W, I>(writer: &mut W, records: I) -> io::Result<usize>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut written = 0;
    for record in records {
        write!(writer, "{}\n\n", to_bibtex(record))?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
