//! Field normalization for Papers2 records.
//!
//! Papers2 stores publication dates as a packed digit string and authors as a
//! single joined string. The functions here turn those into the BibTeX
//! `month`/`year` fields and a `Surname, Given and ...` author list. They
//! never fail: anything they cannot make sense of is left out.

/// Byte range of the year digits in a packed date code.
const YEAR_SLOT: std::ops::Range<usize> = 2..6;
/// Byte range of the month digits in a packed date code.
const MONTH_SLOT: std::ops::Range<usize> = 6..8;

const MONTHS: [(&str, &str); 12] = [
    ("01", "jan"),
    ("02", "feb"),
    ("03", "mar"),
    ("04", "apr"),
    ("05", "may"),
    ("06", "jun"),
    ("07", "jul"),
    ("08", "aug"),
    ("09", "sep"),
    ("10", "oct"),
    ("11", "nov"),
    ("12", "dec"),
];

/// Month and year extracted from a packed date code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicationDate {
    /// Three-letter BibTeX month abbreviation
    pub month: Option<&'static str>,
    /// Four-digit year
    pub year: Option<String>,
}

/// Extracts month and year from a Papers2 packed date code.
///
/// `99200406011200000000222000` is June 2004: the year sits at bytes 2..6 and
/// the month at bytes 6..8. A slot that is missing or malformed is simply
/// absent from the result.
///
/// # Examples
///
/// ```
/// use papers_bibtex::normalize_date;
///
/// let date = normalize_date("99200406011200000000222000");
/// assert_eq!(date.month, Some("jun"));
/// assert_eq!(date.year.as_deref(), Some("2004"));
/// ```
pub fn normalize_date(raw: &str) -> PublicationDate {
    let month = raw.get(MONTH_SLOT).and_then(|slot| {
        MONTHS
            .iter()
            .find(|(digits, _)| *digits == slot)
            .map(|(_, abbrev)| *abbrev)
    });

    let year = raw
        .get(YEAR_SLOT)
        .filter(|slot| slot.bytes().all(|b| b.is_ascii_digit()))
        .map(str::to_string);

    PublicationDate { month, year }
}

/// One author candidate: its name parts, and whether a comma (rather than the
/// start of the string or an `and`) came right before it.
struct NameChunk<'a> {
    parts: Vec<&'a str>,
    after_comma: bool,
}

fn name_chunks(raw: &str) -> Vec<NameChunk<'_>> {
    let mut chunks = Vec::new();

    for (index, piece) in raw.split(',').enumerate() {
        let mut after_comma = index > 0;
        let mut parts = Vec::new();

        for word in piece.split_whitespace() {
            if word == "and" {
                if !parts.is_empty() {
                    chunks.push(NameChunk {
                        parts: std::mem::take(&mut parts),
                        after_comma,
                    });
                }
                after_comma = false;
                continue;
            }
            parts.push(word);
        }

        if !parts.is_empty() {
            chunks.push(NameChunk { parts, after_comma });
        }
    }

    chunks
}

/// Last name part first: `["Jane", "Q", "Smith"]` becomes `Smith, Jane Q`.
fn surname_first(parts: &[&str]) -> String {
    match parts.split_last() {
        Some((surname, given)) if !given.is_empty() => {
            format!("{}, {}", surname, given.join(" "))
        }
        Some((surname, _)) => surname.to_string(),
        None => String::new(),
    }
}

/// Rewrites a Papers2 author string as a BibTeX author list.
///
/// Authors are separated by commas and `and` tokens. Each author's last
/// whitespace-separated word is taken as the surname, so `Nick Proudfoot`
/// becomes `Proudfoot, Nick`. A single word directly followed by a comma is
/// read as an author already written surname-first (`Proudfoot, Nick` is
/// kept as is).
///
/// This is a heuristic: multi-word surnames lose everything but their last
/// word to the given names (`Jan van der Berg` becomes `Berg, Jan van der`).
/// A single-word author is written as the bare name (`Plato`), with no
/// trailing `, ` for an empty given name.
///
/// # Examples
///
/// ```
/// use papers_bibtex::normalize_authors;
///
/// assert_eq!(
///     normalize_authors("Nick Proudfoot and Jane Q Smith"),
///     "Proudfoot, Nick and Smith, Jane Q"
/// );
/// ```
pub fn normalize_authors(raw: &str) -> String {
    let mut chunks = name_chunks(raw).into_iter().peekable();
    let mut authors = Vec::new();

    while let Some(chunk) = chunks.next() {
        if let [surname] = chunk.parts.as_slice() {
            if let Some(given) = chunks.next_if(|next| next.after_comma) {
                authors.push(format!("{}, {}", surname, given.parts.join(" ")));
                continue;
            }
        }
        authors.push(surname_first(&chunk.parts));
    }

    authors.join(" and ")
}
