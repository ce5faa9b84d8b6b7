//! Input document discovery and scanning.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cite::CitationFrequency;

/// Errors that can occur when expanding input patterns.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Result of expanding the input patterns.
#[derive(Debug, Default, PartialEq)]
pub struct ExpandedInputs {
    /// Every matched path, deduplicated and sorted
    pub paths: Vec<PathBuf>,
    /// Patterns that matched nothing
    pub unmatched: Vec<String>,
}

/// Expands shell-style glob patterns into a deduplicated, sorted path list.
///
/// Matches are not checked for being regular files; that is left to the
/// caller so it can report them.
pub fn expand_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<ExpandedInputs, InputError> {
    let mut paths = BTreeSet::new();
    let mut unmatched = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let entries = glob::glob(pattern).map_err(|source| InputError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut matched = false;
        for entry in entries {
            match entry {
                Ok(path) => {
                    matched = true;
                    paths.insert(path);
                }
                Err(e) => tracing::debug!(error = %e, "skipping unreadable glob match"),
            }
        }

        if !matched {
            unmatched.push(pattern.to_string());
        }
    }

    Ok(ExpandedInputs {
        paths: paths.into_iter().collect(),
        unmatched,
    })
}

/// Feeds `reader` to `frequency` one line at a time. Returns the line count.
///
/// Lines are decoded as UTF-8, replacing invalid sequences.
pub fn scan_reader<R: BufRead>(reader: R, frequency: &mut CitationFrequency) -> io::Result<usize> {
    let mut lines = 0;
    for line in reader.split(b'\n') {
        let line = line?;
        frequency.extract(&String::from_utf8_lossy(&line));
        lines += 1;
    }
    Ok(lines)
}

/// Scans the file at `path` for citations.
pub fn scan_file(path: &Path, frequency: &mut CitationFrequency) -> io::Result<usize> {
    let file = File::open(path)?;
    scan_reader(BufReader::new(file), frequency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn dir_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    fn pattern(dir: &TempDir, glob: &str) -> String {
        dir.path().join(glob).to_string_lossy().into_owned()
    }

    #[test]
    fn test_expand_patterns_dedupes_and_sorts() {
        // Given: overlapping patterns
        let dir = dir_with(&[("b.tex", ""), ("a.tex", ""), ("notes.txt", "")]);
        let patterns = vec![pattern(&dir, "*.tex"), pattern(&dir, "a.*")];

        // When: we expand them
        let inputs = expand_patterns(&patterns).unwrap();

        // Then: each file appears once, sorted
        let names: Vec<_> = inputs
            .paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.tex", "b.tex"]);
        assert!(inputs.unmatched.is_empty());
    }

    #[test]
    fn test_expand_patterns_reports_unmatched() {
        let dir = dir_with(&[("a.tex", "")]);
        let missing = pattern(&dir, "missing.tex");

        let inputs = expand_patterns(&[missing.clone()]).unwrap();

        assert!(inputs.paths.is_empty());
        assert_eq!(inputs.unmatched, vec![missing]);
    }

    #[test]
    fn test_expand_patterns_includes_directories() {
        // Directories are returned; the caller decides to skip them
        let dir = dir_with(&[]);
        fs::create_dir(dir.path().join("chapters")).unwrap();

        let inputs = expand_patterns(&[pattern(&dir, "*")]).unwrap();

        assert_eq!(inputs.paths, vec![dir.path().join("chapters")]);
    }

    #[test]
    fn test_expand_patterns_invalid_pattern() {
        let result = expand_patterns(&["[unclosed"]);

        assert!(matches!(result, Err(InputError::Pattern { .. })));
    }

    #[test]
    fn test_scan_reader_counts_lines_and_citations() {
        let text = "Intro \\cite{a}.\nNothing here\n\\citep{a,b}";
        let mut freq = CitationFrequency::new();

        let lines = scan_reader(Cursor::new(text), &mut freq).unwrap();

        assert_eq!(lines, 3);
        assert_eq!(freq.count("a"), 2);
        assert_eq!(freq.count("b"), 1);
    }

    #[test]
    fn test_scan_reader_tolerates_invalid_utf8() {
        let bytes: &[u8] = b"\xff\xfe \\cite{key}\n";
        let mut freq = CitationFrequency::new();

        scan_reader(Cursor::new(bytes), &mut freq).unwrap();

        assert_eq!(freq.count("key"), 1);
    }

    #[test]
    fn test_scan_file() {
        let dir = dir_with(&[("paper.tex", "\\cite{Proudfoot:2004gs}\n")]);
        let mut freq = CitationFrequency::new();

        scan_file(&dir.path().join("paper.tex"), &mut freq).unwrap();

        assert_eq!(freq.keys(), vec!["Proudfoot:2004gs"]);
    }

    #[test]
    fn test_scan_file_missing() {
        let mut freq = CitationFrequency::new();

        assert!(scan_file(Path::new("/nonexistent/paper.tex"), &mut freq).is_err());
    }
}
