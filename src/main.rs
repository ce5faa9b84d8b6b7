//! CLI for papers-bibtex - Generate a minimal BibTeX file from \cite keys.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use papers_bibtex::{
    config::{default_rc_path, RcFile},
    expand_patterns, load_rc, lookup, resolve_db_path, scan_file, unresolved_keys,
    write_bibliography, CitationFrequency, PapersLibrary, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Generate a minimal BibTeX file from the \cite{...} keys in your documents,
/// looking the keys up in your Papers2 library
#[derive(Parser)]
#[command(name = "papers-bibtex")]
#[command(version)]
#[command(after_help = "\
Citation syntax: \\cite{key}, \\citet{key}, \\citep{a,b,c}

The library path can also be set in ~/.papersrc:
  [appinfo]
  dbpath = /path/to/Database.papersdb

Examples:
  papers-bibtex paper.tex
  papers-bibtex 'chapters/*.tex' -o refs.bib
  papers-bibtex -v -d ~/Papers2/Database.papersdb paper.tex")]
struct Cli {
    /// Input files, as shell-style glob patterns
    #[arg(required = true)]
    patterns: Vec<String>,

    /// Output BibTeX file (default: stdout)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Overwrite the output file if it already exists
    #[arg(short, long)]
    force: bool,

    /// Path to the Papers2 SQLite database; takes precedence over the dbpath
    /// setting in ~/.papersrc [default: ~/.papersrc setting, or
    /// ~/Library/Papers2/Library.papers2/Database.papersdb]
    #[arg(short, long)]
    dbpath: Option<PathBuf>,

    /// rc file to read the database path from (default: ~/.papersrc)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of citation keys per database query
    #[arg(
        long,
        default_value_t = DEFAULT_BATCH_SIZE as u32,
        value_parser = clap::value_parser!(u32).range(1..=MAX_BATCH_SIZE as i64)
    )]
    batch_size: u32,

    /// What to do with cited keys missing from the library
    #[arg(long, value_enum, default_value_t = UnresolvedPolicy::Ignore)]
    unresolved: UnresolvedPolicy,

    /// Report parsed files and citation counts
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UnresolvedPolicy {
    /// Leave them out of the output silently
    Ignore,
    /// Log a warning for each one and carry on
    Warn,
    /// Abort without writing any output
    Fail,
}

// ---------------------------------------------------------------------------
// AppError — semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10 — invalid input glob pattern
    InputPattern(String),
    /// Exit 11 — database unreachable or query failed
    Database(String),
    /// Exit 12 — rc file unreadable or invalid
    Config(String),
    /// Exit 13 — cited keys missing from the library (with --unresolved fail)
    Unresolved(Vec<String>),
    /// Exit 14 — output file exists or cannot be written
    OutputFile(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputPattern(_) => 10,
            AppError::Database(_) => 11,
            AppError::Config(_) => 12,
            AppError::Unresolved(_) => 13,
            AppError::OutputFile(_) => 14,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputPattern(msg) => {
                write!(f, "{}\n  hint: quote patterns such as 'chapters/*.tex'", msg)
            }
            AppError::Database(msg) => {
                write!(
                    f,
                    "{}\n  hint: pass --dbpath or set dbpath under [appinfo] in ~/.papersrc",
                    msg
                )
            }
            AppError::Config(msg) => write!(f, "{}", msg),
            AppError::Unresolved(keys) => {
                write!(
                    f,
                    "{} citekey(s) not found in the library: {}",
                    keys.len(),
                    keys.join(", ")
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: pass --force to overwrite, or check that the output directory is writable",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "papers_bibtex=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    // 1. Refuse to clobber an existing output file
    if let Some(out) = &cli.out {
        if out.exists() && !cli.force {
            return Err(AppError::OutputFile(format!(
                "'{}': output file already exists",
                out.display()
            )));
        }
    }

    // 2. Locate and open the library
    let rc = load_config(cli.config.as_deref())?;
    let db_path = resolve_db_path(cli.dbpath.as_deref(), &rc);
    let library = PapersLibrary::open(&db_path).map_err(|e| AppError::Database(e.to_string()))?;
    tracing::debug!(path = %db_path.display(), "opened Papers2 library");

    // Diagnostics go wherever the BibTeX does not
    let mut report: Box<dyn Write> = if cli.out.is_some() {
        Box::new(io::stdout())
    } else {
        Box::new(io::stderr())
    };

    // 3. Collect citation keys from every input file
    let frequency = collect_citations(&cli.patterns, cli.verbose, &mut report)?;

    // 4. Look the keys up
    let records = lookup(&library, &frequency.keys(), cli.batch_size as usize)
        .map_err(|e| AppError::Database(e.to_string()))?;

    let unresolved = unresolved_keys(&frequency, &records);
    if cli.unresolved == UnresolvedPolicy::Warn {
        for key in &unresolved {
            tracing::warn!(citekey = %key, "citekey not found in library");
        }
    }
    let abort = cli.unresolved == UnresolvedPolicy::Fail && !unresolved.is_empty();

    // 5. Write the BibTeX
    if !abort {
        let written = match &cli.out {
            Some(path) => {
                let file = create_output(path, cli.force)?;
                let mut writer = BufWriter::new(file);
                write_bibliography(&mut writer, records.values())
                    .map_err(|e| AppError::OutputFile(format!("'{}': {}", path.display(), e)))?
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                write_bibliography(&mut handle, records.values())
                    .map_err(|e| AppError::OutputFile(format!("stdout: {}", e)))?
            }
        };
        if let (Some(path), true) = (&cli.out, cli.verbose) {
            writeln!(report, "Wrote {} entries to {}", written, path.display())
                .map_err(|e| AppError::OutputFile(format!("report: {}", e)))?;
        }
    }

    // 6. Report
    if cli.verbose {
        write_summary(&mut report, &frequency, &unresolved)
            .map_err(|e| AppError::OutputFile(format!("report: {}", e)))?;
    }

    if abort {
        return Err(AppError::Unresolved(
            unresolved.into_iter().map(str::to_string).collect(),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Loads the rc file, falling back to an empty configuration when there is no
/// home directory to look in.
fn load_config(explicit: Option<&Path>) -> Result<RcFile, AppError> {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(default_rc_path) else {
        return Ok(RcFile::default());
    };
    load_rc(&path).map_err(|e| AppError::Config(format!("'{}': {}", path.display(), e)))
}

/// Expands the input patterns and scans every regular file they match.
///
/// Inputs that cannot be read are skipped and, in verbose mode, reported.
fn collect_citations(
    patterns: &[String],
    verbose: bool,
    report: &mut dyn Write,
) -> Result<CitationFrequency, AppError> {
    let inputs = expand_patterns(patterns).map_err(|e| AppError::InputPattern(e.to_string()))?;
    let report_error = |e: io::Error| AppError::OutputFile(format!("report: {}", e));

    if verbose {
        let names: Vec<String> = inputs
            .paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        writeln!(report, "Parsing files: {}", names.join(",")).map_err(report_error)?;
        for pattern in &inputs.unmatched {
            writeln!(report, "No files match {}", pattern).map_err(report_error)?;
        }
    }

    let mut frequency = CitationFrequency::new();
    for path in &inputs.paths {
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "skipping non-file input");
            if verbose {
                writeln!(report, "Can't load file {}", path.display()).map_err(report_error)?;
            }
            continue;
        }

        let mut file_frequency = CitationFrequency::new();
        match scan_file(path, &mut file_frequency) {
            Ok(lines) => {
                tracing::debug!(path = %path.display(), lines, keys = file_frequency.len(), "scanned input");
                frequency.merge(file_frequency);
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable input");
                if verbose {
                    writeln!(report, "Can't load file {}: {}", path.display(), e)
                        .map_err(report_error)?;
                }
            }
        }
    }

    Ok(frequency)
}

/// Creates the output file, refusing to replace an existing one unless forced.
fn create_output(path: &Path, force: bool) -> Result<File, AppError> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    options.open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            AppError::OutputFile(format!("'{}': output file already exists", path.display()))
        } else {
            AppError::OutputFile(format!("'{}': {}", path.display(), e))
        }
    })
}

fn write_summary(
    report: &mut dyn Write,
    frequency: &CitationFrequency,
    unresolved: &[&str],
) -> io::Result<()> {
    writeln!(report, "=== Citekeys Used ===")?;
    for (key, count) in frequency {
        writeln!(report, "{} : {}", key, count)?;
    }

    if !unresolved.is_empty() {
        writeln!(report, "=== Citekeys Not Found ===")?;
        for key in unresolved {
            writeln!(report, "{}", key)?;
        }
    }

    if frequency.empty_tokens() > 0 {
        writeln!(report, "Ignored {} empty citekey(s)", frequency.empty_tokens())?;
    }

    report.flush()
}
