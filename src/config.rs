//! User configuration.
//!
//! The `~/.papersrc` rc file can point the tool at a Papers2 library living
//! somewhere other than the default location:
//!
//! ```ini
//! [appinfo]
//! dbpath = ~/Dropbox/Papers2/Library.papers2/Database.papersdb
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

/// Where Papers2 keeps its library unless told otherwise.
pub const DEFAULT_DB_PATH: &str = "~/Library/Papers2/Library.papers2/Database.papersdb";

/// Name of the rc file in the home directory.
pub const RC_FILE_NAME: &str = ".papersrc";

/// Errors that can occur when loading the rc file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid rc file: {0}")]
    ParseError(#[from] ini::ParseError),
}

/// Contents of the rc file.
#[derive(Debug, Default, PartialEq)]
pub struct RcFile {
    pub appinfo: AppInfo,
}

/// The `[appinfo]` section.
#[derive(Debug, Default, PartialEq)]
pub struct AppInfo {
    pub dbpath: Option<PathBuf>,
}

/// Default rc file location, if a home directory is known.
pub fn default_rc_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(RC_FILE_NAME))
}

/// Loads the rc file at `path`.
///
/// A missing file is not an error and yields an empty configuration.
pub fn load_rc(path: &Path) -> Result<RcFile, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RcFile::default()),
        Err(e) => return Err(e.into()),
    };
    parse_rc(&content)
}

/// Parses INI-style rc content. Values may be bare or quoted; backslashes
/// are kept literally.
fn parse_rc(content: &str) -> Result<RcFile, ConfigError> {
    let ini = Ini::load_from_str_noescape(content)?;
    let dbpath = ini
        .section(Some("appinfo"))
        .and_then(|section| section.get("dbpath"))
        .map(|value| value.trim().trim_matches(|c: char| c == '"' || c == '\''))
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);

    Ok(RcFile {
        appinfo: AppInfo { dbpath },
    })
}

/// Picks the database path: an explicit path (`--dbpath`) wins over the rc
/// file, which wins over [`DEFAULT_DB_PATH`]. A leading `~` is expanded.
pub fn resolve_db_path(explicit: Option<&Path>, rc: &RcFile) -> PathBuf {
    let chosen = explicit
        .map(Path::to_path_buf)
        .or_else(|| rc.appinfo.dbpath.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
    expand_home(&chosen)
}

/// Replaces a leading `~` component with the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
