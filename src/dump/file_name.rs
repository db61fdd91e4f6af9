// sqltool/src/dump/file_name.rs
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const DATABASE_TOKEN: &str = "@DATABASE";
pub const DATE_TOKEN: &str = "@DATE";
const AUTO_FILE_NAME: &str = "@DATABASE_@DATE.sql";
const DATE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Where a dump should be written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawResultFile")]
pub enum ResultFile {
    /// Write to standard output.
    #[default]
    Stdout,
    /// Generate `<backup dir>/@DATABASE_@DATE.sql`.
    Auto,
    /// A path template that may contain `@DATABASE` and `@DATE`.
    Path(String),
}

// `true` and "auto" both request a generated name, `false` and "" mean stdout.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawResultFile {
    Flag(Option<bool>),
    Path(String),
}

impl From<RawResultFile> for ResultFile {
    fn from(raw: RawResultFile) -> Self {
        match raw {
            RawResultFile::Flag(Some(true)) => ResultFile::Auto,
            RawResultFile::Flag(_) => ResultFile::Stdout,
            RawResultFile::Path(p) if p == "auto" => ResultFile::Auto,
            RawResultFile::Path(p) if p.trim().is_empty() => ResultFile::Stdout,
            RawResultFile::Path(p) => ResultFile::Path(p),
        }
    }
}

/// Supplies the directory auto-named dumps are placed in.
pub trait BackupLocator {
    fn backup_dir(&self, database: &str) -> Option<PathBuf>;
}

/// Always falls back to the system temp directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct TempDirLocator;

impl BackupLocator for TempDirLocator {
    fn backup_dir(&self, _database: &str) -> Option<PathBuf> {
        None
    }
}

/// A fixed backup directory, e.g. from configuration.
impl BackupLocator for PathBuf {
    fn backup_dir(&self, _database: &str) -> Option<PathBuf> {
        Some(self.clone())
    }
}

/// Replaces `@DATABASE` and `@DATE` in a path template.
pub fn apply_template(template: &str, database: &str, now: DateTime<Utc>) -> String {
    template
        .replace(DATABASE_TOKEN, database)
        .replace(DATE_TOKEN, &now.format(DATE_FORMAT).to_string())
}

/// Works out the file a dump of `database` should be written to, or `None` for stdout.
///
/// Only string work happens here; the backup directory is not created or checked.
pub fn dump_file_path(
    requested: &ResultFile,
    database: &str,
    now: DateTime<Utc>,
    locator: &dyn BackupLocator,
) -> Option<PathBuf> {
    let template = match requested {
        ResultFile::Stdout => return None,
        ResultFile::Auto => {
            let dir = locator
                .backup_dir(database)
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(std::env::temp_dir);
            dir.join(AUTO_FILE_NAME).to_string_lossy().into_owned()
        }
        ResultFile::Path(path) => path.clone(),
    };
    Some(PathBuf::from(apply_template(&template, database, now)))
}
