// sqltool/src/query/input.rs
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tempfile::{Builder as TempFileBuilder, TempPath};
use tracing::debug;

use crate::driver::SqlDriver;
use crate::errors::{AppError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// What a query runs: literal SQL or a file of SQL, optionally gzipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryInput {
    Text(String),
    File(PathBuf),
}

/// Rewrites `{table}` style references with the host application's table prefix.
pub trait TablePrefixer {
    fn prefix_tables(&self, query: &str) -> String;
}

/// The file handed to the client. Transient files are removed when this is dropped.
#[derive(Debug)]
pub struct PreparedInput {
    path: PathBuf,
    transient: Option<TempPath>,
    /// Caller-supplied file the input came from, if any.
    pub source_file: Option<PathBuf>,
    /// SQL text when the input was built from a string.
    pub query: Option<String>,
}

impl PreparedInput {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_transient(&self) -> bool {
        self.transient.is_some()
    }
}

/// Whether `path` starts with the gzip magic bytes.
pub fn is_gzip_file(path: &Path) -> io::Result<bool> {
    let mut header = [0u8; 2];
    let mut file = File::open(path)?;
    let mut read = 0;
    while read < header.len() {
        match file.read(&mut header[read..])? {
            0 => return Ok(false),
            n => read += n,
        }
    }
    Ok(header == GZIP_MAGIC)
}

fn transient_file() -> io::Result<tempfile::NamedTempFile> {
    TempFileBuilder::new().prefix("sqltool_query_").suffix(".sql").tempfile()
}

fn decompress(path: &Path) -> Result<TempPath> {
    let to_failure = |source: io::Error| AppError::DecompressFailure {
        path: path.to_path_buf(),
        source,
    };

    let compressed = File::open(path).map_err(to_failure)?;
    let mut decoder = GzDecoder::new(compressed);
    let mut target = transient_file().map_err(to_failure)?;
    io::copy(&mut decoder, &mut target).map_err(to_failure)?;
    target.flush().map_err(to_failure)?;

    debug!("Decompressed {} to {}", path.display(), target.path().display());
    Ok(target.into_temp_path())
}

/// Turns a query input into a file the client can read.
///
/// Gzipped files are expanded into a transient copy, leaving the original untouched. Query
/// text is run through the table prefixer (when `db_prefix` is on and one is available)
/// and the driver's formatter, then written to a transient file.
pub fn prepare_input(
    input: &QueryInput,
    driver: &dyn SqlDriver,
    prefixer: Option<&dyn TablePrefixer>,
    db_prefix: bool,
) -> Result<PreparedInput> {
    match input {
        QueryInput::File(path) => {
            if is_gzip_file(path)? {
                let expanded = decompress(path)?;
                Ok(PreparedInput {
                    path: expanded.to_path_buf(),
                    transient: Some(expanded),
                    source_file: Some(path.clone()),
                    query: None,
                })
            } else {
                Ok(PreparedInput {
                    path: path.clone(),
                    transient: None,
                    source_file: Some(path.clone()),
                    query: None,
                })
            }
        }
        QueryInput::Text(query) => {
            let query = match prefixer {
                Some(prefixer) if db_prefix => prefixer.prefix_tables(query),
                _ => query.clone(),
            };
            let query = driver.format_query(&query);

            let mut file = transient_file()?;
            file.write_all(query.as_bytes())?;
            file.flush()?;
            let transient = file.into_temp_path();

            Ok(PreparedInput {
                path: transient.to_path_buf(),
                transient: Some(transient),
                source_file: None,
                query: Some(query),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockDriver;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::fs;

    struct BracePrefixer;

    impl TablePrefixer for BracePrefixer {
        fn prefix_tables(&self, query: &str) -> String {
            query.replace('{', "d7_").replace('}', "")
        }
    }

    #[test]
    fn test_text_input_is_written_and_cleaned_up() -> anyhow::Result<()> {
        let input = QueryInput::Text("SELECT 1;".to_string());
        let prepared = prepare_input(&input, &MockDriver::default(), None, false)?;
        let path = prepared.path().to_path_buf();

        assert!(prepared.is_transient());
        assert_eq!(fs::read_to_string(&path)?, "SELECT 1;");
        assert_eq!(prepared.query.as_deref(), Some("SELECT 1;"));

        drop(prepared);
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_prefix_applied_only_when_enabled() -> anyhow::Result<()> {
        let input = QueryInput::Text("SELECT * FROM {users}".to_string());
        let driver = MockDriver::default();

        let prefixed = prepare_input(&input, &driver, Some(&BracePrefixer), true)?;
        assert_eq!(prefixed.query.as_deref(), Some("SELECT * FROM d7_users"));

        let untouched = prepare_input(&input, &driver, Some(&BracePrefixer), false)?;
        assert_eq!(untouched.query.as_deref(), Some("SELECT * FROM {users}"));

        let no_prefixer = prepare_input(&input, &driver, None, true)?;
        assert_eq!(no_prefixer.query.as_deref(), Some("SELECT * FROM {users}"));
        Ok(())
    }

    #[test]
    fn test_plain_file_is_used_in_place() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let sql = dir.path().join("restore.sql");
        fs::write(&sql, "CREATE TABLE t (id int);")?;

        let prepared = prepare_input(&QueryInput::File(sql.clone()), &MockDriver::default(), None, false)?;
        assert_eq!(prepared.path(), sql.as_path());
        assert!(!prepared.is_transient());
        assert_eq!(prepared.source_file.as_deref(), Some(sql.as_path()));
        Ok(())
    }

    #[test]
    fn test_gzip_file_is_expanded_to_transient_copy() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let gz = dir.path().join("restore.sql.gz");
        let mut encoder = GzEncoder::new(fs::File::create(&gz)?, Compression::default());
        encoder.write_all(b"INSERT INTO t VALUES (1);")?;
        encoder.finish()?;

        assert!(is_gzip_file(&gz)?);
        let prepared = prepare_input(&QueryInput::File(gz.clone()), &MockDriver::default(), None, false)?;
        let expanded = prepared.path().to_path_buf();

        assert!(prepared.is_transient());
        assert_eq!(fs::read_to_string(&expanded)?, "INSERT INTO t VALUES (1);");
        assert!(gz.exists());

        drop(prepared);
        assert!(!expanded.exists());
        Ok(())
    }

    #[test]
    fn test_corrupt_gzip_is_decompress_failure() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let gz = dir.path().join("broken.sql.gz");
        fs::write(&gz, [0x1f, 0x8b, 0x00, 0x01, 0x02])?;

        let err = prepare_input(&QueryInput::File(gz), &MockDriver::default(), None, false).unwrap_err();
        assert!(matches!(err, AppError::DecompressFailure { .. }));
        Ok(())
    }

    #[test]
    fn test_short_file_is_not_gzip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let short = dir.path().join("one.sql");
        fs::write(&short, "x")?;
        assert!(!is_gzip_file(&short)?);
        Ok(())
    }
}
