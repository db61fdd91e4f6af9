// sqltool/src/session.rs
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::connection::{ConnectionSpec, SuperuserCredentials, elevate};
use crate::driver::{DriverCatalog, SqlDriver};
use crate::dump::{BackupLocator, DumpCommand, DumpRequest, build_dump_command, dump_file_path};
use crate::errors::{AppError, Result};
use crate::query::{QueryInput, TablePrefixer, build_query_command, connect_string, prepare_input};
use crate::runner::CommandRunner;
use crate::tables::{RawTableRequest, TableCatalog, TableSelection, resolve};

/// Options that apply to every command a session runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SqlOptions {
    /// Raw text appended to every client invocation, replacing the driver default.
    #[serde(default)]
    pub extra: Option<String>,
    /// Delete a caller-supplied query input file after it ran successfully.
    #[serde(default)]
    pub file_delete: bool,
    /// Apply the host application's table prefix to query text.
    #[serde(default)]
    pub db_prefix: bool,
    #[serde(flatten)]
    pub superuser: SuperuserCredentials,
}

/// Runs dump, query, create and drop operations for one connection.
///
/// Commands are built by the `dump` and `query` modules and executed through the
/// `CommandRunner`; the session itself never mutates its connection spec.
pub struct SqlSession<'a> {
    driver: &'a dyn SqlDriver,
    runner: &'a dyn CommandRunner,
    spec: ConnectionSpec,
    options: SqlOptions,
    prefixer: Option<&'a dyn TablePrefixer>,
}

impl<'a> SqlSession<'a> {
    pub fn new(
        driver: &'a dyn SqlDriver,
        runner: &'a dyn CommandRunner,
        spec: ConnectionSpec,
        options: SqlOptions,
    ) -> Self {
        SqlSession {
            driver,
            runner,
            spec,
            options,
            prefixer: None,
        }
    }

    /// Enables table-prefix rewriting of query text (still gated by `db_prefix`).
    pub fn with_prefixer(mut self, prefixer: &'a dyn TablePrefixer) -> Self {
        self.prefixer = Some(prefixer);
        self
    }

    pub fn spec(&self) -> &ConnectionSpec {
        &self.spec
    }

    pub fn connect(&self, hide_password: bool) -> String {
        connect_string(self.driver, &self.spec, self.options.extra.as_deref(), hide_password)
    }

    /// Resolves skip/structure/tables options against the tables that exist right now.
    pub fn expanded_table_selection(&self, request: &RawTableRequest) -> Result<TableSelection> {
        let catalog = DriverCatalog {
            driver: self.driver,
            spec: &self.spec,
        };
        resolve(request, &catalog)
    }

    /// Builds the dump command for `request` without running it.
    pub fn build_dump(
        &self,
        request: &DumpRequest,
        locator: &dyn BackupLocator,
        now: DateTime<Utc>,
    ) -> Result<DumpCommand> {
        let selection = self.expanded_table_selection(&request.tables)?;
        let file = dump_file_path(&request.result_file, &self.spec.database, now, locator);
        Ok(build_dump_command(
            self.driver,
            &self.spec,
            &selection,
            request.gzip,
            file.as_deref(),
        ))
    }

    /// Dumps the database and returns the file written, or `None` when it went to stdout.
    pub fn dump(&self, request: &DumpRequest, locator: &dyn BackupLocator) -> Result<Option<PathBuf>> {
        self.dump_at(request, locator, Utc::now())
    }

    pub fn dump_at(
        &self,
        request: &DumpRequest,
        locator: &dyn BackupLocator,
        now: DateTime<Utc>,
    ) -> Result<Option<PathBuf>> {
        let DumpCommand { command, output_file } = self.build_dump(request, locator, now)?;

        if let Some(parent) = output_file.as_deref().and_then(Path::parent) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| AppError::DumpFailure {
                    command: command.clone(),
                    message: format!("Failed to create directory {}: {}", parent.display(), e),
                })?;
            }
        }

        match self.runner.run(&command) {
            Ok(output) if output.success() => {}
            Ok(output) => {
                if let Some(file) = &output_file {
                    remove_partial_output(file);
                }
                return Err(AppError::DumpFailure {
                    command,
                    message: output.failure_message(),
                });
            }
            // Nothing ran, so whatever is at the target path was not written by us.
            Err(e) => {
                return Err(AppError::DumpFailure {
                    command,
                    message: e.to_string(),
                });
            }
        }

        if let Some(file) = &output_file {
            info!("Database dump saved to {}", file.display());
        }
        Ok(output_file)
    }

    /// Runs SQL text or a SQL file, optionally redirecting the results to `result_file`.
    pub fn query(&self, input: &QueryInput, result_file: Option<&Path>) -> Result<()> {
        self.query_as(&self.spec, input, result_file)
    }

    fn query_as(&self, spec: &ConnectionSpec, input: &QueryInput, result_file: Option<&Path>) -> Result<()> {
        let prepared = prepare_input(input, self.driver, self.prefixer, self.options.db_prefix)?;
        let query = build_query_command(
            self.driver,
            spec,
            self.options.extra.as_deref(),
            prepared.path(),
            result_file,
        );

        if let Some(sql) = &prepared.query {
            debug!("sql-query: {}", sql);
        }

        match self.runner.run(&query.command) {
            Ok(output) if output.success() => {}
            Ok(output) => {
                return Err(AppError::QueryFailure {
                    command: query.command,
                    message: output.failure_message(),
                });
            }
            Err(e) => {
                return Err(AppError::QueryFailure {
                    command: query.command,
                    message: e.to_string(),
                });
            }
        }

        if self.options.file_delete {
            if let Some(source) = &prepared.source_file {
                match fs::remove_file(source) {
                    Ok(()) => debug!("Deleted query input file {}", source.display()),
                    Err(e) => warn!("Could not delete query input file {}: {}", source.display(), e),
                }
            }
        }
        Ok(())
    }

    /// Creates the session's database using superuser credentials when configured.
    pub fn create_db(&self, quoted: bool) -> Result<()> {
        let database = self.spec.database.clone();
        let sql = self.driver.create_database_statement(&database, quoted);
        let elevated = elevate(&self.spec, &self.options.superuser);

        match self.query_as(&elevated, &QueryInput::Text(sql), None) {
            Ok(()) => {
                info!("Created database {}", database);
                Ok(())
            }
            Err(AppError::QueryFailure { command, message }) => Err(AppError::CreateDatabaseFailure {
                database,
                command: Some(command),
                message,
            }),
            Err(e) => Err(AppError::CreateDatabaseFailure {
                database,
                command: None,
                message: e.to_string(),
            }),
        }
    }

    /// Drops `tables` with a single statement. Nothing is run for an empty list.
    pub fn drop_tables(&self, tables: &[String]) -> Result<()> {
        if tables.is_empty() {
            debug!("No tables to drop in {}", self.spec.database);
            return Ok(());
        }
        let sql = format!("DROP TABLE {}", tables.join(", "));
        self.query(&QueryInput::Text(sql), None)?;
        info!("Dropped {} tables from {}", tables.len(), self.spec.database);
        Ok(())
    }

    /// Empties an existing database or creates a missing one, ready for a restore.
    pub fn drop_or_create(&self) -> Result<()> {
        if self.driver.database_exists(&self.spec)? {
            let catalog = DriverCatalog {
                driver: self.driver,
                spec: &self.spec,
            };
            let tables = catalog.list_tables()?;
            self.drop_tables(&tables)
        } else {
            self.create_db(false)
        }
    }
}

fn remove_partial_output(file: &Path) {
    if file.exists() {
        match fs::remove_file(file) {
            Ok(()) => debug!("Removed partial dump {}", file.display()),
            Err(e) => warn!("Could not remove partial dump {}: {}", file.display(), e),
        }
    }
}
