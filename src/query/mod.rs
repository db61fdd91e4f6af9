// sqltool/src/query/mod.rs
pub mod input;

use std::path::{Path, PathBuf};

use crate::connection::ConnectionSpec;
use crate::driver::SqlDriver;
use crate::utils::shell::{escape_arg, join_fragments};

pub use input::{PreparedInput, QueryInput, TablePrefixer, is_gzip_file, prepare_input};

/// A query command ready for the shell, plus the file results are redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCommand {
    pub command: String,
    pub result_file: Option<PathBuf>,
}

/// Builds the client invocation that feeds `input_file` to the database.
///
/// `extra` overrides the driver's default extra text when set, even to an empty string.
pub fn build_query_command(
    driver: &dyn SqlDriver,
    spec: &ConnectionSpec,
    extra: Option<&str>,
    input_file: &Path,
    result_file: Option<&Path>,
) -> QueryCommand {
    let mut command = join_fragments([
        driver.connect_command(spec),
        driver.credentials_fragment(spec, true),
        driver.silent_flag_fragment(),
        extra.unwrap_or(driver.query_extra()).to_string(),
        driver.query_file_operator().to_string(),
        escape_arg(&input_file.to_string_lossy()),
    ]);

    if let Some(result) = result_file {
        command.push_str(" > ");
        command.push_str(&escape_arg(&result.to_string_lossy()));
    }

    QueryCommand {
        command,
        result_file: result_file.map(Path::to_path_buf),
    }
}

/// Connection string for launching the client interactively.
pub fn connect_string(
    driver: &dyn SqlDriver,
    spec: &ConnectionSpec,
    extra: Option<&str>,
    hide_password: bool,
) -> String {
    join_fragments([
        driver.connect_command(spec),
        driver.credentials_fragment(spec, hide_password),
        extra.unwrap_or(driver.query_extra()).to_string(),
    ])
}
