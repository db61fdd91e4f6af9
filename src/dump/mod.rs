// sqltool/src/dump/mod.rs
pub mod file_name;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::connection::ConnectionSpec;
use crate::driver::SqlDriver;
use crate::tables::{RawTableRequest, TableSelection};
use crate::utils::shell::escape_arg;

pub use file_name::{BackupLocator, ResultFile, TempDirLocator, dump_file_path};

const GZIP_SUFFIX: &str = ".gz";

/// One dump invocation as configured by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DumpRequest {
    #[serde(default)]
    pub result_file: ResultFile,
    #[serde(default)]
    pub gzip: bool,
    #[serde(default)]
    pub tables: RawTableRequest,
}

/// A dump command ready for the shell, plus the file it writes (if not stdout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpCommand {
    pub command: String,
    pub output_file: Option<PathBuf>,
}

/// Builds the shell command for a dump. Nothing is executed here.
///
/// With `gzip` the driver output is piped through `gzip -f` and `.gz` is appended to the
/// output file name before redirection. The command still exits with the dump's status.
pub fn build_dump_command(
    driver: &dyn SqlDriver,
    spec: &ConnectionSpec,
    selection: &TableSelection,
    gzip: bool,
    output_file: Option<&Path>,
) -> DumpCommand {
    let dump = driver.dump_fragment(spec, selection);

    if !gzip {
        let command = match output_file {
            Some(file) => format!("{} > {}", dump, escape_arg(&file.to_string_lossy())),
            None => dump,
        };
        return DumpCommand {
            command,
            output_file: output_file.map(Path::to_path_buf),
        };
    }

    let output_file = output_file.map(|file| {
        let mut with_suffix = file.as_os_str().to_os_string();
        with_suffix.push(GZIP_SUFFIX);
        PathBuf::from(with_suffix)
    });
    let sink = match &output_file {
        Some(file) => format!("> {}", escape_arg(&file.to_string_lossy())),
        None => ">&4".to_string(),
    };

    DumpCommand {
        command: gzip_pipeline(&dump, &sink),
        output_file,
    }
}

// A plain `sh` pipeline exits with gzip's status. The dump's own status is passed back
// on fd 3 while gzip writes through the original stdout (fd 4) or into the file.
fn gzip_pipeline(dump: &str, sink: &str) -> String {
    format!(
        "{{ status=$( {{ {{ ({dump}); echo $? >&3; }} | gzip -f {sink}; }} 3>&1 ) || exit; \
         exit \"${{status:-1}}\"; }} 4>&1"
    )
}
