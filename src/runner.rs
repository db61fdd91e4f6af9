// sqltool/src/runner.rs
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::utils::find_executable;

/// What came back from running one shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stderr: String,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Short description of a failed run for error messages.
    pub fn failure_message(&self) -> String {
        let status = match self.code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        };
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, stderr)
        }
    }
}

/// Executes shell command strings synchronously.
pub trait CommandRunner {
    fn run(&self, command: &str) -> std::io::Result<ShellOutput>;
}

/// Runs commands through `sh -c`, passing stdout through to this process and capturing
/// stderr.
#[derive(Debug, Clone)]
pub struct SystemShell {
    shell: PathBuf,
}

impl SystemShell {
    pub fn new() -> anyhow::Result<Self> {
        Ok(SystemShell {
            shell: find_executable("sh")?,
        })
    }
}

impl CommandRunner for SystemShell {
    fn run(&self, command: &str) -> std::io::Result<ShellOutput> {
        debug!("Running: {}", command);
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()?;

        Ok(ShellOutput {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
