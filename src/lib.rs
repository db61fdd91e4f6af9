//! Table selection and command assembly for database dump/query tooling.
//!
//! Resolves skip/structure/tables options against the live table list, names dump files,
//! derives superuser connection specs, and builds the shell commands that a database
//! client runs. Engine-specific syntax is supplied by a [`driver::SqlDriver`]
//! implementation; execution goes through a [`runner::CommandRunner`].

pub mod config;
pub mod connection;
pub mod driver;
pub mod dump;
pub mod errors;
pub mod query;
pub mod runner;
pub mod session;
pub mod tables;
pub mod utils;

pub use connection::{ConnectionSpec, SuperuserCredentials, elevate};
pub use driver::{DriverRegistry, SqlDriver};
pub use dump::{DumpCommand, DumpRequest, ResultFile};
pub use errors::{AppError, Result};
pub use query::{QueryCommand, QueryInput};
pub use runner::{CommandRunner, ShellOutput, SystemShell};
pub use session::{SqlOptions, SqlSession};
pub use tables::{RawTableRequest, TableCatalog, TableSelection};
