// sqltool/src/driver/mod.rs
#[cfg(test)]
pub(crate) mod mock;

use std::collections::HashMap;

use tracing::debug;

use crate::connection::ConnectionSpec;
use crate::errors::{AppError, Result};
use crate::tables::{TableCatalog, TableSelection};

/// Backend-specific command syntax for one database engine.
///
/// Every method receives the spec it should target; the session passes an elevated spec
/// for server-level statements.
pub trait SqlDriver {
    /// The client binary, e.g. `psql` or `mysql`.
    fn connect_command(&self, spec: &ConnectionSpec) -> String;

    /// Connection parameters. With `hide_password` the driver should keep the password out
    /// of the process list, e.g. via an options file.
    fn credentials_fragment(&self, spec: &ConnectionSpec, hide_password: bool) -> String;

    /// Flags that suppress column headers and other decoration in query output.
    fn silent_flag_fragment(&self) -> String {
        String::new()
    }

    /// One or more dump statements ready for a shell, parenthesised if there are several.
    ///
    /// `skip` tables are excluded, `structure` tables dumped without data, and a non-empty
    /// `tables` set restricts the dump to exactly those tables.
    fn dump_fragment(&self, spec: &ConnectionSpec, selection: &TableSelection) -> String;

    /// `CREATE DATABASE` for this engine. `quoted` asks for the identifier to be quoted,
    /// which is unsafe in some calling shells.
    fn create_database_statement(&self, name: &str, quoted: bool) -> String;

    fn database_exists(&self, spec: &ConnectionSpec) -> Result<bool>;

    fn list_tables(&self, spec: &ConnectionSpec) -> Result<Vec<String>>;

    /// How an input file is handed to the client.
    fn query_file_operator(&self) -> &str {
        "<"
    }

    /// Default extra text appended to query invocations.
    fn query_extra(&self) -> &str {
        ""
    }

    fn format_query(&self, query: &str) -> String {
        query.to_string()
    }
}

/// The driver's table listing for one connection spec.
pub struct DriverCatalog<'a> {
    pub driver: &'a dyn SqlDriver,
    pub spec: &'a ConnectionSpec,
}

impl TableCatalog for DriverCatalog<'_> {
    fn list_tables(&self) -> Result<Vec<String>> {
        self.driver.list_tables(self.spec).map_err(|e| match e {
            AppError::CatalogUnavailable(_) => e,
            other => AppError::CatalogUnavailable(other.to_string()),
        })
    }
}

/// Driver implementations keyed by the name used in `ConnectionSpec::driver`.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, Box<dyn SqlDriver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: &str, driver: Box<dyn SqlDriver>) -> Self {
        debug!("Registering database driver: {}", name);
        self.drivers.insert(name.to_string(), driver);
        self
    }

    /// Picks the driver declared by `spec`.
    pub fn select(&self, spec: &ConnectionSpec) -> Result<&dyn SqlDriver> {
        self.drivers
            .get(spec.scheme())
            .map(|d| &**d)
            .ok_or_else(|| AppError::UnsupportedDriver(spec.scheme().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockDriver;
    use super::*;

    #[test]
    fn test_registry_selects_by_scheme() -> anyhow::Result<()> {
        let registry = DriverRegistry::new().register("mock", Box::new(MockDriver::default()));
        let spec = ConnectionSpec::from_url("mock://u:p@localhost/site")?;
        let driver = registry.select(&spec)?;
        assert_eq!(driver.connect_command(&spec), "mockdb");

        let other = ConnectionSpec::from_url("oracle://localhost/site")?;
        assert!(matches!(registry.select(&other), Err(AppError::UnsupportedDriver(name)) if name == "oracle"));
        Ok(())
    }

    #[test]
    fn test_driver_catalog_maps_errors_to_catalog_unavailable() {
        let driver = MockDriver {
            tables: None,
            ..Default::default()
        };
        let spec = ConnectionSpec::default();
        let catalog = DriverCatalog { driver: &driver, spec: &spec };
        assert!(matches!(catalog.list_tables(), Err(AppError::CatalogUnavailable(_))));
    }
}
