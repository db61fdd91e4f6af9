// Test double with predictable command syntax.
use crate::connection::ConnectionSpec;
use crate::errors::{AppError, Result};
use crate::tables::TableSelection;
use crate::utils::shell::join_fragments;

use super::SqlDriver;

#[derive(Debug, Clone)]
pub(crate) struct MockDriver {
    /// `None` makes table listing fail.
    pub tables: Option<Vec<String>>,
    pub exists: bool,
}

impl Default for MockDriver {
    fn default() -> Self {
        MockDriver {
            tables: Some(vec!["cache".to_string(), "node".to_string(), "users".to_string()]),
            exists: true,
        }
    }
}

fn csv(tables: &std::collections::BTreeSet<String>) -> String {
    tables.iter().cloned().collect::<Vec<_>>().join(",")
}

impl SqlDriver for MockDriver {
    fn connect_command(&self, _spec: &ConnectionSpec) -> String {
        "mockdb".to_string()
    }

    fn credentials_fragment(&self, spec: &ConnectionSpec, hide_password: bool) -> String {
        let user = spec.username.as_deref().map(|u| format!("--user={}", u));
        let password = match (&spec.password, hide_password) {
            (Some(_), true) => Some("--password-file".to_string()),
            (Some(pw), false) => Some(format!("--password={}", pw)),
            (None, _) => None,
        };
        let database = Some(&spec.database)
            .filter(|d| !d.is_empty())
            .map(|d| format!("--database={}", d));
        join_fragments([user, password, database].into_iter().flatten())
    }

    fn silent_flag_fragment(&self) -> String {
        "--silent".to_string()
    }

    fn dump_fragment(&self, spec: &ConnectionSpec, selection: &TableSelection) -> String {
        let mut parts = vec!["mockdump".to_string(), self.credentials_fragment(spec, true)];
        if !selection.tables.is_empty() {
            parts.push(format!("--tables={}", csv(&selection.tables)));
        } else {
            if !selection.skip.is_empty() {
                parts.push(format!("--skip={}", csv(&selection.skip)));
            }
            if !selection.structure.is_empty() {
                parts.push(format!("--structure={}", csv(&selection.structure)));
            }
        }
        join_fragments(parts)
    }

    fn create_database_statement(&self, name: &str, quoted: bool) -> String {
        if quoted {
            format!("CREATE DATABASE \"{}\"", name)
        } else {
            format!("CREATE DATABASE {}", name)
        }
    }

    fn database_exists(&self, _spec: &ConnectionSpec) -> Result<bool> {
        Ok(self.exists)
    }

    fn list_tables(&self, _spec: &ConnectionSpec) -> Result<Vec<String>> {
        self.tables
            .clone()
            .ok_or_else(|| AppError::Config("mock catalog offline".to_string()))
    }
}
