// sqltool/src/connection/superuser.rs
use serde::Deserialize;

use super::ConnectionSpec;

/// Privileged credentials used when a database has to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SuperuserCredentials {
    #[serde(default, rename = "db_su")]
    pub username: Option<String>,
    #[serde(default, rename = "db_su_pw")]
    pub password: Option<String>,
}

impl SuperuserCredentials {
    fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|pw| !pw.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.username.is_some() || self.password().is_some()
    }
}

/// Derives the connection spec used for server-level statements such as `CREATE DATABASE`.
///
/// The derived spec targets the server rather than a schema, so `database` is cleared.
/// A superuser name without a password drops the password entirely, leaving the client
/// to read it from `.pgpass`, `.my.cnf` or similar. With nothing configured the spec is
/// returned as is.
pub fn elevate(spec: &ConnectionSpec, superuser: &SuperuserCredentials) -> ConnectionSpec {
    if !superuser.is_configured() {
        return spec.clone();
    }

    let mut target = spec.clone();
    target.database = String::new();

    if let Some(name) = &superuser.username {
        target.username = Some(name.clone());
    }

    if let Some(pw) = superuser.password() {
        target.password = Some(pw.to_string());
    } else if superuser.username.is_some() {
        target.password = None;
    }

    target
}
