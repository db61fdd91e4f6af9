// sqltool/src/tables/mod.rs
pub(crate) mod resolver;

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::errors::Result;

pub use resolver::{expand_and_filter_tables, expand_wildcard_tables, raw_table_list, resolve};

/// Source of the table names that currently exist in the connected database.
pub trait TableCatalog {
    fn list_tables(&self) -> Result<Vec<String>>;
}

impl TableCatalog for Vec<String> {
    fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.clone())
    }
}

/// The three buckets a table can be placed in for a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TablePurpose {
    /// Left out of the dump entirely.
    Skip,
    /// Dumped as DDL only.
    Structure,
    /// Dumped with structure and data.
    Tables,
}

impl TablePurpose {
    pub const ALL: [TablePurpose; 3] = [
        TablePurpose::Skip,
        TablePurpose::Structure,
        TablePurpose::Tables,
    ];

    /// Name of the keyed option, e.g. `skip-tables`. The key selector and the flat list
    /// use the same name with a `-key` / `-list` suffix.
    pub fn option_name(self) -> &'static str {
        match self {
            TablePurpose::Skip => "skip-tables",
            TablePurpose::Structure => "structure-tables",
            TablePurpose::Tables => "tables",
        }
    }
}

/// Raw configuration for one purpose, before any catalog lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Comma-separated candidate keys, checked in order.
    pub key: Option<String>,
    /// Key to list of table names or `*` patterns.
    pub keyed: BTreeMap<String, Vec<String>>,
    /// Comma-separated fallback list. `Some("")` means "configured empty".
    pub list: Option<String>,
}

/// Unresolved skip/structure/tables configuration as it comes out of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTableOptionsJson")]
pub struct RawTableRequest {
    pub skip: TableOptions,
    pub structure: TableOptions,
    pub tables: TableOptions,
}

impl RawTableRequest {
    pub fn options(&self, purpose: TablePurpose) -> &TableOptions {
        match purpose {
            TablePurpose::Skip => &self.skip,
            TablePurpose::Structure => &self.structure,
            TablePurpose::Tables => &self.tables,
        }
    }
}

// Mirrors the option names used on the command line and in config files.
#[derive(Deserialize)]
struct RawTableOptionsJson {
    #[serde(default, rename = "skip-tables-key")]
    skip_key: Option<String>,
    #[serde(default, rename = "skip-tables")]
    skip: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, rename = "skip-tables-list")]
    skip_list: Option<String>,
    #[serde(default, rename = "structure-tables-key")]
    structure_key: Option<String>,
    #[serde(default, rename = "structure-tables")]
    structure: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, rename = "structure-tables-list")]
    structure_list: Option<String>,
    #[serde(default, rename = "tables-key")]
    tables_key: Option<String>,
    #[serde(default)]
    tables: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, rename = "tables-list")]
    tables_list: Option<String>,
}

impl From<RawTableOptionsJson> for RawTableRequest {
    fn from(raw: RawTableOptionsJson) -> Self {
        RawTableRequest {
            skip: TableOptions {
                key: raw.skip_key,
                keyed: raw.skip.unwrap_or_default(),
                list: raw.skip_list,
            },
            structure: TableOptions {
                key: raw.structure_key,
                keyed: raw.structure.unwrap_or_default(),
                list: raw.structure_list,
            },
            tables: TableOptions {
                key: raw.tables_key,
                keyed: raw.tables.unwrap_or_default(),
                list: raw.tables_list,
            },
        }
    }
}

/// Concrete, existing table names per purpose, each set sorted and free of duplicates.
///
/// A table may appear in more than one set. By convention a non-empty `tables` set takes
/// precedence over `skip` and `structure`; drivers apply that when building dumps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSelection {
    pub skip: BTreeSet<String>,
    pub structure: BTreeSet<String>,
    pub tables: BTreeSet<String>,
}

impl TableSelection {
    pub fn get(&self, purpose: TablePurpose) -> &BTreeSet<String> {
        match purpose {
            TablePurpose::Skip => &self.skip,
            TablePurpose::Structure => &self.structure,
            TablePurpose::Tables => &self.tables,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.skip.is_empty() && self.structure.is_empty() && self.tables.is_empty()
    }
}
