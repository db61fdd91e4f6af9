// sqltool/src/tables/resolver.rs
use std::collections::{BTreeSet, HashSet};

use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::{RawTableRequest, TableCatalog, TablePurpose, TableSelection};
use crate::errors::{AppError, Result};

/// Where a purpose's raw table list may come from, in lookup order.
#[derive(Debug, Clone, Copy)]
enum TableSource {
    /// The purpose's own keyed map, then the `tables` map, for each candidate key.
    Keyed,
    /// The comma-separated `<purpose>-list` option.
    FlatList,
}

const LOOKUP_CHAIN: &[TableSource] = &[TableSource::Keyed, TableSource::FlatList];

impl TableSource {
    fn lookup(self, request: &RawTableRequest, purpose: TablePurpose) -> Option<Vec<String>> {
        match self {
            TableSource::Keyed => lookup_keyed(request, purpose),
            TableSource::FlatList => lookup_flat_list(request, purpose),
        }
    }
}

fn keyed_maps(purpose: TablePurpose) -> &'static [TablePurpose] {
    match purpose {
        TablePurpose::Skip => &[TablePurpose::Skip, TablePurpose::Tables],
        TablePurpose::Structure => &[TablePurpose::Structure, TablePurpose::Tables],
        TablePurpose::Tables => &[TablePurpose::Tables],
    }
}

fn lookup_keyed(request: &RawTableRequest, purpose: TablePurpose) -> Option<Vec<String>> {
    let key_list = request.options(purpose).key.as_deref()?;
    key_list.split(',').map(str::trim).find_map(|key| {
        keyed_maps(purpose)
            .iter()
            .find_map(|map| request.options(*map).keyed.get(key).cloned())
    })
}

fn lookup_flat_list(request: &RawTableRequest, purpose: TablePurpose) -> Option<Vec<String>> {
    let list = request.options(purpose).list.as_deref()?;
    Some(
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Returns the raw (unexpanded) table list configured for `purpose`.
///
/// Candidate keys from the `-key` option are tried in order against the purpose's own map
/// and, except for `tables` itself, the `tables` map; the first hit wins. Failing that the
/// flat `-list` option is used. Nothing configured yields an empty list.
pub fn raw_table_list(request: &RawTableRequest, purpose: TablePurpose) -> Vec<String> {
    LOOKUP_CHAIN
        .iter()
        .find_map(|source| source.lookup(request, purpose))
        .unwrap_or_default()
}

fn wildcard_pattern(table: &str) -> Result<Regex> {
    let body = table
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(true)
        .build()
        .map_err(|e| AppError::Config(format!("Invalid table pattern '{}': {}", table, e)))
}

/// Expands every `*` pattern in `tables` to the matching names in `db_tables`.
///
/// Matching is case-insensitive and anchored; names without a wildcard are ignored here.
pub fn expand_wildcard_tables(tables: &[String], db_tables: &[String]) -> Result<BTreeSet<String>> {
    let mut expanded = BTreeSet::new();
    for table in tables.iter().filter(|t| t.contains('*')) {
        let pattern = wildcard_pattern(table)?;
        expanded.extend(db_tables.iter().filter(|t| pattern.is_match(t)).cloned());
    }
    Ok(expanded)
}

/// Expands wildcards, then keeps only names that exist in `db_tables`.
pub fn expand_and_filter_tables(tables: &[String], db_tables: &[String]) -> Result<BTreeSet<String>> {
    let expanded = expand_wildcard_tables(tables, db_tables)?;
    let existing: HashSet<&str> = db_tables.iter().map(String::as_str).collect();

    Ok(tables
        .iter()
        .cloned()
        .chain(expanded)
        .filter(|t| existing.contains(t.as_str()))
        .collect())
}

/// Resolves the raw skip/structure/tables configuration against the live catalog.
pub fn resolve(request: &RawTableRequest, catalog: &dyn TableCatalog) -> Result<TableSelection> {
    let db_tables = catalog.list_tables()?;
    debug!("Catalog lists {} tables", db_tables.len());

    let mut selection = TableSelection::default();
    for purpose in TablePurpose::ALL {
        let raw = raw_table_list(request, purpose);
        let resolved = expand_and_filter_tables(&raw, &db_tables)?;
        debug!(
            "{}: {} requested, {} resolved",
            purpose.option_name(),
            raw.len(),
            resolved.len()
        );
        match purpose {
            TablePurpose::Skip => selection.skip = resolved,
            TablePurpose::Structure => selection.structure = resolved,
            TablePurpose::Tables => selection.tables = resolved,
        }
    }
    Ok(selection)
}
