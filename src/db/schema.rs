//! Database schema retrieval through the query execution boundary.
//!
//! The schema is retrieved in two steps:
//! 1. find all tables and views of the database (using `sqlite_master`)
//! 2. find the columns of each table found in the first step (using
//!    `PRAGMA table_info`)
//!
//! Both steps run as ordinary query batches; this module only interprets
//! the resulting [`ResultSet`]s.

use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::executor::execute_query;
use crate::db::result::ResultSet;
use crate::error::{LensError, Result};

/// Whether a schema object is a table or a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Table,
    View,
}

impl TableKind {
    /// Parses the `type` column of `sqlite_master`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "table" => Some(Self::Table),
            "view" => Some(Self::View),
            _ => None,
        }
    }

    /// Returns the kind as the string `sqlite_master` uses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
        }
    }
}

/// One column of a table, as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,

    /// Declared type, uppercased (e.g. `INTEGER`, `TEXT`).
    pub type_name: String,

    /// True when the column carries a NOT NULL constraint.
    pub notnull: bool,

    /// 1-based position within the primary key, or 0 when not part of it.
    pub pk: u32,

    /// Declared default value, absent when none was declared.
    pub default_value: Option<String>,
}

/// One table or view with its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Object name.
    pub name: String,

    /// Table or view.
    pub kind: TableKind,

    /// Columns in declaration order.
    pub columns: Vec<ColumnSchema>,
}

/// The full schema of one database file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    /// Display name (the file name of the database).
    pub name: String,

    /// Path to the database file.
    pub path: PathBuf,

    /// Tables and views, ordered by kind then name.
    pub tables: Vec<TableSchema>,
}

/// Query that lists all tables and views, ordered by type then name.
const TABLES_QUERY: &str = "SELECT name, type FROM sqlite_master \
     WHERE type=\"table\" OR type=\"view\" ORDER BY type ASC, name ASC;";

/// Retrieves the schema of a database.
///
/// Fails with [`LensError::Command`] when the sqlite binary cannot run and
/// with [`LensError::Query`] when either schema query reports an error.
pub async fn retrieve_schema(
    command: &str,
    db_path: &Path,
    timeout: Option<Duration>,
) -> Result<DatabaseSchema> {
    let mut schema = DatabaseSchema {
        name: db_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: db_path.to_path_buf(),
        tables: Vec::new(),
    };

    let outcome = execute_query(command, db_path, TABLES_QUERY, timeout).await?;
    if let Some(error) = outcome.error {
        return Err(LensError::query(error.to_string()));
    }
    schema.tables = tables_from_result(&outcome.result_set.unwrap_or_default());

    if schema.tables.is_empty() {
        // no tables in the db, no need to run the columns queries
        debug!("database has no tables or views");
        return Ok(schema);
    }

    let columns_query: String = schema
        .tables
        .iter()
        .map(|table| format!("PRAGMA table_info('{}');", table.name))
        .collect();

    let outcome = execute_query(command, db_path, &columns_query, timeout).await?;
    if let Some(error) = outcome.error {
        return Err(LensError::query(error.to_string()));
    }
    apply_columns(&mut schema.tables, &outcome.result_set.unwrap_or_default());

    Ok(schema)
}

/// Interprets the `sqlite_master` result into empty table records.
fn tables_from_result(result_set: &ResultSet) -> Vec<TableSchema> {
    let Some(tables) = result_set.get(0) else {
        return Vec::new();
    };

    tables
        .rows
        .iter()
        .filter_map(|row| {
            let name = row.first()?.clone();
            let kind = row.get(1).and_then(|k| TableKind::parse(k))?;
            Some(TableSchema {
                name,
                kind,
                columns: Vec::new(),
            })
        })
        .collect()
}

/// Fills in columns from a batch of `PRAGMA table_info` results.
///
/// Each statement result is matched to its table by extracting the table
/// name from the echoed statement text; rows are interpreted by header
/// name, so column order in the PRAGMA output does not matter.
fn apply_columns(tables: &mut [TableSchema], result_set: &ResultSet) {
    let table_name = Regex::new(r"table_info\('?(\w+)'?\)").expect("hardcoded regex is valid");

    for result in result_set {
        let Some(captures) = table_name.captures(&result.stmt) else {
            continue;
        };
        let Some(table) = tables.iter_mut().find(|t| t.name == captures[1]) else {
            continue;
        };

        table.columns = result
            .rows
            .iter()
            .map(|row| {
                let cell = |column: &str| {
                    result
                        .header
                        .iter()
                        .position(|h| h == column)
                        .and_then(|i| row.get(i))
                };
                ColumnSchema {
                    name: cell("name").cloned().unwrap_or_default(),
                    type_name: cell("type").map(|t| t.to_uppercase()).unwrap_or_default(),
                    notnull: cell("notnull").map(|v| v == "1").unwrap_or(false),
                    pk: cell("pk").and_then(|v| v.parse().ok()).unwrap_or(0),
                    default_value: cell("dflt_value").filter(|v| v.as_str() != "NULL").cloned(),
                }
            })
            .collect();
    }
}
