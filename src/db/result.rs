//! Result types for queries executed through the sqlite3 subprocess.
//!
//! Defines the structures the output stream parser produces and the
//! combined value a query execution resolves to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The parsed output of one executed SQL statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementResult {
    /// Zero-based position of the statement within its batch.
    pub id: usize,

    /// The statement text as echoed by the subprocess.
    pub stmt: String,

    /// Column names; empty when the statement produced no columns (DDL/DML).
    pub header: Vec<String>,

    /// Data rows; SQL NULL appears as the literal `NULL` sentinel token.
    pub rows: Vec<Vec<String>>,
}

/// Ordered collection of statement results for one executed batch.
///
/// Append-only while the parser builds it; consumers treat it as immutable.
/// Equality is structural across the full nested sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    statements: Vec<StatementResult>,
}

impl ResultSet {
    /// Creates a new empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one record, assigning its `id` from the current length.
    ///
    /// Ids are therefore strictly increasing from 0 in insertion order.
    pub fn push(&mut self, mut statement: StatementResult) {
        statement.id = self.statements.len();
        self.statements.push(statement);
    }

    /// Returns the number of statement results.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if no statement produced a record.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Returns the record at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&StatementResult> {
        self.statements.get(index)
    }

    /// Iterates over the records in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, StatementResult> {
        self.statements.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a StatementResult;
    type IntoIter = std::slice::Iter<'a, StatementResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An error reported by the subprocess on its stderr stream.
///
/// Holds the stderr text exactly as emitted, concatenated in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryError(pub String);

impl QueryError {
    /// Creates a query error wrapping the given stderr text.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Returns the raw stderr text.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for QueryError {}

/// Combined outcome of one query execution.
///
/// Both fields are optional: a batch that fails part-way yields the
/// statements that completed before the failure plus the error text, so a
/// caller can display both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Parsed statement results, absent when nothing parseable arrived.
    pub result_set: Option<ResultSet>,

    /// Accumulated stderr output, absent when the run emitted none.
    pub error: Option<QueryError>,
}

impl QueryResult {
    /// Returns true if the subprocess reported an error.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
