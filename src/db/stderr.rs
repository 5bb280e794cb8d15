//! Accumulator for the sqlite3 subprocess's standard error stream.

use crate::db::result::QueryError;

/// Collects stderr chunks in arrival order into a single error value.
///
/// Keeps the distinction between "no stderr output" (no chunk was ever
/// pushed, [`finish`](Self::finish) returns `None`) and an empty-string
/// error (a zero-length chunk arrived).
#[derive(Debug, Default)]
pub struct StderrCollector {
    error: Option<String>,
}

impl StderrCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one chunk of stderr text, verbatim.
    pub fn push(&mut self, chunk: &str) {
        self.error.get_or_insert_with(String::new).push_str(chunk);
    }

    /// Finalizes the collector into an optional query error.
    pub fn finish(self) -> Option<QueryError> {
        self.error.map(QueryError)
    }
}
