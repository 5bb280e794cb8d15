//! Database access layer for sqlite-lens.
//!
//! Queries never run in-process: they are handed to the external sqlite3
//! binary as a subprocess and its textual output is decoded back into
//! structured results. The modules here cover the result model, the two
//! stream parsers, the process runner, the execution façade, and schema
//! retrieval built on top of it.

mod executor;
mod parser;
mod process;
mod result;
mod schema;
mod stderr;

pub use executor::execute_query;
pub use parser::ResultSetParser;
pub use process::spawn_query;
pub use result::{QueryError, QueryResult, ResultSet, StatementResult};
pub use schema::{retrieve_schema, ColumnSchema, DatabaseSchema, TableKind, TableSchema};
pub use stderr::StderrCollector;
