//! Query execution façade.
//!
//! Validates the configured command, normalizes the query text to the
//! single-line form the echo-line protocol needs, logs, and delegates to
//! the process runner.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::db::process;
use crate::db::result::QueryResult;
use crate::error::{LensError, Result};

/// Executes a query batch on a database file.
///
/// `command` is the sqlite binary to invoke; it must be configured, or the
/// call fails with [`LensError::Command`] without spawning anything. A
/// launch failure also fails with [`LensError::Command`]. SQL errors
/// reported by the subprocess resolve successfully, carried inside the
/// returned [`QueryResult`] alongside any statements that completed before
/// the failure (the binary stops at the first failing statement).
pub async fn execute_query(
    command: &str,
    db_path: &Path,
    query: &str,
    timeout: Option<Duration>,
) -> Result<QueryResult> {
    if command.trim().is_empty() {
        return Err(LensError::command(
            "sqlite command is not configured, unable to execute queries",
        ));
    }

    debug!("sqlite command: '{command}'");
    debug!("database: {}", db_path.display());

    let query = normalize_query(query);
    info!("[QUERY] {query}");

    process::spawn_query(command, db_path, &query, timeout).await
}

/// Collapses a query batch onto a single line.
///
/// The subprocess echoes each statement verbatim, and the output parser
/// treats every echo as one line; multi-line SQL would break that protocol.
/// Comments are dropped and whitespace runs become single spaces, except
/// inside string literals, which pass through untouched.
fn normalize_query(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut chars = query.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            if c == '\'' {
                in_string = false;
            }
            out.push(c);
            continue;
        }

        match c {
            '\'' => {
                in_string = true;
                out.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                // line comment runs to end of line
                for ch in chars.by_ref() {
                    if ch == '\n' {
                        break;
                    }
                }
                push_separator(&mut out);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for ch in chars.by_ref() {
                    if prev == '*' && ch == '/' {
                        break;
                    }
                    prev = ch;
                }
                push_separator(&mut out);
            }
            c if c.is_whitespace() => push_separator(&mut out),
            c => out.push(c),
        }
    }

    out.trim_end().to_string()
}

fn push_separator(out: &mut String) {
    if !out.is_empty() && !out.ends_with(' ') {
        out.push(' ');
    }
}
