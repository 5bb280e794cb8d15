//! Integration tests for the stdout stream parser.
//!
//! These exercise the parser's chunking guarantees: any split of the same
//! logical output must yield the same result set.

use pretty_assertions::assert_eq;
use sqlite_lens::db::{ResultSet, ResultSetParser, StatementResult};

fn statement(stmt: &str, header: &[&str], rows: &[&[&str]]) -> StatementResult {
    StatementResult {
        id: 0,
        stmt: stmt.to_string(),
        header: header.iter().map(|h| h.to_string()).collect(),
        rows: rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    }
}

fn parse_chunks(chunks: &[&str]) -> ResultSet {
    let mut parser = ResultSetParser::new();
    for chunk in chunks {
        parser.push(chunk);
    }
    parser.done().expect("valid stream")
}

#[test]
fn builds_result_set_from_chunks_split_mid_token() {
    let actual = parse_chunks(&[
        "SELECT * FROM company;\n\"h1\" \"h",
        "2\"\n\"r1\" \"r2\"\n",
        "\"r1\" \"r2\"\n",
    ]);

    let mut expected = ResultSet::new();
    expected.push(statement(
        "SELECT * FROM company;",
        &["h1", "h2"],
        &[&["r1", "r2"], &["r1", "r2"]],
    ));

    assert_eq!(actual, expected);
}

#[test]
fn builds_result_set_from_chunks_with_windows_line_endings() {
    let actual = parse_chunks(&[
        "SELECT * FROM company;\r\n\"h1\" \"h",
        "2\"\r\n\"r1\" \"r2\"\r\n",
        "\"r1\" \"r2\"\r\n",
    ]);

    let mut expected = ResultSet::new();
    expected.push(statement(
        "SELECT * FROM company;",
        &["h1", "h2"],
        &[&["r1", "r2"], &["r1", "r2"]],
    ));

    assert_eq!(actual, expected);
}

/// A three-statement batch covering rows, an empty SELECT, and DDL.
const BATCH: &str = concat!(
    "SELECT * FROM company;\n",
    "\"id\" \"name\"\n",
    "\"1\" \"Ada Lovelace\"\n",
    "\"2\" \"NULL\"\n",
    "SELECT * FROM empty;\n",
    "\"id\" \"name\"\n",
    "CREATE TABLE t (id INT);\n",
);

fn expected_batch() -> ResultSet {
    let mut expected = ResultSet::new();
    expected.push(statement(
        "SELECT * FROM company;",
        &["id", "name"],
        &[&["1", "Ada Lovelace"], &["2", "NULL"]],
    ));
    expected.push(statement("SELECT * FROM empty;", &["id", "name"], &[]));
    expected.push(statement("CREATE TABLE t (id INT);", &[], &[]));
    expected
}

#[test]
fn splitting_at_every_offset_yields_identical_result() {
    let whole = parse_chunks(&[BATCH]);
    assert_eq!(whole, expected_batch());

    for split in 1..BATCH.len() {
        let actual = parse_chunks(&[&BATCH[..split], &BATCH[split..]]);
        assert_eq!(actual, whole, "diverged when split at offset {split}");
    }
}

#[test]
fn feeding_fixed_size_chunks_yields_identical_result() {
    let whole = parse_chunks(&[BATCH]);

    for size in 1..=7 {
        let chunks: Vec<&str> = BATCH
            .as_bytes()
            .chunks(size)
            .map(|c| std::str::from_utf8(c).expect("ascii input"))
            .collect();
        let actual = parse_chunks(&chunks);
        assert_eq!(actual, whole, "diverged with chunk size {size}");
    }
}

#[test]
fn crlf_stream_parses_identically_to_lf_stream() {
    let crlf = BATCH.replace('\n', "\r\n");
    assert_eq!(parse_chunks(&[&crlf]), parse_chunks(&[BATCH]));
}

#[test]
fn statement_ids_follow_execution_order() {
    let set = parse_chunks(&[BATCH]);

    assert_eq!(set.len(), 3);
    let ids: Vec<usize> = set.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    let stmts: Vec<&str> = set.iter().map(|s| s.stmt.as_str()).collect();
    assert_eq!(
        stmts,
        vec![
            "SELECT * FROM company;",
            "SELECT * FROM empty;",
            "CREATE TABLE t (id INT);",
        ]
    );
}

#[test]
fn select_matching_no_rows_keeps_its_header() {
    let set = parse_chunks(&["SELECT * FROM empty;\n\"id\" \"name\"\n"]);

    let record = set.get(0).expect("one statement");
    assert_eq!(record.header, vec!["id", "name"]);
    assert!(record.rows.is_empty());
}
