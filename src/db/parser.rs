//! Incremental parser for the sqlite3 subprocess's standard output.
//!
//! The subprocess is invoked with `-header -echo -cmd ".mode tcl"`, which
//! produces, per executed statement:
//!
//! ```text
//! SELECT * FROM company;        <- echoed statement, ends with ';'
//! "id" "name"                   <- header, double-quoted cells
//! "1" "Ada"                     <- zero or more data rows
//! "2" "Linus"
//! ```
//!
//! Output arrives in arbitrary byte chunks that need not align with line or
//! token boundaries, so a partial trailing line is buffered across `push`
//! calls. Lines end in `\n` or `\r\n`; both are accepted.

use crate::db::result::{ResultSet, StatementResult};
use crate::error::{LensError, Result};

/// Position in the per-statement line protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Waiting for the first statement echo of the stream.
    ExpectingStatement,
    /// A statement echo was seen; the next line is its header (or the next
    /// echo, when the statement produced no output).
    ExpectingHeader,
    /// Accumulating data rows until the next echo or end of input.
    CollectingRows,
}

/// Streaming decoder from stdout text to a [`ResultSet`].
///
/// One instance backs exactly one subprocess run; feed chunks with
/// [`push`](Self::push) and finalize with [`done`](Self::done). All state
/// lives in the instance, so concurrent runs with separate parsers do not
/// interfere.
#[derive(Debug)]
pub struct ResultSetParser {
    state: ParserState,
    line_buffer: String,
    current: Option<StatementResult>,
    completed: ResultSet,
    malformed: Option<String>,
}

impl ResultSetParser {
    /// Creates a parser in its initial state.
    pub fn new() -> Self {
        Self {
            state: ParserState::ExpectingStatement,
            line_buffer: String::new(),
            current: None,
            completed: ResultSet::new(),
            malformed: None,
        }
    }

    /// Feeds one chunk of stdout text.
    ///
    /// Chunks may split lines, words, or quoted cells at any offset; an
    /// incomplete trailing line is kept in the buffer until its terminator
    /// arrives in a later chunk.
    pub fn push(&mut self, chunk: &str) {
        self.line_buffer.push_str(chunk);
        while let Some(pos) = self.line_buffer.find('\n') {
            let raw: String = self.line_buffer.drain(..=pos).collect();
            let line = raw
                .strip_suffix('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .unwrap_or(&raw);
            self.consume_line(line);
        }
    }

    /// Finalizes the parser after the stream has closed.
    ///
    /// A dangling unterminated line is flushed as a final line first, so no
    /// trailing content is lost. Returns a parse error if the stream
    /// violated the line protocol instead of silently misattributing lines.
    pub fn done(mut self) -> Result<ResultSet> {
        if !self.line_buffer.is_empty() {
            let raw = std::mem::take(&mut self.line_buffer);
            let line = raw.strip_suffix('\r').unwrap_or(&raw);
            self.consume_line(line);
        }

        if let Some(detail) = self.malformed {
            return Err(LensError::parse(detail));
        }

        self.finish_statement();
        Ok(self.completed)
    }

    fn consume_line(&mut self, line: &str) {
        if self.malformed.is_some() || line.trim().is_empty() {
            return;
        }

        match self.state {
            ParserState::ExpectingStatement => {
                if is_statement_echo(line) {
                    self.begin_statement(line);
                    self.state = ParserState::ExpectingHeader;
                } else {
                    self.malformed = Some(format!(
                        "expected a statement echo, got: {line}"
                    ));
                }
            }
            ParserState::ExpectingHeader => {
                if is_statement_echo(line) {
                    // The previous statement produced no output at all
                    // (DDL/DML): close it with an empty header and rows.
                    self.finish_statement();
                    self.begin_statement(line);
                } else {
                    if let Some(current) = self.current.as_mut() {
                        current.header = tokenize(line);
                    }
                    self.state = ParserState::CollectingRows;
                }
            }
            ParserState::CollectingRows => {
                if is_statement_echo(line) {
                    self.finish_statement();
                    self.begin_statement(line);
                    self.state = ParserState::ExpectingHeader;
                } else if let Some(current) = self.current.as_mut() {
                    current.rows.push(tokenize(line));
                }
            }
        }
    }

    fn begin_statement(&mut self, line: &str) {
        self.current = Some(StatementResult {
            stmt: line.trim().to_string(),
            ..Default::default()
        });
    }

    fn finish_statement(&mut self) {
        if let Some(statement) = self.current.take() {
            self.completed.push(statement);
        }
    }
}

impl Default for ResultSetParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns true if `line` is an echoed statement rather than a header or
/// data line: it ends with `;` and does not start with a quote. Header and
/// data lines always start with a `"`-quoted cell in tcl mode.
fn is_statement_echo(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.ends_with(';') && !trimmed.starts_with('"')
}

/// Splits a header or data line into cell values.
///
/// A cell starting with `"` runs to the matching closing quote and may
/// contain whitespace; the quotes are stripped. A bare cell runs to the
/// next whitespace. Whitespace runs separate cells; leading and trailing
/// whitespace is ignored. Interior quotes are not escaped by the
/// subprocess's quoting convention, so none are unescaped here.
fn tokenize(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut cell = String::new();
        if c == '"' {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '"' {
                    break;
                }
                cell.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                cell.push(ch);
                chars.next();
            }
        }
        cells.push(cell);
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> ResultSet {
        let mut parser = ResultSetParser::new();
        parser.push(text);
        parser.done().expect("valid stream")
    }

    fn statement(
        stmt: &str,
        header: &[&str],
        rows: &[&[&str]],
    ) -> StatementResult {
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

    #[test]
    fn test_tokenize_quoted_cells() {
        assert_eq!(tokenize("\"h1\" \"h2\""), vec!["h1", "h2"]);
    }

    #[test]
    fn test_tokenize_cell_with_embedded_whitespace() {
        assert_eq!(
            tokenize("\"Ada Lovelace\" \"42\""),
            vec!["Ada Lovelace", "42"]
        );
    }

    #[test]
    fn test_tokenize_bare_words() {
        assert_eq!(tokenize("NULL 42"), vec!["NULL", "42"]);
    }

    #[test]
    fn test_tokenize_mixed_and_padded() {
        assert_eq!(
            tokenize("  \"a b\"   NULL \"c\"  "),
            vec!["a b", "NULL", "c"]
        );
    }

    #[test]
    fn test_tokenize_empty_quoted_cell() {
        assert_eq!(tokenize("\"\" \"x\""), vec!["", "x"]);
    }

    #[test]
    fn test_statement_echo_detection() {
        assert!(is_statement_echo("SELECT * FROM company;"));
        assert!(is_statement_echo("  PRAGMA table_info('users');  "));
        assert!(!is_statement_echo("\"id\" \"name\""));
        // a quoted row whose last cell ends in ';' is still a row
        assert!(!is_statement_echo("\"a\" \"b;\""));
        assert!(!is_statement_echo("SELECT 1"));
    }

    #[test]
    fn test_single_statement_single_push() {
        let actual = parse("SELECT * FROM t;\n\"id\"\n\"1\"\n\"2\"\n");

        let mut expected = ResultSet::new();
        expected.push(statement("SELECT * FROM t;", &["id"], &[&["1"], &["2"]]));
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_select_with_no_rows_keeps_header() {
        let actual = parse("SELECT * FROM empty;\n\"id\" \"name\"\n");

        let mut expected = ResultSet::new();
        expected.push(statement("SELECT * FROM empty;", &["id", "name"], &[]));
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_ddl_statement_has_empty_header_and_rows() {
        let actual = parse(
            "CREATE TABLE t (id INT);\nSELECT * FROM t;\n\"id\"\n\"1\"\n",
        );

        let mut expected = ResultSet::new();
        expected.push(statement("CREATE TABLE t (id INT);", &[], &[]));
        expected.push(statement("SELECT * FROM t;", &["id"], &[&["1"]]));
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_trailing_line_without_terminator_is_flushed() {
        let mut parser = ResultSetParser::new();
        parser.push("SELECT 1;\n\"1\"\n\"1\"");
        let actual = parser.done().expect("valid stream");

        let mut expected = ResultSet::new();
        expected.push(statement("SELECT 1;", &["1"], &[&["1"]]));
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_null_sentinel_is_kept_verbatim() {
        let actual = parse("SELECT a FROM t;\n\"a\"\nNULL\n");
        assert_eq!(actual.get(0).map(|s| s.rows[0][0].as_str()), Some("NULL"));
    }

    #[test]
    fn test_header_without_statement_is_a_parse_error() {
        let mut parser = ResultSetParser::new();
        parser.push("\"h1\" \"h2\"\n");
        let err = parser.done().expect_err("protocol violation");
        assert!(matches!(err, LensError::Parse(_)));
    }

    #[test]
    fn test_empty_stream_yields_empty_result_set() {
        let parser = ResultSetParser::new();
        let actual = parser.done().expect("empty stream is valid");
        assert!(actual.is_empty());
    }
}
