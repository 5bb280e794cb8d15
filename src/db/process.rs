//! Subprocess runner for the external sqlite3 binary.
//!
//! Spawns the configured command with a fixed argument set and streams its
//! stdout into a [`ResultSetParser`] and its stderr into a
//! [`StderrCollector`] while the process runs, then combines both finalized
//! values into a [`QueryResult`] once it exits.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::debug;

use crate::db::parser::ResultSetParser;
use crate::db::result::QueryResult;
use crate::db::stderr::StderrCollector;
use crate::error::{LensError, Result};

/// Size of the buffer used when draining the child's pipes.
const READ_BUF_SIZE: usize = 8 * 1024;

/// Incremental UTF-8 decoder for a byte pipe.
///
/// Reads can end in the middle of a multi-byte character; the undecoded
/// trailing bytes are held back and prepended to the next read, so a
/// character straddling a read boundary decodes intact. Genuinely invalid
/// bytes become replacement characters.
#[derive(Debug, Default)]
struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    fn new() -> Self {
        Self::default()
    }

    /// Decodes one read's worth of bytes, plus any held-back tail.
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(
                        std::str::from_utf8(&self.pending[..valid])
                            .expect("prefix validated by valid_up_to"),
                    );
                    match e.error_len() {
                        // invalid sequence: replace it and keep decoding
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        // truncated character: hold the tail for the next read
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flushes a tail left over after the stream closed mid-character.
    fn finish(self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }
}

/// Runs one query batch through the sqlite binary.
///
/// The argument set is fixed by the output protocol the parser expects:
/// headers on, `NULL` as the null sentinel, statement echo on, and tcl
/// output mode. Stdin is not used.
///
/// Fails with [`LensError::Command`] if the process cannot be started at
/// all; a query that runs but reports SQL errors resolves successfully with
/// the error captured inside the returned [`QueryResult`]. When `timeout`
/// is set and expires, the child is killed and the call fails with
/// [`LensError::Query`].
pub async fn spawn_query(
    command: &str,
    db_path: &Path,
    query: &str,
    timeout: Option<Duration>,
) -> Result<QueryResult> {
    let mut child = Command::new(command)
        .arg(db_path)
        .arg(query)
        .arg("-header")
        .arg("-nullvalue")
        .arg("NULL")
        .arg("-echo")
        .arg("-cmd")
        .arg(".mode tcl")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| LensError::command(format!("failed to start '{command}': {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| LensError::internal("child stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| LensError::internal("child stderr was not piped"))?;

    let run = drive(child, stdout, stderr);
    match timeout {
        // Dropping the timed-out future drops the child handle, which kills
        // the process (kill_on_drop).
        Some(limit) => match tokio::time::timeout(limit, run).await {
            Ok(result) => result,
            Err(_) => Err(LensError::query(format!(
                "query timed out after {} seconds",
                limit.as_secs_f64()
            ))),
        },
        None => run.await,
    }
}

/// Drains both pipes concurrently, waits for exit, finalizes the parsers.
async fn drive(
    mut child: Child,
    mut stdout: ChildStdout,
    mut stderr: ChildStderr,
) -> Result<QueryResult> {
    let stdout_task = async {
        let mut parser = ResultSetParser::new();
        let mut decoder = Utf8StreamDecoder::new();
        let mut buf = vec![0u8; READ_BUF_SIZE];
        loop {
            let n = stdout
                .read(&mut buf)
                .await
                .map_err(|e| LensError::internal(format!("error reading stdout: {e}")))?;
            if n == 0 {
                break;
            }
            parser.push(&decoder.decode(&buf[..n]));
        }
        parser.push(&decoder.finish());
        Ok::<_, LensError>(parser)
    };

    let stderr_task = async {
        let mut collector = StderrCollector::new();
        let mut decoder = Utf8StreamDecoder::new();
        let mut buf = vec![0u8; READ_BUF_SIZE];
        loop {
            let n = stderr
                .read(&mut buf)
                .await
                .map_err(|e| LensError::internal(format!("error reading stderr: {e}")))?;
            if n == 0 {
                break;
            }
            collector.push(&decoder.decode(&buf[..n]));
        }
        let tail = decoder.finish();
        if !tail.is_empty() {
            collector.push(&tail);
        }
        Ok::<_, LensError>(collector)
    };

    let (parser, collector) = tokio::try_join!(stdout_task, stderr_task)?;

    let status = child
        .wait()
        .await
        .map_err(|e| LensError::internal(format!("failed to wait for sqlite process: {e}")))?;
    debug!(code = ?status.code(), "sqlite process exited");

    let result_set = parser.done()?;
    let error = collector.finish();

    // A run that produced nothing but stderr has no result set at all.
    let result_set = if result_set.is_empty() && error.is_some() {
        None
    } else {
        Some(result_set)
    };

    Ok(QueryResult { result_set, error })
}
