use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{BackendError, GeometryError, Result, SeismodensError};
use crate::geometry::Polygon;
use crate::operations::{Reproject, WebMercator};

use super::{
    AnalyticBackend, AnalyticQuery, BackendValue, FunctionTransport, LineSource, LocalClipBackend,
};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Reaches the stored function through an external command.
///
/// The command receives the SQL text on stdin and prints the answer on
/// stdout: one line is a scalar value, several lines a row set, no output a
/// bare status. A non-zero exit or an expired timeout is a transport failure.
#[derive(Debug, Clone)]
pub struct CommandTransport {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandTransport {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    fn spawn(&self) -> Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| unavailable(format!("cannot start {}: {err}", self.program)))
    }
}

impl FunctionTransport for CommandTransport {
    fn invoke(&self, query: &AnalyticQuery) -> Result<BackendValue> {
        let mut child = self.spawn()?;

        // Readers first, then the writer: a large query must not block on a
        // full pipe outside the deadline.
        let stdout = child.stdout.take().map(read_to_end);
        let stderr = child.stderr.take().map(read_to_end);
        let writer = child
            .stdin
            .take()
            .map(|stdin| write_query(stdin, query.to_sql()));

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!(
                        program = self.program.as_str(),
                        timeout = ?self.timeout,
                        "remote call timed out"
                    );
                    return Err(unavailable(format!("no answer within {:?}", self.timeout)));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => {
                    return Err(unavailable(format!(
                        "cannot wait for {}: {err}",
                        self.program
                    )))
                }
            }
        };

        let stdout = stdout.map(join_output).unwrap_or_default();
        let stderr = stderr.map(join_output).unwrap_or_default();
        if !status.success() {
            return Err(unavailable(format!(
                "{} exited with {status}: {}",
                self.program,
                stderr.trim()
            )));
        }
        if let Some(Err(err)) = writer.map(join_writer) {
            return Err(unavailable(format!("cannot send query: {err}")));
        }
        debug!(program = self.program.as_str(), bytes = stdout.len(), "remote call answered");

        let mut rows: Vec<String> = stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect();
        Ok(match rows.len() {
            0 => BackendValue::Status(true),
            1 => BackendValue::Text(rows.remove(0)),
            _ => BackendValue::Rows(rows),
        })
    }
}

fn read_to_end(mut pipe: impl Read + Send + 'static) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut out = String::new();
        let _ = pipe.read_to_string(&mut out);
        out
    })
}

fn join_output(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

fn write_query(mut stdin: ChildStdin, sql: String) -> thread::JoinHandle<io::Result<()>> {
    thread::spawn(move || match stdin.write_all(sql.as_bytes()) {
        // The command may answer without reading its input.
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    })
}

fn join_writer(handle: thread::JoinHandle<io::Result<()>>) -> io::Result<()> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("query writer panicked")))
}

fn unavailable(message: String) -> SeismodensError {
    BackendError::Unavailable(message).into()
}

/// In-process stand-in for the stored function.
///
/// Parses the ring text of the query, clips a local dataset the way the
/// database function does and answers with `density, length, area` text.
pub struct EmbeddedFunction<S, P = WebMercator> {
    backend: LocalClipBackend<S, P>,
}

impl<S: LineSource> EmbeddedFunction<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            backend: LocalClipBackend::new(source),
        }
    }
}

impl<S: LineSource, P: Reproject> FunctionTransport for EmbeddedFunction<S, P> {
    fn invoke(&self, query: &AnalyticQuery) -> Result<BackendValue> {
        let rings = query.rings.parse_rings()?;
        if rings.is_empty() {
            return Err(GeometryError::NoRing.into());
        }
        let polygon = Polygon::new(rings, query.rings.spatial_reference);
        let result = self.backend.compute(&polygon)?;
        let text = result.formatted();
        Ok(BackendValue::Text(format!(
            "{}, {}, {}",
            text.density, text.length, text.area
        )))
    }
}
