//! Bounded process execution
//!
//! [`ProcessRunner`] is the single seam through which the engine spawns
//! processes. [`TokioProcessRunner`] enforces a wall-clock timeout and a
//! per-stream output cap; whichever trips first kills the child and the
//! result is returned with the output captured so far.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{Error, Result};

/// Variables removed from the inherited environment before spawning.
pub const UNSET_ENV: [&str; 2] = ["GIT_ASKPASS", "SSH_ASKPASS"];

/// How long to wait for output pipes to drain once the child has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Environment that keeps git non-interactive with a predictable locale.
pub fn non_interactive_env() -> BTreeMap<String, String> {
    [
        ("GIT_TERMINAL_PROMPT", "0"),
        ("GCM_INTERACTIVE", "never"),
        ("GIT_EDITOR", "true"),
        ("GIT_PAGER", "cat"),
        ("LC_ALL", "C"),
        ("LANG", "C"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Everything needed to start one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Absolute working directory
    pub cwd: PathBuf,
    /// Set on top of the inherited environment
    pub env: BTreeMap<String, String>,
    pub timeout: Duration,
    /// Cap applied to stdout and stderr separately
    pub max_buffer_bytes: usize,
}

/// Outcome of a process that was spawned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    /// `None` when the process was killed or ended by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    pub timed_out: bool,
    /// An output stream exceeded the buffer cap
    pub truncated: bool,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out && !self.truncated
    }
}

/// Spawns processes on behalf of the engine.
///
/// Returns `Err` only when the process could not be started at all; a
/// process that ran and failed is an `Ok` result with a non-zero exit code.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessResult>;
}

/// [`ProcessRunner`] on `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessResult> {
        let start = Instant::now();

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for key in UNSET_ENV {
            cmd.env_remove(key);
        }
        cmd.envs(&spec.env);

        let mut child = cmd.spawn().map_err(|source| Error::SpawnFailed {
            program: spec.program.display().to_string(),
            source,
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("stdout was not captured")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("stderr was not captured")))?;

        let (overflow_tx, mut overflow_rx) = mpsc::channel::<()>(2);
        let stdout_capture = Capture::spawn(stdout, spec.max_buffer_bytes, overflow_tx.clone());
        let stderr_capture = Capture::spawn(stderr, spec.max_buffer_bytes, overflow_tx);

        let deadline = tokio::time::sleep(spec.timeout);
        tokio::pin!(deadline);

        let mut timed_out = false;
        let mut truncated = false;
        let status = tokio::select! {
            status = child.wait() => Some(status?),
            () = &mut deadline => {
                timed_out = true;
                None
            }
            Some(()) = overflow_rx.recv() => {
                truncated = true;
                None
            }
        };

        let exit_code = match status {
            Some(status) => status.code(),
            None => {
                tracing::warn!(
                    program = %spec.program.display(),
                    timeout_ms = spec.timeout.as_millis() as u64,
                    limit_bytes = spec.max_buffer_bytes,
                    timed_out,
                    truncated,
                    "Killing git process"
                );
                if let Err(e) = child.kill().await {
                    tracing::warn!(error = %e, "Failed to kill git process");
                }
                None
            }
        };

        let (stdout, stdout_overflow) = stdout_capture.finish().await;
        let (stderr, stderr_overflow) = stderr_capture.finish().await;
        truncated |= stdout_overflow || stderr_overflow;

        let result = ProcessResult {
            exit_code: if timed_out || truncated { None } else { exit_code },
            stdout,
            stderr,
            elapsed: start.elapsed(),
            timed_out,
            truncated,
        };
        tracing::debug!(
            program = %spec.program.display(),
            exit_code = ?result.exit_code,
            elapsed_ms = result.elapsed.as_millis() as u64,
            timed_out,
            truncated,
            "Process finished"
        );
        Ok(result)
    }
}

/// Output collected from one pipe, readable even if the reader is aborted.
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<bool>,
}

impl Capture {
    fn spawn<R>(reader: R, limit: usize, overflow: mpsc::Sender<()>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn(read_capped(reader, limit, buffer.clone(), overflow));
        Self { buffer, task }
    }

    /// Wait briefly for the reader, then take what it collected.
    async fn finish(self) -> (String, bool) {
        let Capture { buffer, mut task } = self;
        let overflowed = match tokio::time::timeout(DRAIN_GRACE, &mut task).await {
            Ok(joined) => joined.unwrap_or(false),
            Err(_) => {
                // a grandchild still holds the pipe open
                task.abort();
                false
            }
        };
        let bytes = std::mem::take(&mut *buffer.lock().unwrap_or_else(|e| e.into_inner()));
        (String::from_utf8_lossy(&bytes).into_owned(), overflowed)
    }
}

/// Copy `reader` into `buffer` until EOF or until `limit` bytes would be
/// exceeded. Returns true on overflow, after signalling `overflow`.
async fn read_capped<R>(
    mut reader: R,
    limit: usize,
    buffer: Arc<Mutex<Vec<u8>>>,
    overflow: mpsc::Sender<()>,
) -> bool
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => return false,
            Ok(n) => n,
        };

        let mut buf = buffer.lock().unwrap_or_else(|e| e.into_inner());
        let remaining = limit.saturating_sub(buf.len());
        if n > remaining {
            buf.extend_from_slice(&chunk[..remaining]);
            drop(buf);
            let _ = overflow.try_send(());
            return true;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}
