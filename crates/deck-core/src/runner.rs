//! Process runner.
//!
//! Executes a composed [`CommandSpec`] and reports how it ended. The dispatch
//! engine depends on the [`ProcessRunner`] trait rather than on
//! `tokio::process` directly so tests can record commands instead of running
//! desktop tooling.

use crate::platform::CommandSpec;
use futures::future::BoxFuture;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exit status plus captured output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait ProcessRunner: Send + Sync {
    /// Run `spec` to completion. A `timeout` of `None` waits indefinitely.
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, Result<ProcessOutput, RunError>>;
}

/// How long to keep reading a finished command's output. Launchers such as
/// `xdg-open` or `xclip` leave a background process holding the pipes open.
const OUTPUT_GRACE: Duration = Duration::from_millis(200);

/// Spawns real child processes with `tokio::process`.
///
/// The result is decided by the spawned process's exit status, not by EOF on
/// its output pipes. The child is killed if the timeout elapses or the future
/// is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioRunner;

impl TokioRunner {
    async fn run_inner(spec: &CommandSpec) -> Result<ProcessOutput, RunError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| RunError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        // Drain both pipes concurrently so a chatty child never blocks on a
        // full pipe while we wait for it.
        let stdout = child.stdout.take().map(|out| tokio::spawn(read_all(out)));
        let stderr = child.stderr.take().map(|err| tokio::spawn(read_all(err)));

        if let (Some(input), Some(mut stdin)) = (spec.stdin.as_deref(), child.stdin.take()) {
            stdin.write_all(input.as_bytes()).await?;
            stdin.shutdown().await?;
            // Dropping closes the pipe so the reader sees EOF.
            drop(stdin);
        }

        let status = child.wait().await?;
        Ok(ProcessOutput {
            code: status.code(),
            stdout: collect(stdout).await,
            stderr: collect(stderr).await,
        })
    }
}

async fn read_all<R: AsyncRead + Unpin>(mut pipe: R) -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = pipe.read_to_end(&mut buf).await;
    buf
}

/// Output read so far, or nothing if a descendant still holds the pipe
/// after [`OUTPUT_GRACE`].
async fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    let Some(mut reader) = reader else {
        return String::new();
    };
    match tokio::time::timeout(OUTPUT_GRACE, &mut reader).await {
        Ok(Ok(buf)) => String::from_utf8_lossy(&buf).into_owned(),
        Ok(Err(_)) => String::new(),
        Err(_) => {
            reader.abort();
            String::new()
        }
    }
}

impl ProcessRunner for TokioRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, Result<ProcessOutput, RunError>> {
        Box::pin(async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, Self::run_inner(spec))
                    .await
                    .map_err(|_| RunError::Timeout(limit))?,
                None => Self::run_inner(spec).await,
            }
        })
    }
}
