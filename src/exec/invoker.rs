// src/exec/invoker.rs

//! Launch the external executable and capture its combined output.

use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{PieceError, Result};
use crate::exec::request::ExecutionRequest;

/// How long to keep draining pipes after the child was killed. Grandchildren
/// may still hold the write ends open.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// How the process run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessEnd {
    /// The process exited on its own. Signal deaths are reported as `-1`.
    Exited(i32),
    /// Killed after exceeding the request's timeout.
    TimedOut(Duration),
    /// Killed because the cancellation signal fired.
    Cancelled,
}

/// Result of one process run: how it ended plus stdout and stderr merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub end: ProcessEnd,
    pub captured: String,
}

impl Invocation {
    pub fn exited(status: i32, captured: impl Into<String>) -> Self {
        Self {
            end: ProcessEnd::Exited(status),
            captured: captured.into(),
        }
    }
}

/// Run `request` to completion.
///
/// Both output streams are read line by line into one shared buffer, so each
/// stream keeps its own order and lines interleave in arrival order. If
/// `cancel` fires, or the timeout elapses, the child is killed and whatever
/// was captured so far is returned. A dropped cancel sender is not a
/// cancellation.
pub async fn run_process(
    request: &ExecutionRequest,
    mut cancel: oneshot::Receiver<()>,
) -> Result<Invocation> {
    info!(
        cmd = %request.command_line(),
        cwd = ?request.working_dir,
        "starting external process"
    );

    let mut cmd = Command::new(&request.executable);
    cmd.args(&request.args)
        .current_dir(&request.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| PieceError::io(&request.executable, e))?;

    let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_reader(stdout, "stdout", Arc::clone(&buffer)));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_reader(stderr, "stderr", Arc::clone(&buffer)));
    }

    let deadline = async {
        match request.timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let mut cancel_armed = true;
    let end = loop {
        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| PieceError::io(&request.executable, e))?;
                let code = status.code().unwrap_or(-1);
                info!(exit_code = code, success = status.success(), "external process exited");
                break ProcessEnd::Exited(code);
            }

            _ = &mut deadline => {
                let limit = request.timeout.unwrap_or_default();
                warn!(timeout_secs = limit.as_secs(), "external process timed out; killing it");
                kill(&mut child).await;
                break ProcessEnd::TimedOut(limit);
            }

            signal = &mut cancel, if cancel_armed => {
                match signal {
                    Ok(()) => {
                        info!("cancellation requested; killing external process");
                        kill(&mut child).await;
                        break ProcessEnd::Cancelled;
                    }
                    Err(_) => {
                        debug!("cancel channel closed without explicit cancellation");
                        cancel_armed = false;
                    }
                }
            }
        }
    };

    drain(readers, matches!(end, ProcessEnd::Exited(_))).await;

    let bytes = match buffer.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    Ok(Invocation {
        end,
        captured: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn spawn_reader<R>(stream: R, name: &'static str, buffer: Arc<Mutex<Vec<u8>>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    debug!(stream = name, "{}", String::from_utf8_lossy(&line).trim_end());
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(&line);
                    }
                }
                Err(e) => {
                    warn!(stream = name, error = %e, "failed reading process output");
                    break;
                }
            }
        }
    })
}

/// Wait for the pipe readers. After a normal exit we wait for EOF; after a
/// kill we only wait `DRAIN_GRACE`.
async fn drain(readers: Vec<JoinHandle<()>>, exited: bool) {
    for reader in readers {
        if exited {
            let _ = reader.await;
        } else if tokio::time::timeout(DRAIN_GRACE, reader).await.is_err() {
            debug!("output pipe still open after kill; giving up on the rest");
        }
    }
}

async fn kill(child: &mut tokio::process::Child) {
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill external process");
    }
}
