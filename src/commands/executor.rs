use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout as tokio_timeout};
use tracing::{debug, info, warn};

use crate::commands::timeout::{TimeoutPhase, TimeoutStrategy, TimeoutTracker};
use crate::media::BridgeError;

/// Cap on bytes read from either output stream of a child (1 MiB)
pub const DEFAULT_OUTPUT_LIMIT: u64 = 1024 * 1024;

/// Output of a child that ran to completion
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl ProcessOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// One call of the media-control executable with a single flag argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    flag: String,
    output_limit: u64,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flag: flag.into(),
            output_limit: DEFAULT_OUTPUT_LIMIT,
        }
    }

    /// Maximum bytes accepted per output stream; more is an error
    pub fn with_output_limit(mut self, limit: u64) -> Self {
        self.output_limit = limit;
        self
    }

    pub fn flag(&self) -> &str {
        &self.flag
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Spawn the child without waiting on it.
    ///
    /// The child is killed if its handle is dropped before it exits.
    pub fn spawn(&self) -> Result<Child, BridgeError> {
        let child = Command::new(&self.program)
            .arg(&self.flag)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                program: self.program_name(),
                source,
            })?;

        debug!(program = %self.program.display(), flag = %self.flag, pid = ?child.id(), "spawned child");
        Ok(child)
    }

    /// Spawn the child and collect its output
    pub async fn run(&self, strategy: &TimeoutStrategy) -> Result<ProcessOutput, BridgeError> {
        let child = self.spawn()?;
        self.collect(child, strategy).await
    }

    /// Read stdout and stderr to end-of-stream and wait for exit, bounded by the strategy deadline.
    ///
    /// When the deadline passes the child handle is dropped, which kills it.
    pub async fn collect(
        &self,
        mut child: Child,
        strategy: &TimeoutStrategy,
    ) -> Result<ProcessOutput, BridgeError> {
        let pid = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.output_limit;

        let work = async move {
            let (out, err) = tokio::try_join!(drain(stdout, limit), drain(stderr, limit))?;
            let status = child.wait().await?;
            Ok::<(Vec<u8>, Vec<u8>, ExitStatus), io::Error>((out, err, status))
        };

        let mut tracker = TimeoutTracker::new(strategy.clone());
        let (stdout, stderr, status) = self.guard(work, &mut tracker, pid).await?;

        let output = ProcessOutput {
            exit_code: status.code(),
            success: status.success(),
            stdout: self.within_limit(stdout)?,
            stderr: self.within_limit(stderr)?,
            elapsed: tracker.elapsed(),
        };
        info!(
            flag = %self.flag,
            pid = ?pid,
            exit_code = ?output.exit_code,
            elapsed_ms = output.elapsed.as_millis() as u64,
            "child finished"
        );
        Ok(output)
    }

    /// Spawn the child and return its stdout as soon as that stream closes.
    ///
    /// The child may keep running or hold stderr open afterwards; its stderr and
    /// exit status are then only logged, from a background task bounded by the
    /// same deadline. Must be called inside a tokio runtime.
    pub async fn read_stdout(&self, strategy: &TimeoutStrategy) -> Result<Vec<u8>, BridgeError> {
        let mut child = self.spawn()?;
        let pid = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let mut tracker = TimeoutTracker::new(strategy.clone());
        let payload = self
            .guard(drain(stdout, self.output_limit), &mut tracker, pid)
            .await?;
        let payload = self.within_limit(payload)?;
        debug!(flag = %self.flag, pid = ?pid, bytes = payload.len(), "stdout closed");

        let grace = tracker
            .strategy()
            .deadline()
            .saturating_sub(tracker.elapsed());
        let flag = self.flag.clone();
        let limit = self.output_limit;
        tokio::spawn(async move {
            let exit_flag = flag.clone();
            let exit = async move {
                match child.wait().await {
                    Ok(status) if !status.success() => {
                        warn!(flag = %exit_flag, pid = ?pid, exit_code = ?status.code(), "child exited unsuccessfully");
                    }
                    Ok(status) => {
                        debug!(flag = %exit_flag, pid = ?pid, exit_code = ?status.code(), "child exited");
                    }
                    Err(e) => warn!(flag = %exit_flag, pid = ?pid, "failed to wait for child: {}", e),
                }
            };
            let stderr_flag = flag.clone();
            let errors = async move {
                if let Ok(bytes) = drain(stderr, limit).await {
                    let text = String::from_utf8_lossy(&bytes);
                    if !text.trim().is_empty() {
                        debug!(flag = %stderr_flag, stderr = %text.trim_end(), "child stderr");
                    }
                }
            };
            // Dropping the unfinished futures drops the child, which kills it
            if tokio_timeout(grace, async move { tokio::join!(exit, errors) })
                .await
                .is_err()
            {
                debug!(%flag, pid = ?pid, "child outlived its deadline after stdout closed");
            }
        });

        Ok(payload)
    }

    /// Drive `work` until it finishes or the strategy deadline passes
    async fn guard<F, T>(
        &self,
        work: F,
        tracker: &mut TimeoutTracker,
        pid: Option<u32>,
    ) -> Result<T, BridgeError>
    where
        F: Future<Output = io::Result<T>>,
    {
        tokio::pin!(work);
        let mut last_phase = TimeoutPhase::Normal;

        loop {
            let phase = tracker.current_phase();

            if phase != last_phase && phase == TimeoutPhase::Warning {
                warn!(
                    program = %self.program.display(),
                    flag = %self.flag,
                    elapsed_ms = tracker.elapsed().as_millis() as u64,
                    "child is slow to finish"
                );
            }
            last_phase = phase;

            if phase == TimeoutPhase::Expired {
                warn!(
                    program = %self.program.display(),
                    flag = %self.flag,
                    pid = ?pid,
                    "deadline reached, killing child"
                );
                return Err(BridgeError::Timeout {
                    program: self.program_name(),
                    flag: self.flag.clone(),
                    timeout_ms: tracker.strategy().timeout_ms,
                });
            }

            let wait = tracker.time_to_next_phase().unwrap_or(Duration::ZERO);

            tokio::select! {
                result = &mut work => {
                    return result.map_err(|source| BridgeError::Io {
                        program: self.program_name(),
                        source,
                    });
                }
                _ = sleep(wait) => {}
            }
        }
    }

    fn within_limit(&self, bytes: Vec<u8>) -> Result<Vec<u8>, BridgeError> {
        if bytes.len() as u64 > self.output_limit {
            return Err(BridgeError::OutputTooLarge {
                program: self.program_name(),
                limit: self.output_limit,
            });
        }
        Ok(bytes)
    }
}

/// Read a stream to EOF, stopping one byte past `limit` so overflow is detectable
async fn drain<R: AsyncRead + Unpin>(stream: Option<R>, limit: u64) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(stream) = stream {
        stream
            .take(limit.saturating_add(1))
            .read_to_end(&mut buf)
            .await?;
    }
    Ok(buf)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_simple_command() {
        let invocation = Invocation::new("echo", "hello");
        let output = invocation
            .run(&TimeoutStrategy::from_millis(5_000))
            .await
            .unwrap();

        assert!(output.success);
        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.stdout_lossy(), "hello\n");
    }

    #[tokio::test]
    async fn test_failed_command_reports_exit_code() {
        let invocation = Invocation::new("false", "ignored");
        let output = invocation
            .run(&TimeoutStrategy::from_millis(5_000))
            .await
            .unwrap();

        assert!(!output.success);
        assert_eq!(output.exit_code, Some(1));
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let invocation = Invocation::new("sleep", "30");
        let started = std::time::Instant::now();
        let err = invocation
            .run(&TimeoutStrategy::from_millis(300))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_read_stdout_returns_payload() {
        let invocation = Invocation::new("echo", "hello");
        let stdout = invocation
            .read_stdout(&TimeoutStrategy::from_millis(5_000))
            .await
            .unwrap();
        assert_eq!(stdout, b"hello\n");
    }

    #[tokio::test]
    async fn test_output_over_limit_is_rejected() {
        let invocation = Invocation::new("echo", "0123456789").with_output_limit(4);

        let err = invocation
            .read_stdout(&TimeoutStrategy::from_millis(5_000))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::OutputTooLarge { limit: 4, .. }));

        let err = invocation
            .run(&TimeoutStrategy::from_millis(5_000))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::OutputTooLarge { limit: 4, .. }));
    }

    #[tokio::test]
    async fn test_output_at_limit_is_accepted() {
        // "abc\n" is exactly four bytes
        let invocation = Invocation::new("echo", "abc").with_output_limit(4);
        let stdout = invocation
            .read_stdout(&TimeoutStrategy::from_millis(5_000))
            .await
            .unwrap();
        assert_eq!(stdout, b"abc\n");
    }

    #[tokio::test]
    async fn test_missing_program() {
        let invocation = Invocation::new("/nonexistent/media-control", "play");
        let err = invocation.spawn().unwrap_err();
        assert!(matches!(err, BridgeError::Spawn { .. }));
    }
}
