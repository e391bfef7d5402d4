use std::path::PathBuf;

use tracing::{debug, warn};

use crate::commands::executor::Invocation;
use crate::commands::timeout::TimeoutStrategy;
use crate::media::{BridgeError, PlaybackStatus};

/// Asks the media-control executable what is currently playing
#[derive(Debug, Clone)]
pub struct StatusQuery {
    invocation: Invocation,
    strategy: TimeoutStrategy,
}

impl StatusQuery {
    pub fn new(
        executable: impl Into<PathBuf>,
        status_flag: impl Into<String>,
        strategy: TimeoutStrategy,
    ) -> Self {
        Self {
            invocation: Invocation::new(executable, status_flag),
            strategy,
        }
    }

    /// Maximum size of the status payload in bytes
    pub fn with_output_limit(mut self, limit: u64) -> Self {
        self.invocation = self.invocation.with_output_limit(limit);
        self
    }

    /// Run the status invocation and parse everything it wrote once stdout has closed.
    ///
    /// The child's exit status and stderr do not gate the result; they are logged
    /// when they become available.
    pub async fn run(&self) -> Result<PlaybackStatus, BridgeError> {
        let stdout = self.invocation.read_stdout(&self.strategy).await?;

        let status = PlaybackStatus::from_slice(&stdout).map_err(|e| {
            warn!(bytes = stdout.len(), "unreadable status output: {}", e);
            e
        })?;
        if status.is_empty() {
            debug!("status payload has no fields");
        }
        Ok(status)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_status_from_echo() {
        // echo writes its argument back, so the "flag" doubles as the payload
        let query = StatusQuery::new(
            "echo",
            r#"{"title":"Song A","artist":"Artist B"}"#,
            TimeoutStrategy::from_millis(5_000),
        );
        let status = query.run().await.unwrap();
        assert_eq!(status.get_str("title"), Some("Song A"));
        assert_eq!(status.get_str("artist"), Some("Artist B"));
    }

    #[tokio::test]
    async fn test_status_invalid_output() {
        let query = StatusQuery::new("echo", "not json", TimeoutStrategy::from_millis(5_000));
        let err = query.run().await.unwrap_err();
        assert!(matches!(err, BridgeError::Parse(_)));
    }

    #[tokio::test]
    async fn test_status_over_limit() {
        let query = StatusQuery::new(
            "echo",
            r#"{"title":"a very long title"}"#,
            TimeoutStrategy::from_millis(5_000),
        )
        .with_output_limit(8);
        let err = query.run().await.unwrap_err();
        assert!(matches!(err, BridgeError::OutputTooLarge { limit: 8, .. }));
        assert!(err.is_bad_output());
    }

    #[tokio::test]
    async fn test_status_missing_executable() {
        let query = StatusQuery::new(
            "/nonexistent/media-control",
            "current-json",
            TimeoutStrategy::from_millis(5_000),
        );
        let err = query.run().await.unwrap_err();
        assert!(matches!(err, BridgeError::Spawn { .. }));
    }
}
