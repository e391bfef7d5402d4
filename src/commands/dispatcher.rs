use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::commands::executor::Invocation;
use crate::commands::timeout::TimeoutStrategy;
use crate::media::{Action, BridgeError, FlagVocabulary};

/// Proof that a child was started for an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReceipt {
    pub action: Action,
    pub flag: String,
    pub pid: Option<u32>,
}

/// Result of an action whose child was awaited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub action: Action,
    pub flag: String,
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Maps playback actions to flags and launches the media-control executable
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    executable: PathBuf,
    flags: FlagVocabulary,
    strategy: TimeoutStrategy,
}

impl CommandDispatcher {
    pub fn new(
        executable: impl Into<PathBuf>,
        flags: FlagVocabulary,
        strategy: TimeoutStrategy,
    ) -> Self {
        Self {
            executable: executable.into(),
            flags,
            strategy,
        }
    }

    pub fn flag_for(&self, action: Action) -> &str {
        self.flags.flag_for(action)
    }

    fn invocation(&self, action: Action) -> Invocation {
        Invocation::new(&self.executable, self.flag_for(action))
    }

    /// Spawn the executable for `action` and return without waiting for it.
    ///
    /// Output and exit status are only logged, from a background task that kills
    /// the child once the action deadline passes. Must be called inside a tokio runtime.
    pub fn dispatch(&self, action: Action) -> Result<DispatchReceipt, BridgeError> {
        let invocation = self.invocation(action);
        let child = invocation.spawn()?;
        let pid = child.id();
        info!(%action, flag = invocation.flag(), pid = ?pid, "dispatched action");

        let strategy = self.strategy.clone();
        let flag = invocation.flag().to_string();
        tokio::spawn(async move {
            match invocation.collect(child, &strategy).await {
                Ok(output) => {
                    let stdout = output.stdout_lossy();
                    if !stdout.trim().is_empty() {
                        debug!(%action, stdout = %stdout.trim_end(), "action output");
                    }
                    if !output.success {
                        warn!(
                            %action,
                            exit_code = ?output.exit_code,
                            stderr = %output.stderr_lossy().trim_end(),
                            "action exited unsuccessfully"
                        );
                    }
                }
                Err(e) => warn!(%action, "action did not complete: {}", e),
            }
        });

        Ok(DispatchReceipt { action, flag, pid })
    }

    /// Spawn the executable for `action` and wait for it to exit
    pub async fn dispatch_and_wait(&self, action: Action) -> Result<ActionOutcome, BridgeError> {
        let invocation = self.invocation(action);
        info!(%action, flag = invocation.flag(), "running action");

        let output = invocation.run(&self.strategy).await?;
        let outcome = ActionOutcome {
            action,
            flag: invocation.flag().to_string(),
            exit_code: output.exit_code,
            success: output.success,
            stdout: output.stdout_lossy(),
            stderr: output.stderr_lossy(),
        };

        if !outcome.success {
            warn!(%action, exit_code = ?outcome.exit_code, "action exited unsuccessfully");
        }
        Ok(outcome)
    }
}
