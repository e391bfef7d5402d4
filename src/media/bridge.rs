use crate::agent::config::Config;
use crate::commands::{ActionOutcome, CommandDispatcher, DispatchReceipt, StatusQuery};
use crate::media::{Action, BridgeError, PlaybackStatus};

/// What happened to a requested action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionReport {
    /// Child spawned, exit status not observed
    Dispatched(DispatchReceipt),
    /// Child awaited to exit
    Completed(ActionOutcome),
}

impl ActionReport {
    /// False only when the child was awaited and exited unsuccessfully
    pub fn succeeded(&self) -> bool {
        match self {
            ActionReport::Dispatched(_) => true,
            ActionReport::Completed(outcome) => outcome.success,
        }
    }
}

/// Entry point used by the HTTP layer and the CLI
#[derive(Debug, Clone)]
pub struct MediaBridge {
    dispatcher: CommandDispatcher,
    status: StatusQuery,
    await_action_exit: bool,
}

impl MediaBridge {
    pub fn new(config: &Config) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(
                &config.executable,
                config.flags.clone(),
                config.action_timeout.clone(),
            ),
            status: StatusQuery::new(
                &config.executable,
                config.flags.status_flag(),
                config.status_timeout.clone(),
            )
            .with_output_limit(config.max_status_bytes),
            await_action_exit: config.await_action_exit,
        }
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    /// Run `action`, waiting for the child only when configured to
    pub async fn perform(&self, action: Action) -> Result<ActionReport, BridgeError> {
        if self.await_action_exit {
            self.dispatcher
                .dispatch_and_wait(action)
                .await
                .map(ActionReport::Completed)
        } else {
            self.dispatcher.dispatch(action).map(ActionReport::Dispatched)
        }
    }

    pub async fn status(&self) -> Result<PlaybackStatus, BridgeError> {
        self.status.run().await
    }
}
