use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("status output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("status output is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
    #[error("{program} wrote more than {limit} bytes")]
    OutputTooLarge { program: String, limit: u64 },
    #[error("{program} {flag} did not finish within {timeout_ms}ms")]
    Timeout {
        program: String,
        flag: String,
        timeout_ms: u64,
    },
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

impl BridgeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::Timeout { .. })
    }

    /// Output reached us but could not be turned into a status payload
    pub fn is_bad_output(&self) -> bool {
        matches!(
            self,
            BridgeError::Parse(_) | BridgeError::NotAnObject(_) | BridgeError::OutputTooLarge { .. }
        )
    }
}
