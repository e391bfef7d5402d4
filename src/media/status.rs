use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::media::BridgeError;

/// Currently playing item as reported by the executable.
///
/// The object is kept verbatim; no schema is enforced beyond it being a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackStatus(Map<String, Value>);

impl PlaybackStatus {
    /// Parse the complete stdout of a status invocation
    pub fn from_slice(bytes: &[u8]) -> Result<Self, BridgeError> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(map) => Ok(Self(map)),
            Value::Array(_) => Err(BridgeError::NotAnObject("array")),
            Value::String(_) => Err(BridgeError::NotAnObject("string")),
            Value::Number(_) => Err(BridgeError::NotAnObject("number")),
            Value::Bool(_) => Err(BridgeError::NotAnObject("boolean")),
            Value::Null => Err(BridgeError::NotAnObject("null")),
        }
    }

    /// String value for `key`, if present and a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
