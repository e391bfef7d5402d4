//! Media-control bridge: playback actions, the flag vocabulary, and status payloads.

mod action;
mod bridge;
mod error;
mod status;

pub use action::{Action, FlagVocabulary};
pub use bridge::{ActionReport, MediaBridge};
pub use error::BridgeError;
pub use status::PlaybackStatus;
