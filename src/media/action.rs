use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::media::BridgeError;

/// Playback command forwarded to the media-control executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Play,
    Pause,
    Next,
    Previous,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Play, Action::Pause, Action::Next, Action::Previous];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Play => "play",
            Action::Pause => "pause",
            Action::Next => "next",
            Action::Previous => "previous",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "play" => Ok(Action::Play),
            "pause" => Ok(Action::Pause),
            "next" => Ok(Action::Next),
            "prev" | "previous" => Ok(Action::Previous),
            other => Err(BridgeError::UnknownAction(other.to_string())),
        }
    }
}

/// Command-line flags understood by a particular build of the media-control executable.
///
/// Deployments disagree on these strings, so they are always taken from
/// configuration. The defaults match the executable's own CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagVocabulary {
    pub status: String,
    pub play: String,
    pub pause: String,
    pub next: String,
    pub previous: String,
}

impl Default for FlagVocabulary {
    fn default() -> Self {
        Self {
            status: "current-json".to_string(),
            play: "play".to_string(),
            pause: "pause".to_string(),
            next: "next".to_string(),
            previous: "previous".to_string(),
        }
    }
}

impl FlagVocabulary {
    pub fn flag_for(&self, action: Action) -> &str {
        match action {
            Action::Play => &self.play,
            Action::Pause => &self.pause,
            Action::Next => &self.next,
            Action::Previous => &self.previous,
        }
    }

    pub fn status_flag(&self) -> &str {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn custom_vocabulary() -> FlagVocabulary {
        FlagVocabulary {
            status: "--status".to_string(),
            play: "--resume".to_string(),
            pause: "--hold".to_string(),
            next: "--skip".to_string(),
            previous: "--back".to_string(),
        }
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!("play".parse::<Action>().unwrap(), Action::Play);
        assert_eq!("pause".parse::<Action>().unwrap(), Action::Pause);
        assert_eq!("next".parse::<Action>().unwrap(), Action::Next);
        assert_eq!("prev".parse::<Action>().unwrap(), Action::Previous);
        assert_eq!("previous".parse::<Action>().unwrap(), Action::Previous);
        assert_eq!(" PLAY ".parse::<Action>().unwrap(), Action::Play);
    }

    #[test]
    fn test_parse_unknown_action() {
        let err = "stop".parse::<Action>().unwrap_err();
        assert!(matches!(err, BridgeError::UnknownAction(ref s) if s == "stop"));
    }

    #[test]
    fn test_default_flags_match_executable_cli() {
        let flags = FlagVocabulary::default();
        assert_eq!(flags.flag_for(Action::Play), "play");
        assert_eq!(flags.flag_for(Action::Pause), "pause");
        assert_eq!(flags.flag_for(Action::Next), "next");
        assert_eq!(flags.flag_for(Action::Previous), "previous");
        assert_eq!(flags.status_flag(), "current-json");
    }

    #[test]
    fn test_every_action_maps_to_its_own_flag() {
        let flags = custom_vocabulary();
        assert_eq!(flags.flag_for(Action::Play), "--resume");
        assert_eq!(flags.flag_for(Action::Pause), "--hold");
        assert_eq!(flags.flag_for(Action::Next), "--skip");
        assert_eq!(flags.flag_for(Action::Previous), "--back");

        let distinct: HashSet<&str> = Action::ALL.iter().map(|a| flags.flag_for(*a)).collect();
        assert_eq!(distinct.len(), Action::ALL.len());
        assert!(!distinct.contains(flags.status_flag()));
    }

    #[test]
    fn test_partial_vocabulary_keeps_defaults() {
        let flags: FlagVocabulary = serde_json::from_str(r#"{"previous": "prev"}"#).unwrap();
        assert_eq!(flags.previous, "prev");
        assert_eq!(flags.play, "play");
        assert_eq!(flags.status, "current-json");
    }
}
