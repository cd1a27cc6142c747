use serde::{Deserialize, Serialize};
use std::fmt;

/// Like or unlike action recorded against a song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Toggle {
    Like,
    Unlike,
}

impl Toggle {
    /// Parse the single-letter log token (`l` or `u`)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "l" => Some(Toggle::Like),
            "u" => Some(Toggle::Unlike),
            _ => None,
        }
    }

    /// Signed contribution to a song's net count
    pub fn delta(self) -> i64 {
        match self {
            Toggle::Like => 1,
            Toggle::Unlike => -1,
        }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Toggle::Like => f.write_str("l"),
            Toggle::Unlike => f.write_str("u"),
        }
    }
}

/// One parsed line of the interaction log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// ISO-8601 date and time as it appeared in the log
    pub time: String,

    /// Client address exactly as logged
    pub ip: String,

    pub toggle: Toggle,

    pub artist: String,

    pub title: String,
}
