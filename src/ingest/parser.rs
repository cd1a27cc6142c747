//! Interaction log line grammar
//!
//! ```text
//! <time> <ip> <l|u> "<artist>" "<title>"
//! ```
//!
//! Fields are separated by one or more whitespace characters. The artist
//! field ends at the first quote followed by whitespace and a quote, so the
//! title may itself contain quotes.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::models::{InteractionRecord, Toggle};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line does not match `<time> <ip> <l|u> \"<artist>\" \"<title>\"`")]
    Malformed,
    #[error("unknown toggle `{0}`, expected `l` or `u`")]
    InvalidToggle(String),
    #[error("unparseable timestamp `{0}`")]
    InvalidTimestamp(String),
}

static LINE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn line_pattern() -> &'static Regex {
    LINE_PATTERN.get_or_init(|| {
        Regex::new(r#"^(\S+)\s+(\S+)\s+(\S+)\s+"(.*?)"\s+"(.*)"$"#)
            .expect("line pattern is a valid regex")
    })
}

/// Parse one raw log line
///
/// Never panics on malformed input; the caller decides how to count the
/// rejection.
pub fn parse_line(line: &str) -> Result<InteractionRecord, ParseError> {
    let caps = line_pattern()
        .captures(line.trim())
        .ok_or(ParseError::Malformed)?;

    let toggle_token = &caps[3];
    let toggle = Toggle::from_token(toggle_token)
        .ok_or_else(|| ParseError::InvalidToggle(toggle_token.to_string()))?;

    Ok(InteractionRecord {
        time: caps[1].to_string(),
        ip: caps[2].to_string(),
        toggle,
        artist: caps[4].trim().to_string(),
        title: caps[5].trim().to_string(),
    })
}
