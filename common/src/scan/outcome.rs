use std::fmt;

use serde::Serialize;

/// Classification of a single connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum ProbeOutcome {
    /// The handshake completed.
    Open,
    /// The peer answered with a reset.
    Closed,
    /// Nothing came back before the timeout.
    Filtered,
    /// Any other I/O failure, with a human readable cause.
    Error(String),
}

impl ProbeOutcome {
    pub fn is_open(&self) -> bool {
        matches!(self, ProbeOutcome::Open)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProbeOutcome::Open => "open",
            ProbeOutcome::Closed => "closed",
            ProbeOutcome::Filtered => "filtered",
            ProbeOutcome::Error(_) => "error",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Error(reason) => write!(f, "error ({reason})"),
            other => f.write_str(other.label()),
        }
    }
}
