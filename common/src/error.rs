use thiserror::Error;

/// Failure to turn user input into an [`AddressRange`](crate::network::range::AddressRange).
///
/// This is the only error a scan can surface to its caller. Per-target
/// failures are recorded in the report as
/// [`ProbeOutcome::Error`](crate::scan::outcome::ProbeOutcome::Error) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid range '{input}': {reason}")]
    InvalidRange { input: String, reason: String },
}

impl RangeError {
    pub(crate) fn invalid(input: &str, reason: impl Into<String>) -> Self {
        RangeError::InvalidRange {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// The string that failed to parse.
    pub fn input(&self) -> &str {
        match self {
            RangeError::InvalidRange { input, .. } => input,
        }
    }
}
