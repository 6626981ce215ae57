use std::time::Duration;

/// Port probed when the caller does not configure any.
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_CONCURRENCY: usize = 256;

/// Output settings for the command line front end.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Hides the banner printed on startup.
    pub no_banner: bool,
    /// `0` prints everything, `1` drops banners and headers,
    /// `2` prints only the active hosts.
    pub quiet: u8,
    /// Prints the report as JSON instead of text.
    pub json: bool,
}

/// Everything a scan needs besides the range itself.
///
/// Values are always passed in explicitly; nothing here is read from the
/// environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub ports: Vec<u16>,
    /// Upper bound for a single connection attempt.
    pub timeout: Duration,
    /// Maximum number of probes in flight at once.
    pub concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ports: vec![DEFAULT_PORT],
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}
