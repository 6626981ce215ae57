use std::io::{self, ErrorKind};
use std::time::Duration;

use async_trait::async_trait;
use sweepr_common::network::target::ProbeTarget;
use sweepr_common::scan::outcome::ProbeOutcome;
use tokio::net::TcpStream;
use tokio::time::error::Elapsed;
use tokio::time::timeout;
use tracing::trace;

use crate::scanner::Prober;

/// Full TCP connect probe. Needs no special privileges.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, target: ProbeTarget, probe_timeout: Duration) -> ProbeOutcome {
        handshake_probe(target, probe_timeout).await
    }
}

/// Attempts one connection to `target` and classifies the result.
///
/// The stream is dropped, and therefore closed, as soon as the handshake
/// completes. No retries.
pub async fn handshake_probe(target: ProbeTarget, probe_timeout: Duration) -> ProbeOutcome {
    let attempt = timeout(probe_timeout, TcpStream::connect(target.socket_addr())).await;
    let outcome: ProbeOutcome = classify_attempt(attempt);
    trace!(%target, %outcome, "probe finished");
    outcome
}

fn classify_attempt<S>(attempt: Result<io::Result<S>, Elapsed>) -> ProbeOutcome {
    match attempt {
        Ok(Ok(_stream)) => ProbeOutcome::Open,
        Ok(Err(err)) => classify_error(&err),
        Err(_elapsed) => ProbeOutcome::Filtered,
    }
}

fn classify_error(err: &io::Error) -> ProbeOutcome {
    match err.kind() {
        ErrorKind::ConnectionRefused => ProbeOutcome::Closed,
        // The OS gave up waiting before we did.
        ErrorKind::TimedOut => ProbeOutcome::Filtered,
        _ => ProbeOutcome::Error(err.to_string()),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
