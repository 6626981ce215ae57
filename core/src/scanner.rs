//! The central **abstraction** for scanning operations.
//!
//! A [`Prober`] classifies one `address:port` pair. The [`Scanner`] drives a
//! prober across every target of a [`ScanJob`] with a fixed ceiling on
//! concurrent probes and freezes the outcomes into a [`ScanReport`].
//!
//! **Architectural Note:**
//! The coordinator only ever talks to the [`Prober`] trait. The production
//! implementation is [`TcpProber`]; tests substitute instrumented stubs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sweepr_common::config::ScanConfig;
use sweepr_common::network::target::ProbeTarget;
use sweepr_common::scan::job::ScanJob;
use sweepr_common::scan::outcome::ProbeOutcome;
use sweepr_common::scan::report::ScanReport;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::network::tcp::TcpProber;

mod collector;

use collector::Collector;

/// Called once per recorded outcome with the running count of outcomes.
pub type ProgressFn = dyn Fn(&ProbeTarget, &ProbeOutcome, usize) + Send + Sync;

/// Classifies a single target.
///
/// Implementations must hold no shared mutable state: the scanner calls
/// `probe` from many tasks at once.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: ProbeTarget, timeout: Duration) -> ProbeOutcome;
}

/// Bounded, cancellable coordinator over a [`Prober`].
pub struct Scanner<P: ?Sized> {
    prober: Arc<P>,
    on_outcome: Option<Arc<ProgressFn>>,
}

impl<P: Prober + 'static> Scanner<P> {
    pub fn new(prober: P) -> Self {
        Self::from_arc(Arc::new(prober))
    }
}

impl<P: Prober + ?Sized + 'static> Scanner<P> {
    pub fn from_arc(prober: Arc<P>) -> Self {
        Self {
            prober,
            on_outcome: None,
        }
    }

    /// Registers a callback invoked for every recorded outcome.
    pub fn with_progress<F>(mut self, on_outcome: F) -> Self
    where
        F: Fn(&ProbeTarget, &ProbeOutcome, usize) + Send + Sync + 'static,
    {
        self.on_outcome = Some(Arc::new(on_outcome));
        self
    }

    /// Probes every target of `job` and returns the complete report.
    pub async fn scan(
        &self,
        job: &ScanJob,
        concurrency_limit: usize,
        timeout: Duration,
    ) -> ScanReport {
        self.scan_with_cancellation(job, concurrency_limit, timeout, CancellationToken::new())
            .await
    }

    /// Like [`Scanner::scan`], but stops as soon as `cancel` fires.
    ///
    /// No target is dispatched after cancellation and in-flight probes are
    /// aborted. The returned report then holds exactly the outcomes recorded
    /// before that point and is marked partial.
    pub async fn scan_with_cancellation(
        &self,
        job: &ScanJob,
        concurrency_limit: usize,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> ScanReport {
        let started: Instant = Instant::now();
        let job_size: usize = usize::try_from(job.len()).unwrap_or(usize::MAX);
        let limit: usize = concurrency_limit
            .min(job_size)
            .clamp(1, Semaphore::MAX_PERMITS);
        let semaphore: Arc<Semaphore> = Arc::new(Semaphore::new(limit));
        let collector: Arc<Collector> = Arc::new(Collector::new(self.on_outcome.clone()));
        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut cancelled: bool = false;
        let mut failed_tasks: usize = 0;

        info!(
            range = %job.range(),
            ports = ?job.ports(),
            targets = %job.len(),
            limit,
            ?timeout,
            "starting scan"
        );

        for target in job.targets() {
            while let Some(joined) = tasks.try_join_next() {
                failed_tasks += count_failure(joined);
            }

            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_closed) => break,
                },
            };

            trace!(%target, "dispatching probe");
            let prober: Arc<P> = Arc::clone(&self.prober);
            let collector: Arc<Collector> = Arc::clone(&collector);
            let cancel: CancellationToken = cancel.clone();

            tasks.spawn(async move {
                let _permit = permit;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {}
                    outcome = prober.probe(target, timeout) => collector.record(target, outcome),
                }
            });
        }

        if cancelled {
            tasks.abort_all();
        }

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled(), if !cancelled => {
                    cancelled = true;
                    tasks.abort_all();
                }
                joined = tasks.join_next() => match joined {
                    Some(joined) => failed_tasks += count_failure(joined),
                    None => break,
                },
            }
        }

        if failed_tasks > 0 && !cancelled {
            warn!(failed_tasks, "recording failed probe tasks as errors");
            for target in job.targets() {
                if !collector.contains(&target) {
                    collector.record(target, ProbeOutcome::Error("probe task failed".to_string()));
                }
            }
        }

        let recorded: usize = collector.len();
        let partial: bool = cancelled && (recorded as u128) < job.len();
        let report: ScanReport = collector.freeze(job.len(), partial, started.elapsed());

        if partial {
            warn!(recorded, targets = %job.len(), "scan cancelled, returning partial report");
        }
        let summary = report.summary();
        info!(
            open = summary.open,
            closed = summary.closed,
            filtered = summary.filtered,
            error = summary.error,
            elapsed = ?report.elapsed(),
            "scan finished"
        );

        report
    }
}

/// Runs `job` with the TCP connect prober and the limits from `cfg`.
pub async fn perform_scan(
    job: &ScanJob,
    cfg: &ScanConfig,
    cancel: CancellationToken,
    on_outcome: Option<Box<ProgressFn>>,
) -> ScanReport {
    let mut scanner: Scanner<TcpProber> = Scanner::new(TcpProber);
    scanner.on_outcome = on_outcome.map(Arc::from);
    scanner
        .scan_with_cancellation(job, cfg.concurrency, cfg.timeout, cancel)
        .await
}

fn count_failure(joined: Result<(), JoinError>) -> usize {
    match joined {
        Err(err) if err.is_panic() => {
            debug!("probe task panicked: {err}");
            1
        }
        _ => 0,
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
