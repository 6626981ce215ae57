use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sweepr_common::network::target::ProbeTarget;
use sweepr_common::scan::outcome::ProbeOutcome;
use sweepr_common::scan::report::ScanReport;

use super::ProgressFn;

/// The only shared mutable state of a scan.
///
/// Probe tasks write through [`Collector::record`] one at a time. The lock is
/// never held across an await point or while the progress callback runs.
pub(super) struct Collector {
    outcomes: Mutex<BTreeMap<ProbeTarget, ProbeOutcome>>,
    on_outcome: Option<Arc<ProgressFn>>,
}

impl Collector {
    pub(super) fn new(on_outcome: Option<Arc<ProgressFn>>) -> Self {
        Self {
            outcomes: Mutex::new(BTreeMap::new()),
            on_outcome,
        }
    }

    /// Stores the outcome for `target`. The first outcome for a target wins.
    pub(super) fn record(&self, target: ProbeTarget, outcome: ProbeOutcome) {
        let notify: Option<ProbeOutcome> = self.on_outcome.as_ref().map(|_| outcome.clone());

        let count: usize = {
            let mut outcomes = self.lock();
            if outcomes.contains_key(&target) {
                return;
            }
            outcomes.insert(target, outcome);
            outcomes.len()
        };

        if let (Some(on_outcome), Some(outcome)) = (&self.on_outcome, notify) {
            on_outcome(&target, &outcome, count);
        }
    }

    pub(super) fn contains(&self, target: &ProbeTarget) -> bool {
        self.lock().contains_key(target)
    }

    pub(super) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Moves everything recorded so far into a frozen report.
    pub(super) fn freeze(&self, job_size: u128, partial: bool, elapsed: Duration) -> ScanReport {
        let outcomes: BTreeMap<ProbeTarget, ProbeOutcome> = std::mem::take(&mut *self.lock());
        ScanReport::freeze(outcomes, job_size, partial, elapsed)
    }

    // A panicking prober cannot leave the map half-written, so poison is ignored.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<ProbeTarget, ProbeOutcome>> {
        self.outcomes.lock().unwrap_or_else(PoisonError::into_inner)
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn target(d: u8) -> ProbeTarget {
        ProbeTarget::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, d)), 80)
    }

    #[test]
    fn first_outcome_wins() {
        let collector = Collector::new(None);
        collector.record(target(1), ProbeOutcome::Open);
        collector.record(target(1), ProbeOutcome::Closed);

        assert_eq!(collector.len(), 1);
        let report = collector.freeze(1, false, Duration::ZERO);
        assert_eq!(report.outcome(&target(1)), Some(&ProbeOutcome::Open));
    }

    #[test]
    fn freeze_drains_in_target_order() {
        let collector = Collector::new(None);
        for d in [9, 3, 5] {
            collector.record(target(d), ProbeOutcome::Filtered);
        }

        let report = collector.freeze(3, false, Duration::ZERO);
        let order: Vec<ProbeTarget> = report.entries().iter().map(|e| e.target).collect();
        assert_eq!(order, vec![target(3), target(5), target(9)]);
        assert_eq!(collector.len(), 0);
    }

    #[test]
    fn callback_skips_duplicates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let on_outcome: Arc<ProgressFn> = Arc::new(move |_: &ProbeTarget, _: &ProbeOutcome, _: usize| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let collector = Collector::new(Some(on_outcome));

        collector.record(target(1), ProbeOutcome::Open);
        collector.record(target(1), ProbeOutcome::Open);
        collector.record(target(2), ProbeOutcome::Closed);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
