//! Sampling cadence and snapshot fan-out.
//!
//! - [`Scheduler`]: self-rescheduling tick. The next tick is armed only
//!   when the current one completes, so ticks never overlap.
//! - [`SamplerWorker`]: optional background thread that takes snapshots on
//!   request and hands them back over a channel.
//! - [`Sampler`]: the scheduler plus either an inline source or a worker.
//! - [`Telemetry`]: applies each snapshot to the rate converter and the
//!   series store, retaining it as the previous snapshot.

use crate::monitor::config::ChartsConfig;
use crate::monitor::error::{MonitorError, Result};
use crate::monitor::rate::{self, NetworkRates};
use crate::monitor::series::{SeriesId, SeriesStore};
use crate::monitor::types::{MetricSource, Snapshot};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// How often the loop polls for a worker result while a tick is in flight.
const IN_FLIGHT_POLL: Duration = Duration::from_millis(20);

/// Fixed-period, non-overlapping tick.
#[derive(Debug, Clone)]
pub struct Scheduler {
    period: Duration,
    next_due: Instant,
    in_flight: bool,
}

impl Scheduler {
    /// Creates a scheduler whose first tick is due at `now`.
    #[must_use]
    pub fn new(period: Duration, now: Instant) -> Self {
        Self { period, next_due: now, in_flight: false }
    }

    /// Sampling period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns true while a tick has begun but not completed.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Returns true when a new tick should begin.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        !self.in_flight && now >= self.next_due
    }

    /// Marks a tick in flight. Returns false (and does nothing) if no tick
    /// is due.
    pub fn begin(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Completes the in-flight tick and arms the next one at `now + period`.
    pub fn complete(&mut self, now: Instant) {
        self.in_flight = false;
        self.next_due = now + self.period;
    }

    /// How long the event loop may block before the scheduler needs it.
    #[must_use]
    pub fn timeout(&self, now: Instant) -> Duration {
        if self.in_flight {
            return IN_FLIGHT_POLL.min(self.period);
        }
        self.next_due.saturating_duration_since(now)
    }
}

/// Background thread that samples a [`MetricSource`] on request.
///
/// Dropping the worker closes the request channel and joins the thread.
#[derive(Debug)]
pub struct SamplerWorker {
    requests: Option<Sender<()>>,
    results: Receiver<Snapshot>,
    handle: Option<JoinHandle<()>>,
}

impl SamplerWorker {
    /// Moves `source` onto a new thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn<S: MetricSource + 'static>(mut source: S) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<()>();
        let (result_tx, result_rx) = mpsc::channel();

        let handle = std::thread::Builder::new()
            .name("hostpulse-sampler".to_string())
            .spawn(move || {
                tracing::debug!("sampler worker started");
                while request_rx.recv().is_ok() {
                    if result_tx.send(source.sample()).is_err() {
                        break;
                    }
                }
                tracing::debug!("sampler worker stopped");
            })
            .map_err(|e| MonitorError::CollectionFailed {
                collector: "sampler",
                message: format!("failed to spawn worker: {e}"),
            })?;

        Ok(Self { requests: Some(request_tx), results: result_rx, handle: Some(handle) })
    }

    /// Asks the worker for one snapshot. Returns false if the worker is gone.
    pub fn request(&self) -> bool {
        self.requests.as_ref().is_some_and(|tx| tx.send(()).is_ok())
    }

    /// Takes a finished snapshot without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread has exited.
    pub fn try_recv(&self) -> Result<Option<Snapshot>> {
        match self.results.try_recv() {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(MonitorError::CollectionFailed {
                collector: "sampler",
                message: "worker thread exited".to_string(),
            }),
        }
    }

    /// Stops the worker and waits for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("sampler worker panicked");
            }
        }
    }
}

impl Drop for SamplerWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Where snapshots come from.
enum Acquisition {
    Inline(Box<dyn MetricSource>),
    Worker(SamplerWorker),
    Stopped,
}

impl std::fmt::Debug for Acquisition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("Inline"),
            Self::Worker(w) => f.debug_tuple("Worker").field(w).finish(),
            Self::Stopped => f.write_str("Stopped"),
        }
    }
}

/// Scheduler plus snapshot acquisition, driven from the event loop.
#[derive(Debug)]
pub struct Sampler {
    scheduler: Scheduler,
    acquisition: Acquisition,
}

impl Sampler {
    /// Samples on the calling thread.
    #[must_use]
    pub fn inline<S: MetricSource + 'static>(source: S, period: Duration, now: Instant) -> Self {
        Self {
            scheduler: Scheduler::new(period, now),
            acquisition: Acquisition::Inline(Box::new(source)),
        }
    }

    /// Samples on a background worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn background<S: MetricSource + 'static>(
        source: S,
        period: Duration,
        now: Instant,
    ) -> Result<Self> {
        Ok(Self {
            scheduler: Scheduler::new(period, now),
            acquisition: Acquisition::Worker(SamplerWorker::spawn(source)?),
        })
    }

    /// The underlying scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// How long the loop may wait for input before calling [`Sampler::poll`].
    #[must_use]
    pub fn timeout(&self, now: Instant) -> Duration {
        self.scheduler.timeout(now)
    }

    /// Advances acquisition. Returns a snapshot once one is ready; the
    /// caller applies it and then calls [`Sampler::complete`].
    pub fn poll(&mut self, now: Instant) -> Option<Snapshot> {
        match &mut self.acquisition {
            Acquisition::Inline(source) => {
                if self.scheduler.begin(now) {
                    Some(source.sample())
                } else {
                    None
                }
            }
            Acquisition::Worker(worker) => {
                if self.scheduler.begin(now) && !worker.request() {
                    tracing::error!("sampler worker is gone, sampling stopped");
                    self.acquisition = Acquisition::Stopped;
                    return None;
                }
                match worker.try_recv() {
                    Ok(snapshot) => snapshot,
                    Err(err) => {
                        tracing::error!(error = %err, "sampling stopped");
                        self.acquisition = Acquisition::Stopped;
                        None
                    }
                }
            }
            Acquisition::Stopped => None,
        }
    }

    /// Completes the current tick after its effects were applied.
    pub fn complete(&mut self, now: Instant) {
        self.scheduler.complete(now);
    }

    /// Cancels any background worker.
    pub fn shutdown(&mut self) {
        if let Acquisition::Worker(worker) =
            std::mem::replace(&mut self.acquisition, Acquisition::Stopped)
        {
            worker.shutdown();
        }
    }
}

/// What the CPU chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpuTarget {
    /// Mean of all cores.
    #[default]
    Average,
    /// One core by index.
    Core(usize),
}

/// Per-tick fan-out: rates, series, previous snapshot.
///
/// Rates are computed against the last snapshot that carried network
/// counters, so a tick without network data blanks the rate for that tick
/// only.
#[derive(Debug)]
pub struct Telemetry {
    series: SeriesStore,
    previous: Option<Snapshot>,
    /// Timestamp and network counters of the last snapshot that had them.
    rate_base: Option<Snapshot>,
    rates: Option<NetworkRates>,
    cpu_target: CpuTarget,
    ticks: u64,
}

impl Telemetry {
    /// Creates empty telemetry with the configured chart capacities.
    #[must_use]
    pub fn new(charts: &ChartsConfig) -> Self {
        Self {
            series: SeriesStore::new(charts),
            previous: None,
            rate_base: None,
            rates: None,
            cpu_target: CpuTarget::Average,
            ticks: 0,
        }
    }

    /// Applies one snapshot.
    pub fn apply(&mut self, snapshot: Snapshot) {
        let at = snapshot.timestamp;

        self.rates = rate::convert(self.rate_base.as_ref(), &snapshot);
        if let Some(rates) = &self.rates {
            self.series.push(SeriesId::NetRx, at, rates.total.rx_per_sec);
            self.series.push(SeriesId::NetTx, at, rates.total.tx_per_sec);
        }
        if let Some(network) = &snapshot.network {
            let mut base = Snapshot::empty(at);
            base.network = Some(network.clone());
            self.rate_base = Some(base);
        }

        let cpu = match self.cpu_target {
            CpuTarget::Average => snapshot.cpu_average(),
            CpuTarget::Core(i) => snapshot.cpu.as_ref().and_then(|cores| cores.get(i).copied()),
        };
        if let Some(value) = cpu {
            self.series.push(SeriesId::Cpu, at, value);
        }

        if let Some(percent) = snapshot.memory.and_then(|m| m.used_percent()) {
            self.series.push(SeriesId::Memory, at, percent);
        }

        let missing = snapshot.missing();
        if !missing.is_empty() {
            tracing::trace!(?missing, "partial snapshot");
        }

        self.previous = Some(snapshot);
        self.ticks += 1;
    }

    /// Changes what the CPU chart plots. A change discards the chart's
    /// history, since it belonged to another entity.
    pub fn select_cpu(&mut self, target: CpuTarget) {
        if target != self.cpu_target {
            self.cpu_target = target;
            self.series.clear(SeriesId::Cpu);
        }
    }

    /// Current CPU chart target.
    #[must_use]
    pub fn cpu_target(&self) -> CpuTarget {
        self.cpu_target
    }

    /// The series store.
    #[must_use]
    pub fn series(&self) -> &SeriesStore {
        &self.series
    }

    /// The most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Rates derived on the most recent tick.
    #[must_use]
    pub fn rates(&self) -> Option<&NetworkRates> {
        self.rates.as_ref()
    }

    /// Number of snapshots applied.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::types::{InterfaceCounters, MemoryUsage};
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    struct CountingSource {
        count: usize,
    }

    impl MetricSource for CountingSource {
        fn sample(&mut self) -> Snapshot {
            self.count += 1;
            let mut snap = Snapshot::empty(Instant::now());
            snap.cpu = Some(vec![self.count as f64]);
            snap
        }
    }

    fn snapshot_with(at: Instant, cpu: Vec<f64>, mem_used: u64, rx: u64) -> Snapshot {
        let mut snap = Snapshot::empty(at);
        snap.cpu = Some(cpu);
        snap.memory = Some(MemoryUsage { used_bytes: mem_used, total_bytes: 100 });
        snap.network = Some(BTreeMap::from([(
            "eth0".to_string(),
            InterfaceCounters { rx_bytes: rx, tx_bytes: 0 },
        )]));
        snap
    }

    #[test]
    fn test_scheduler_first_tick_due_immediately() {
        let now = Instant::now();
        let scheduler = Scheduler::new(Duration::from_millis(500), now);
        assert!(scheduler.is_due(now));
        assert_eq!(scheduler.timeout(now), Duration::ZERO);
    }

    #[test]
    fn test_scheduler_never_overlaps() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(Duration::from_millis(100), t0);

        assert!(scheduler.begin(t0));
        assert!(scheduler.in_flight());
        assert!(!scheduler.is_due(t0 + Duration::from_secs(10)));
        assert!(!scheduler.begin(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_scheduler_reschedules_from_completion() {
        let t0 = Instant::now();
        let period = Duration::from_millis(100);
        let mut scheduler = Scheduler::new(period, t0);

        scheduler.begin(t0);
        let done = t0 + Duration::from_millis(250);
        scheduler.complete(done);

        assert!(!scheduler.is_due(done + Duration::from_millis(99)));
        assert!(scheduler.is_due(done + period));
        assert_eq!(scheduler.timeout(done), period);
    }

    #[test]
    fn test_scheduler_timeout_while_in_flight() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(Duration::from_secs(1), t0);
        scheduler.begin(t0);
        assert_eq!(scheduler.timeout(t0), IN_FLIGHT_POLL);
    }

    #[test]
    fn test_inline_sampler_one_snapshot_per_tick() {
        let t0 = Instant::now();
        let mut sampler = Sampler::inline(CountingSource { count: 0 }, Duration::from_secs(1), t0);

        let first = sampler.poll(t0).unwrap();
        assert_eq!(first.cpu, Some(vec![1.0]));
        assert!(sampler.poll(t0).is_none(), "in flight until completed");

        sampler.complete(t0);
        assert!(sampler.poll(t0 + Duration::from_millis(500)).is_none());
        assert!(sampler.poll(t0 + Duration::from_secs(1)).is_some());
    }

    #[test]
    fn test_worker_round_trip_and_shutdown() {
        let worker = SamplerWorker::spawn(CountingSource { count: 0 }).unwrap();
        assert!(worker.request());

        let snapshot = loop {
            if let Some(s) = worker.try_recv().unwrap() {
                break s;
            }
            std::thread::sleep(Duration::from_millis(1));
        };
        assert_eq!(snapshot.cpu, Some(vec![1.0]));

        worker.shutdown();
    }

    #[test]
    fn test_background_sampler_delivers() {
        let t0 = Instant::now();
        let mut sampler =
            Sampler::background(CountingSource { count: 0 }, Duration::from_secs(1), t0).unwrap();

        let mut got = sampler.poll(t0);
        for _ in 0..1000 {
            if got.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
            got = sampler.poll(Instant::now());
        }
        assert!(got.is_some());
        sampler.shutdown();
        assert!(sampler.poll(Instant::now()).is_none());
    }

    #[test]
    fn test_telemetry_first_tick_has_no_rates() {
        let mut telemetry = Telemetry::new(&ChartsConfig::default());
        telemetry.apply(snapshot_with(Instant::now(), vec![10.0, 30.0], 40, 1000));

        assert!(telemetry.rates().is_none());
        assert!(telemetry.series().get(SeriesId::NetRx).is_empty());
        assert_eq!(telemetry.series().get(SeriesId::Cpu).latest(), Some(20.0));
        assert_eq!(telemetry.series().get(SeriesId::Memory).latest(), Some(40.0));
        assert_eq!(telemetry.ticks(), 1);
    }

    #[test]
    fn test_telemetry_second_tick_pushes_rates() {
        let t0 = Instant::now();
        let mut telemetry = Telemetry::new(&ChartsConfig::default());
        telemetry.apply(snapshot_with(t0, vec![0.0], 40, 1000));
        telemetry.apply(snapshot_with(t0 + Duration::from_secs(5), vec![0.0], 40, 1500));

        let rx = telemetry.series().get(SeriesId::NetRx).latest().unwrap();
        assert_relative_eq!(rx, 100.0);
        assert!(telemetry.latest().is_some());
    }

    #[test]
    fn test_telemetry_rate_recovers_after_network_gap() {
        let t0 = Instant::now();
        let mut telemetry = Telemetry::new(&ChartsConfig::default());
        telemetry.apply(snapshot_with(t0, vec![0.0], 40, 1000));

        let mut gap = snapshot_with(t0 + Duration::from_secs(1), vec![0.0], 40, 0);
        gap.network = None;
        telemetry.apply(gap);
        assert!(telemetry.rates().is_none());
        assert!(telemetry.latest().unwrap().network.is_none());

        telemetry.apply(snapshot_with(t0 + Duration::from_secs(2), vec![0.0], 40, 3000));
        let rates = telemetry.rates().unwrap();
        assert_relative_eq!(rates.total.rx_per_sec, 1000.0);
        assert_eq!(telemetry.series().get(SeriesId::NetRx).len(), 1);
    }

    #[test]
    fn test_telemetry_select_core_clears_cpu_series() {
        let t0 = Instant::now();
        let mut telemetry = Telemetry::new(&ChartsConfig::default());
        telemetry.apply(snapshot_with(t0, vec![10.0, 90.0], 40, 0));

        telemetry.select_cpu(CpuTarget::Core(1));
        assert!(telemetry.series().get(SeriesId::Cpu).is_empty());

        telemetry.apply(snapshot_with(t0 + Duration::from_secs(1), vec![10.0, 90.0], 40, 0));
        assert_eq!(telemetry.series().get(SeriesId::Cpu).latest(), Some(90.0));

        telemetry.select_cpu(CpuTarget::Core(1));
        assert_eq!(telemetry.series().get(SeriesId::Cpu).len(), 1, "same target keeps history");
    }

    #[test]
    fn test_telemetry_partial_snapshot() {
        let mut telemetry = Telemetry::new(&ChartsConfig::default());
        telemetry.apply(Snapshot::empty(Instant::now()));

        for id in SeriesId::ALL {
            assert!(telemetry.series().get(id).is_empty());
        }
        assert_eq!(telemetry.ticks(), 1);
    }
}
