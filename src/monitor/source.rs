//! Metric source adapter.
//!
//! [`SystemSource`] runs every collector once per tick and assembles the
//! results into a [`Snapshot`]. A collector that fails leaves its field
//! `None` for that tick; the other subsystems are unaffected.

use crate::monitor::collectors::{
    CpuCollector, DiskCollector, MemoryCollector, NetworkCollector, ProcessCollector,
};
use crate::monitor::error::{MonitorError, Result};
use crate::monitor::types::{Collector, MetricSource, Snapshot, Subsystem};
use std::collections::BTreeSet;
use std::time::Instant;

/// Tracks which subsystems are failing so a persistent failure is logged
/// loudly once rather than every tick.
#[derive(Debug, Default)]
pub struct FailureTracker {
    failing: BTreeSet<Subsystem>,
}

impl FailureTracker {
    /// Creates a tracker with every subsystem healthy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one collection outcome and turns it into an `Option`.
    ///
    /// The first failure logs at warn, repeats at debug, and the first
    /// success after a failure at info.
    pub fn record<T>(&mut self, subsystem: Subsystem, outcome: Result<T>) -> Option<T> {
        match outcome {
            Ok(value) => {
                if self.failing.remove(&subsystem) {
                    tracing::info!(%subsystem, "subsystem recovered");
                }
                Some(value)
            }
            Err(err) => {
                if self.failing.insert(subsystem) {
                    tracing::warn!(%subsystem, error = %err, "subsystem unavailable");
                } else {
                    tracing::debug!(%subsystem, error = %err, "subsystem still unavailable");
                }
                None
            }
        }
    }

    /// Returns true while `subsystem` is failing.
    #[must_use]
    pub fn is_failing(&self, subsystem: Subsystem) -> bool {
        self.failing.contains(&subsystem)
    }

    /// Number of subsystems currently failing.
    #[must_use]
    pub fn failing_count(&self) -> usize {
        self.failing.len()
    }
}

/// Runs a collector if it can work here, otherwise reports it unavailable.
fn collect_from<C: Collector>(collector: &mut C) -> Result<C::Output> {
    if !collector.is_available() {
        return Err(MonitorError::CollectorUnavailable(collector.id()));
    }
    collector.collect()
}

/// The host's metric source, backed by the `/proc` collectors.
#[derive(Debug)]
pub struct SystemSource {
    cpu: CpuCollector,
    memory: MemoryCollector,
    network: NetworkCollector,
    disk: DiskCollector,
    process: ProcessCollector,
    failures: FailureTracker,
}

impl SystemSource {
    /// Creates a source with every collector. The CPU collector takes its
    /// baseline reading here.
    #[must_use]
    pub fn new() -> Self {
        let source = Self {
            cpu: CpuCollector::new(),
            memory: MemoryCollector::new(),
            network: NetworkCollector::new(),
            disk: DiskCollector::new(),
            process: ProcessCollector::new(),
            failures: FailureTracker::new(),
        };
        tracing::debug!(cores = source.cpu.core_count(), "system source initialized");
        source
    }

    /// Failure state, for diagnostics.
    #[must_use]
    pub fn failures(&self) -> &FailureTracker {
        &self.failures
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for SystemSource {
    fn sample(&mut self) -> Snapshot {
        let timestamp = Instant::now();

        let cpu = self.failures.record(Subsystem::Cpu, collect_from(&mut self.cpu));
        let memory = self.failures.record(Subsystem::Memory, collect_from(&mut self.memory));
        self.process.set_total_memory(self.memory.last_total());
        let network = self.failures.record(Subsystem::Network, collect_from(&mut self.network));
        let disks = self.failures.record(Subsystem::Disk, collect_from(&mut self.disk));
        let processes = self.failures.record(Subsystem::Process, collect_from(&mut self.process));

        Snapshot { timestamp, cpu, memory, network, disks, processes }
    }
}
