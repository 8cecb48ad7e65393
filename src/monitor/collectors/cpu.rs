//! CPU metrics collector.
//!
//! Parses `/proc/stat` on Linux. Utilization is a delta between two reads
//! of the cumulative tick counters, so the collector primes itself with one
//! read at construction and every later collection reports the interval
//! since the previous one.

use crate::monitor::error::{MonitorError, Result};
use crate::monitor::types::Collector;

/// Cumulative tick counters for one core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CpuTicks {
    user: u64,
    nice: u64,
    system: u64,
    idle: u64,
    iowait: u64,
    irq: u64,
    softirq: u64,
    steal: u64,
}

impl CpuTicks {
    /// Total CPU time.
    fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    /// Idle time (idle + iowait).
    fn idle_time(&self) -> u64 {
        self.idle + self.iowait
    }
}

/// Collector for per-core CPU utilization.
#[derive(Debug, Default)]
pub struct CpuCollector {
    /// Per-core ticks from the previous read.
    prev_cores: Vec<CpuTicks>,
}

impl CpuCollector {
    /// Creates a collector primed with one read of the tick counters.
    #[must_use]
    pub fn new() -> Self {
        let prev_cores = Self::read_cores().unwrap_or_default();
        Self { prev_cores }
    }

    /// Returns the number of cores seen in the last read.
    #[must_use]
    pub fn core_count(&self) -> usize {
        self.prev_cores.len()
    }

    #[cfg(target_os = "linux")]
    fn read_cores() -> Result<Vec<CpuTicks>> {
        let content = std::fs::read_to_string("/proc/stat")
            .map_err(|e| MonitorError::from_io("cpu", "/proc/stat", &e))?;
        parse_proc_stat(&content)
    }

    #[cfg(not(target_os = "linux"))]
    fn read_cores() -> Result<Vec<CpuTicks>> {
        Err(MonitorError::CollectorUnavailable("cpu"))
    }

    /// Turns a fresh read into per-core percentages against the previous one.
    pub(crate) fn advance(&mut self, cores: Vec<CpuTicks>) -> Vec<f64> {
        let percents = cores
            .iter()
            .enumerate()
            .map(|(i, curr)| {
                self.prev_cores.get(i).map_or(0.0, |prev| calculate_percentage(prev, curr))
            })
            .collect();
        self.prev_cores = cores;
        percents
    }
}

/// Parses the per-core `cpuN` lines of `/proc/stat`; the aggregate `cpu`
/// line is skipped.
pub(crate) fn parse_proc_stat(content: &str) -> Result<Vec<CpuTicks>> {
    let mut cores = Vec::new();

    for line in content.lines() {
        let Some(rest) = line.strip_prefix("cpu") else {
            continue;
        };
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        cores.push(parse_cpu_line(line)?);
    }

    if cores.is_empty() {
        return Err(MonitorError::CollectionFailed {
            collector: "cpu",
            message: "no per-core lines in /proc/stat".to_string(),
        });
    }
    Ok(cores)
}

/// Parses a single CPU line from /proc/stat.
fn parse_cpu_line(line: &str) -> Result<CpuTicks> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return Err(MonitorError::CollectionFailed {
            collector: "cpu",
            message: format!("invalid /proc/stat line: {line}"),
        });
    }

    let field = |i: usize| parts.get(i).and_then(|s| s.parse().ok()).unwrap_or(0);
    Ok(CpuTicks {
        user: field(1),
        nice: field(2),
        system: field(3),
        idle: field(4),
        iowait: field(5),
        irq: field(6),
        softirq: field(7),
        steal: field(8),
    })
}

/// Calculates CPU percentage from delta.
fn calculate_percentage(prev: &CpuTicks, curr: &CpuTicks) -> f64 {
    let total_delta = curr.total().saturating_sub(prev.total());
    let idle_delta = curr.idle_time().saturating_sub(prev.idle_time());

    if total_delta == 0 {
        return 0.0;
    }

    let used_delta = total_delta.saturating_sub(idle_delta);
    (used_delta as f64 / total_delta as f64) * 100.0
}

impl Collector for CpuCollector {
    type Output = Vec<f64>;

    fn id(&self) -> &'static str {
        "cpu"
    }

    fn collect(&mut self) -> Result<Vec<f64>> {
        let cores = Self::read_cores()?;
        Ok(self.advance(cores))
    }

    fn is_available(&self) -> bool {
        cfg!(target_os = "linux") && std::path::Path::new("/proc/stat").exists()
    }
}
