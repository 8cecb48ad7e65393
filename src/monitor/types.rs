//! Core types for the monitoring system.
//!
//! - [`Snapshot`]: everything sampled at one polling instant
//! - [`Collector`]: trait for one subsystem's metric reader
//! - [`MetricSource`]: trait for whatever produces whole snapshots
//!
//! Each subsystem field of a snapshot is optional. `None` means that
//! subsystem could not be read for this tick; the rest of the snapshot is
//! still valid.

use super::error::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

/// Memory usage at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryUsage {
    /// Bytes in use (total minus available).
    pub used_bytes: u64,
    /// Total physical memory in bytes.
    pub total_bytes: u64,
}

impl MemoryUsage {
    /// Returns the used percentage, or `None` when total is unknown.
    #[must_use]
    pub fn used_percent(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        Some(self.used_bytes as f64 / self.total_bytes as f64 * 100.0)
    }
}

/// Cumulative byte counters for one network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterfaceCounters {
    /// Bytes received since the interface came up.
    pub rx_bytes: u64,
    /// Bytes transmitted since the interface came up.
    pub tx_bytes: u64,
}

/// Capacity of one mounted filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskUsage {
    /// Device path (e.g., "/dev/sda1").
    pub device: String,
    /// Mount point (e.g., "/home").
    pub mount_point: String,
    /// Filesystem type (e.g., "ext4").
    pub fs_type: String,
    /// Total size in bytes.
    pub total_bytes: u64,
    /// Used bytes.
    pub used_bytes: u64,
    /// Bytes available to unprivileged users.
    pub available_bytes: u64,
}

impl DiskUsage {
    /// Returns the usage percentage.
    #[must_use]
    pub fn usage_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.total_bytes as f64) * 100.0
    }
}

/// Process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Running or runnable.
    Running,
    /// Interruptible sleep.
    Sleeping,
    /// Uninterruptible sleep (usually IO).
    DiskWait,
    /// Defunct/zombie process.
    Zombie,
    /// Stopped or traced.
    Stopped,
    /// Idle kernel thread.
    Idle,
    /// Unknown state.
    Unknown,
}

impl ProcessState {
    /// Parses a state character from `/proc/[pid]/stat`.
    #[must_use]
    pub fn from_char(c: char) -> Self {
        match c {
            'R' => Self::Running,
            'S' => Self::Sleeping,
            'D' => Self::DiskWait,
            'Z' => Self::Zombie,
            'T' | 't' => Self::Stopped,
            'I' => Self::Idle,
            _ => Self::Unknown,
        }
    }

    /// Returns a display character.
    #[must_use]
    pub fn as_char(&self) -> char {
        match self {
            Self::Running => 'R',
            Self::Sleeping => 'S',
            Self::DiskWait => 'D',
            Self::Zombie => 'Z',
            Self::Stopped => 'T',
            Self::Idle => 'I',
            Self::Unknown => '?',
        }
    }
}

/// One row of the process list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    /// Process ID.
    pub pid: u32,
    /// Process name.
    pub name: String,
    /// Process state.
    pub state: ProcessState,
    /// CPU usage percentage since the previous scan.
    pub cpu_percent: f64,
    /// Resident memory in bytes.
    pub mem_bytes: u64,
    /// Resident memory as a percentage of total memory.
    pub mem_percent: f64,
}

/// Immutable record of one polling instant.
///
/// Built wholesale by a [`MetricSource`]; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// When the snapshot was taken.
    pub timestamp: Instant,
    /// Per-core utilization percentages, index = core id.
    pub cpu: Option<Vec<f64>>,
    /// Memory used and total.
    pub memory: Option<MemoryUsage>,
    /// Cumulative counters keyed by interface name.
    pub network: Option<BTreeMap<String, InterfaceCounters>>,
    /// Mounted filesystem usage.
    pub disks: Option<Vec<DiskUsage>>,
    /// Process list.
    pub processes: Option<Vec<ProcessInfo>>,
}

impl Snapshot {
    /// Creates a snapshot with every subsystem absent.
    #[must_use]
    pub fn empty(timestamp: Instant) -> Self {
        Self { timestamp, cpu: None, memory: None, network: None, disks: None, processes: None }
    }

    /// Mean utilization over all cores.
    #[must_use]
    pub fn cpu_average(&self) -> Option<f64> {
        let cores = self.cpu.as_ref()?;
        if cores.is_empty() {
            return None;
        }
        Some(cores.iter().sum::<f64>() / cores.len() as f64)
    }

    /// Lists the subsystems missing from this snapshot.
    #[must_use]
    pub fn missing(&self) -> Vec<Subsystem> {
        let mut missing = Vec::new();
        if self.cpu.is_none() {
            missing.push(Subsystem::Cpu);
        }
        if self.memory.is_none() {
            missing.push(Subsystem::Memory);
        }
        if self.network.is_none() {
            missing.push(Subsystem::Network);
        }
        if self.disks.is_none() {
            missing.push(Subsystem::Disk);
        }
        if self.processes.is_none() {
            missing.push(Subsystem::Process);
        }
        missing
    }
}

/// Telemetry subsystems a snapshot is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subsystem {
    /// Per-core CPU utilization.
    Cpu,
    /// Memory usage.
    Memory,
    /// Network interface counters.
    Network,
    /// Filesystem capacity.
    Disk,
    /// Process list.
    Process,
}

impl Subsystem {
    /// Stable identifier used in logs.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Network => "network",
            Self::Disk => "disk",
            Self::Process => "process",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Trait for one subsystem's metric reader.
///
/// Collectors are stateful: the CPU and process collectors keep the
/// previous tick counters they need to turn into percentages.
pub trait Collector: Send {
    /// What one collection yields.
    type Output;

    /// Returns the unique identifier for this collector.
    fn id(&self) -> &'static str;

    /// Collects one reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source cannot be read.
    fn collect(&mut self) -> Result<Self::Output>;

    /// Returns true if this collector can work on the current system.
    fn is_available(&self) -> bool;
}

/// Produces whole snapshots. Implementations never fail as a whole;
/// a failing subsystem is left as `None`.
pub trait MetricSource: Send {
    /// Takes one snapshot.
    fn sample(&mut self) -> Snapshot;
}

impl<S: MetricSource + ?Sized> MetricSource for Box<S> {
    fn sample(&mut self) -> Snapshot {
        (**self).sample()
    }
}
