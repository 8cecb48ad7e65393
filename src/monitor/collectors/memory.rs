//! Memory metrics collector.
//!
//! Parses `/proc/meminfo` on Linux.

use crate::monitor::error::{MonitorError, Result};
use crate::monitor::types::{Collector, MemoryUsage};

/// Collector for memory usage.
#[derive(Debug, Default)]
pub struct MemoryCollector {
    /// Total memory from the last successful read, used by the process
    /// collector for memory percentages.
    last_total: u64,
}

impl MemoryCollector {
    /// Creates a new memory collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total physical memory seen by the last collection, in bytes.
    #[must_use]
    pub fn last_total(&self) -> u64 {
        self.last_total
    }
}

/// Parses `/proc/meminfo` content. Used memory is total minus available;
/// kernels without `MemAvailable` fall back to free + buffers + cached.
pub(crate) fn parse_meminfo(content: &str) -> Result<MemoryUsage> {
    let mut total: Option<u64> = None;
    let mut free: u64 = 0;
    let mut available: Option<u64> = None;
    let mut buffers: u64 = 0;
    let mut cached: u64 = 0;

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let Ok(kb) = parts[1].parse::<u64>() else {
            continue;
        };
        let value = kb * 1024;

        match parts[0] {
            "MemTotal:" => total = Some(value),
            "MemFree:" => free = value,
            "MemAvailable:" => available = Some(value),
            "Buffers:" => buffers = value,
            "Cached:" => cached = value,
            _ => {}
        }
    }

    let total = total.ok_or_else(|| MonitorError::CollectionFailed {
        collector: "memory",
        message: "MemTotal missing from /proc/meminfo".to_string(),
    })?;
    let available = available.unwrap_or(free + buffers + cached);

    Ok(MemoryUsage { used_bytes: total.saturating_sub(available), total_bytes: total })
}

impl Collector for MemoryCollector {
    type Output = MemoryUsage;

    fn id(&self) -> &'static str {
        "memory"
    }

    #[cfg(target_os = "linux")]
    fn collect(&mut self) -> Result<MemoryUsage> {
        let content = std::fs::read_to_string("/proc/meminfo")
            .map_err(|e| MonitorError::from_io("memory", "/proc/meminfo", &e))?;
        let usage = parse_meminfo(&content)?;
        self.last_total = usage.total_bytes;
        Ok(usage)
    }

    #[cfg(not(target_os = "linux"))]
    fn collect(&mut self) -> Result<MemoryUsage> {
        Err(MonitorError::CollectorUnavailable("memory"))
    }

    fn is_available(&self) -> bool {
        cfg!(target_os = "linux") && std::path::Path::new("/proc/meminfo").exists()
    }
}
