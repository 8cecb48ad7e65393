//! Network metrics collector.
//!
//! Parses `/proc/net/dev` on Linux. The collector only reports cumulative
//! byte counters; turning them into rates is the job of
//! [`crate::monitor::rate`], which sees consecutive snapshots.

use crate::monitor::error::{MonitorError, Result};
use crate::monitor::types::{Collector, InterfaceCounters};
use std::collections::BTreeMap;

/// Collector for per-interface byte counters.
#[derive(Debug, Default)]
pub struct NetworkCollector {
    include_loopback: bool,
}

impl NetworkCollector {
    /// Creates a new network collector. Loopback is excluded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Includes or excludes the loopback interface.
    #[must_use]
    pub fn with_loopback(mut self, include: bool) -> Self {
        self.include_loopback = include;
        self
    }
}

/// Parses `/proc/net/dev` content into counters keyed by interface name.
pub(crate) fn parse_net_dev(
    content: &str,
    include_loopback: bool,
) -> BTreeMap<String, InterfaceCounters> {
    let mut counters = BTreeMap::new();

    // Two header lines.
    for line in content.lines().skip(2) {
        let Some((name, rest)) = line.trim().split_once(':') else {
            continue;
        };

        let name = name.trim();
        if name == "lo" && !include_loopback {
            continue;
        }

        let values: Vec<u64> = rest.split_whitespace().filter_map(|s| s.parse().ok()).collect();
        if values.len() < 16 {
            continue;
        }

        counters.insert(
            name.to_string(),
            InterfaceCounters { rx_bytes: values[0], tx_bytes: values[8] },
        );
    }

    counters
}

impl Collector for NetworkCollector {
    type Output = BTreeMap<String, InterfaceCounters>;

    fn id(&self) -> &'static str {
        "network"
    }

    #[cfg(target_os = "linux")]
    fn collect(&mut self) -> Result<Self::Output> {
        let content = std::fs::read_to_string("/proc/net/dev")
            .map_err(|e| MonitorError::from_io("network", "/proc/net/dev", &e))?;
        Ok(parse_net_dev(&content, self.include_loopback))
    }

    #[cfg(not(target_os = "linux"))]
    fn collect(&mut self) -> Result<Self::Output> {
        Err(MonitorError::CollectorUnavailable("network"))
    }

    fn is_available(&self) -> bool {
        cfg!(target_os = "linux") && std::path::Path::new("/proc/net/dev").exists()
    }
}
