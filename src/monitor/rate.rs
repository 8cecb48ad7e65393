//! Rate converter.
//!
//! Turns the cumulative network counters of two consecutive snapshots into
//! bytes-per-second rates. A counter that went backwards (interface reset,
//! wrap) contributes a zero delta. Without a previous snapshot, or when
//! the clock did not advance, no rate is produced at all.

use crate::monitor::types::{InterfaceCounters, Snapshot};
use std::collections::BTreeMap;
use std::time::Duration;

/// Difference between two readings of a monotonic counter, clamped to 0
/// when the counter regressed.
#[must_use]
pub fn counter_delta(prev: u64, curr: u64) -> u64 {
    curr.saturating_sub(prev)
}

/// Per-second rate of a counter over `elapsed`, or `None` when no time
/// passed.
#[must_use]
pub fn rate_per_sec(prev: u64, curr: u64, elapsed: Duration) -> Option<f64> {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return None;
    }
    Some(counter_delta(prev, curr) as f64 / secs)
}

/// Receive and transmit rates for one interface (or the aggregate).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateSample {
    /// Bytes received per second.
    pub rx_per_sec: f64,
    /// Bytes transmitted per second.
    pub tx_per_sec: f64,
}

impl RateSample {
    fn between(
        prev: &InterfaceCounters,
        curr: &InterfaceCounters,
        elapsed: Duration,
    ) -> Option<Self> {
        Some(Self {
            rx_per_sec: rate_per_sec(prev.rx_bytes, curr.rx_bytes, elapsed)?,
            tx_per_sec: rate_per_sec(prev.tx_bytes, curr.tx_bytes, elapsed)?,
        })
    }
}

/// Rates derived from one pair of snapshots.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkRates {
    /// Rates per interface present in both snapshots.
    pub interfaces: BTreeMap<String, RateSample>,
    /// Sum over `interfaces`.
    pub total: RateSample,
}

/// Derives network rates from a baseline snapshot and the current one.
///
/// Returns `None` when there is no baseline, when either snapshot lacks
/// network data, or when the elapsed time is not positive.
#[must_use]
pub fn convert(prev: Option<&Snapshot>, curr: &Snapshot) -> Option<NetworkRates> {
    let prev = prev?;
    let elapsed = curr.timestamp.checked_duration_since(prev.timestamp)?;
    if elapsed.is_zero() {
        tracing::debug!("snapshot clock did not advance, skipping rate sample");
        return None;
    }

    let prev_net = prev.network.as_ref()?;
    let curr_net = curr.network.as_ref()?;

    let mut rates = NetworkRates::default();
    for (name, curr_counters) in curr_net {
        let Some(prev_counters) = prev_net.get(name) else {
            continue;
        };
        let Some(sample) = RateSample::between(prev_counters, curr_counters, elapsed) else {
            continue;
        };
        rates.total.rx_per_sec += sample.rx_per_sec;
        rates.total.tx_per_sec += sample.tx_per_sec;
        rates.interfaces.insert(name.clone(), sample);
    }

    Some(rates)
}

/// Formats bytes per second as a human-readable string.
#[must_use]
pub fn format_bytes_rate(bytes_per_sec: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    if bytes_per_sec >= GB {
        format!("{:.1} GB/s", bytes_per_sec / GB)
    } else if bytes_per_sec >= MB {
        format!("{:.1} MB/s", bytes_per_sec / MB)
    } else if bytes_per_sec >= KB {
        format!("{:.1} KB/s", bytes_per_sec / KB)
    } else {
        format!("{bytes_per_sec:.0} B/s")
    }
}

/// Formats a byte count with binary units.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes}{}", UNITS[0])
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}
