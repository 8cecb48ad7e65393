//! Process metrics collector.
//!
//! Scans the numeric directories of `/proc` on Linux. CPU percentages are
//! the share of total machine CPU time each process used since the
//! previous scan, so the first scan reports 0 for every process.

use crate::monitor::error::{MonitorError, Result};
use crate::monitor::types::{Collector, ProcessInfo, ProcessState};
use std::collections::BTreeMap;

/// Page size assumed when converting `statm` page counts to bytes.
const PAGE_SIZE: u64 = 4096;

/// Fields of `/proc/[pid]/stat` the collector uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PidStat {
    pub(crate) name: String,
    pub(crate) state: ProcessState,
    /// utime + stime, in clock ticks.
    pub(crate) cpu_ticks: u64,
}

/// Parses `/proc/[pid]/stat`. The name is taken between the first `(` and
/// the last `)` since it may itself contain parentheses or spaces.
pub(crate) fn parse_pid_stat(content: &str) -> Option<PidStat> {
    let name_start = content.find('(')?;
    let name_end = content.rfind(')')?;
    if name_end < name_start {
        return None;
    }

    let name = content[name_start + 1..name_end].to_string();
    let fields: Vec<&str> = content.get(name_end + 1..)?.split_whitespace().collect();

    let state = fields
        .first()
        .and_then(|s| s.chars().next())
        .map_or(ProcessState::Unknown, ProcessState::from_char);
    let utime: u64 = fields.get(11).and_then(|s| s.parse().ok()).unwrap_or(0);
    let stime: u64 = fields.get(12).and_then(|s| s.parse().ok()).unwrap_or(0);

    Some(PidStat { name, state, cpu_ticks: utime + stime })
}

/// Parses the resident page count from `/proc/[pid]/statm` into bytes.
pub(crate) fn parse_statm_resident(content: &str) -> Option<u64> {
    content.split_whitespace().nth(1)?.parse::<u64>().ok().map(|pages| pages * PAGE_SIZE)
}

/// Sums the aggregate `cpu` line of `/proc/stat`.
pub(crate) fn parse_total_cpu_time(content: &str) -> Option<u64> {
    content
        .lines()
        .find(|l| l.starts_with("cpu "))
        .map(|l| l.split_whitespace().skip(1).filter_map(|s| s.parse::<u64>().ok()).sum())
}

/// Collector for the process list.
#[derive(Debug, Default)]
pub struct ProcessCollector {
    /// CPU ticks per PID from the previous scan.
    prev_cpu_ticks: BTreeMap<u32, u64>,
    /// Machine-wide CPU ticks at the previous scan.
    prev_total_cpu: u64,
    /// Physical memory, for memory percentages.
    total_memory: u64,
}

impl ProcessCollector {
    /// Creates a new process collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the physical memory size used for memory percentages.
    pub fn set_total_memory(&mut self, bytes: u64) {
        if bytes > 0 {
            self.total_memory = bytes;
        }
    }

    /// Builds one row from a parsed stat and resident size, against the
    /// previous scan's ticks.
    pub(crate) fn build_info(
        &self,
        pid: u32,
        stat: PidStat,
        mem_bytes: u64,
        total_delta: u64,
    ) -> ProcessInfo {
        let cpu_percent = match self.prev_cpu_ticks.get(&pid) {
            Some(&prev) if total_delta > 0 => {
                stat.cpu_ticks.saturating_sub(prev) as f64 / total_delta as f64 * 100.0
            }
            _ => 0.0,
        };

        let mem_percent = if self.total_memory > 0 {
            mem_bytes as f64 / self.total_memory as f64 * 100.0
        } else {
            0.0
        };

        ProcessInfo { pid, name: stat.name, state: stat.state, cpu_percent, mem_bytes, mem_percent }
    }

    /// Records the ticks of a finished scan.
    pub(crate) fn finish_scan(&mut self, ticks: BTreeMap<u32, u64>, total_cpu: u64) {
        self.prev_cpu_ticks = ticks;
        self.prev_total_cpu = total_cpu;
    }

    #[cfg(target_os = "linux")]
    fn scan(&mut self) -> Result<Vec<ProcessInfo>> {
        let proc_dir =
            std::fs::read_dir("/proc").map_err(|e| MonitorError::from_io("process", "/proc", &e))?;

        let total_cpu = std::fs::read_to_string("/proc/stat")
            .ok()
            .and_then(|s| parse_total_cpu_time(&s))
            .unwrap_or(0);
        let total_delta = total_cpu.saturating_sub(self.prev_total_cpu);

        let mut processes = Vec::new();
        let mut ticks = BTreeMap::new();

        for entry in proc_dir.flatten() {
            let Ok(pid) = entry.file_name().to_string_lossy().parse::<u32>() else {
                continue;
            };

            // Processes exit mid-scan; skip what vanished.
            let Some(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat"))
                .ok()
                .and_then(|s| parse_pid_stat(&s))
            else {
                continue;
            };
            let mem_bytes = std::fs::read_to_string(format!("/proc/{pid}/statm"))
                .ok()
                .and_then(|s| parse_statm_resident(&s))
                .unwrap_or(0);

            ticks.insert(pid, stat.cpu_ticks);
            processes.push(self.build_info(pid, stat, mem_bytes, total_delta));
        }

        self.finish_scan(ticks, total_cpu);
        Ok(processes)
    }
}

impl Collector for ProcessCollector {
    type Output = Vec<ProcessInfo>;

    fn id(&self) -> &'static str {
        "process"
    }

    #[cfg(target_os = "linux")]
    fn collect(&mut self) -> Result<Vec<ProcessInfo>> {
        self.scan()
    }

    #[cfg(not(target_os = "linux"))]
    fn collect(&mut self) -> Result<Vec<ProcessInfo>> {
        Err(MonitorError::CollectorUnavailable("process"))
    }

    fn is_available(&self) -> bool {
        cfg!(target_os = "linux") && std::path::Path::new("/proc/self/stat").exists()
    }
}
