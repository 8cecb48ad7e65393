//! Per-subsystem metric collectors.
//!
//! - **cpu**: per-core utilization from `/proc/stat`
//! - **memory**: used/total from `/proc/meminfo`
//! - **network**: cumulative byte counters from `/proc/net/dev`
//! - **disk**: filesystem capacity from `/proc/mounts` + `statvfs`
//! - **process**: process list from `/proc/[pid]`
//!
//! On other platforms every collector reports
//! [`MonitorError::CollectorUnavailable`](crate::monitor::error::MonitorError::CollectorUnavailable).

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;
pub mod process;

pub use cpu::CpuCollector;
pub use disk::DiskCollector;
pub use memory::MemoryCollector;
pub use network::NetworkCollector;
pub use process::ProcessCollector;
