//! # hostpulse
//!
//! Terminal dashboard for live host telemetry: per-core CPU, memory,
//! network throughput, disk capacity and processes, read from `/proc` and
//! drawn with [ratatui](https://crates.io/crates/ratatui).
//!
//! ## Features
//!
//! - **Partial snapshots**: a failing subsystem blanks its panel, not the
//!   dashboard
//! - **Non-overlapping sampling**: the next tick is armed only after the
//!   current one has been applied
//! - **Pointer focus**: clicking a list focuses it; keys go to the focused
//!   list
//! - **YAML configuration**: sampling period, chart history and axes, theme
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hostpulse::monitor::{App, Config};
//!
//! let mut app = App::new(Config::default())?;
//! app.run()?;
//! ```

#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod monitor;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenient re-exports.
pub mod prelude {
    pub use crate::monitor::prelude::*;
}
