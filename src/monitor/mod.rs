//! Terminal dashboard for live host telemetry.
//!
//! Every poll period a [`MetricSource`] produces one [`Snapshot`] holding
//! per-core CPU, memory, network counters, mounted filesystems and the
//! process list. The [`Dashboard`] turns snapshots into chart history and
//! network rates, and routes keyboard and pointer input to the focused
//! panel.
//!
//! # Data flow
//!
//! ```text
//! SystemSource ──► Sampler ──► Message::Tick ──► Dashboard ──► ui::draw
//!                    ▲                              ▲
//!                Scheduler                   Key / Pointer / Resize
//! ```
//!
//! A subsystem that fails to read is absent from that tick's snapshot; the
//! other panels keep updating. Only configuration errors are fatal, and
//! they surface before the event loop starts.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hostpulse::monitor::{App, Config};
//!
//! let config = Config::load_or_default("~/.config/hostpulse/config.yaml")?;
//! let mut app = App::new(config)?;
//! app.run()?;
//! ```

// ============================================================================
// Error Types
// ============================================================================

pub mod error;
pub use error::{MonitorError, Result};

// ============================================================================
// Core Types
// ============================================================================

pub mod rate;
pub mod ring_buffer;
pub mod series;
pub mod types;

pub use ring_buffer::RingBuffer;
pub use types::{Collector, MetricSource, Snapshot};

// ============================================================================
// Re-export ratatui for downstream crates
// ============================================================================

pub use ratatui;

// ============================================================================
// Collection
// ============================================================================

pub mod collectors;
pub mod sampler;
pub mod source;

pub use source::SystemSource;

// ============================================================================
// Configuration
// ============================================================================

pub mod config;
pub mod theme;

pub use config::Config;
pub use theme::Theme;

// ============================================================================
// Application
// ============================================================================

pub mod app;
pub mod focus;
pub mod input;
pub mod layout;
pub mod panels;
pub mod state;
pub mod ui;

pub use app::App;
pub use state::{Dashboard, Message};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types.
pub mod prelude {
    pub use super::app::App;
    pub use super::config::Config;
    pub use super::error::{MonitorError, Result};
    pub use super::state::{Dashboard, Message};
    pub use super::theme::Theme;
    pub use super::types::{MetricSource, Snapshot};
}
