//! Configuration system for the dashboard.
//!
//! Supports YAML configuration with precedence: CLI > file > defaults.
//! Every value is checked by [`Config::validate`] before the event loop
//! starts; an invalid configuration never reaches the running core.

use crate::monitor::error::{MonitorError, Result};
use crate::monitor::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest accepted sampling period.
const MAX_POLL_PERIOD_MS: u64 = 60_000;

/// Largest accepted per-chart history.
const MAX_CAPACITY: usize = 100_000;

/// Global configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Sampling cadence in milliseconds.
    #[serde(default = "default_poll_period_ms")]
    pub poll_period_ms: u64,

    /// Enable vim-style navigation keys (j/k).
    #[serde(default = "default_true")]
    pub vim_keys: bool,

    /// Enable mouse capture (pointer focus switching).
    #[serde(default = "default_true")]
    pub mouse: bool,

    /// Acquire snapshots on a background worker instead of the loop thread.
    #[serde(default = "default_true")]
    pub background_sampling: bool,
}

fn default_poll_period_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            poll_period_ms: default_poll_period_ms(),
            vim_keys: true,
            mouse: true,
            background_sampling: true,
        }
    }
}

/// Fixed display bounds for a chart's Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl AxisRange {
    /// Creates a new axis range.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The 0-100 range used by percentage charts.
    #[must_use]
    pub fn percent() -> Self {
        Self::new(0.0, 100.0)
    }
}

/// Per-chart settings.
#[derive(Debug, Clone, Serialize)]
pub struct ChartConfig {
    /// Number of points retained by the chart's series.
    pub capacity: usize,

    /// Fixed Y bounds; `None` auto-scales to the current maximum.
    pub y_axis: Option<AxisRange>,
}

impl ChartConfig {
    fn percent(capacity: usize) -> Self {
        Self { capacity, y_axis: Some(AxisRange::percent()) }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(MonitorError::ConfigInvalid {
                key: format!("charts.{name}.capacity"),
                message: format!("must be between 1 and {MAX_CAPACITY}, got {}", self.capacity),
            });
        }
        if let Some(range) = self.y_axis {
            if !range.min.is_finite() || !range.max.is_finite() || range.min >= range.max {
                return Err(MonitorError::ConfigInvalid {
                    key: format!("charts.{name}.y_axis"),
                    message: format!("min ({}) must be below max ({})", range.min, range.max),
                });
            }
        }
        Ok(())
    }
}

fn default_cpu_chart() -> ChartConfig {
    ChartConfig::percent(120)
}
fn default_memory_chart() -> ChartConfig {
    ChartConfig::percent(120)
}
fn default_network_chart() -> ChartConfig {
    ChartConfig { capacity: 60, y_axis: None }
}

/// Chart settings, one entry per chart.
///
/// Each entry in the file may set any subset of its fields; the rest keep
/// that chart's own defaults. An explicit `y_axis: null` turns a default
/// fixed axis into auto-scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ChartsFile")]
pub struct ChartsConfig {
    /// CPU utilization chart (selected core or all-core average).
    pub cpu: ChartConfig,

    /// Memory used-percent chart.
    pub memory: ChartConfig,

    /// Network throughput chart (rx and tx share these settings).
    pub network: ChartConfig,
}

/// The `charts` section as written in the file.
#[derive(Default, Deserialize)]
#[serde(default)]
struct ChartsFile {
    cpu: ChartEntry,
    memory: ChartEntry,
    network: ChartEntry,
}

/// One chart entry as written in the file. Unset fields stay `None`.
#[derive(Default, Deserialize)]
#[serde(default)]
struct ChartEntry {
    capacity: Option<usize>,
    #[serde(deserialize_with = "present_axis")]
    y_axis: Option<Option<AxisRange>>,
}

/// Distinguishes `y_axis: null` (auto-scale) from a missing key.
fn present_axis<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<AxisRange>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<AxisRange>::deserialize(deserializer).map(Some)
}

impl ChartEntry {
    fn over(self, base: ChartConfig) -> ChartConfig {
        ChartConfig {
            capacity: self.capacity.unwrap_or(base.capacity),
            y_axis: self.y_axis.unwrap_or(base.y_axis),
        }
    }
}

impl From<ChartsFile> for ChartsConfig {
    fn from(file: ChartsFile) -> Self {
        Self {
            cpu: file.cpu.over(default_cpu_chart()),
            memory: file.memory.over(default_memory_chart()),
            network: file.network.over(default_network_chart()),
        }
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            cpu: default_cpu_chart(),
            memory: default_memory_chart(),
            network: default_network_chart(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global settings.
    #[serde(default)]
    pub global: GlobalConfig,

    /// Chart settings.
    #[serde(default)]
    pub charts: ChartsConfig,

    /// Theme name.
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_version() -> u32 {
    1
}
fn default_theme() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            global: GlobalConfig::default(),
            charts: ChartsConfig::default(),
            theme: default_theme(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MonitorError::ConfigNotFound(path.display().to_string())
            } else {
                MonitorError::ConfigUnreadable {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            MonitorError::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Loads configuration, falling back to defaults when the file is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(path) {
            Err(MonitorError::ConfigNotFound(path)) => {
                tracing::debug!(%path, "no configuration file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Checks every value the core relies on.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ConfigInvalid`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.global.poll_period_ms == 0 || self.global.poll_period_ms > MAX_POLL_PERIOD_MS {
            return Err(MonitorError::ConfigInvalid {
                key: "global.poll_period_ms".to_string(),
                message: format!(
                    "must be between 1 and {MAX_POLL_PERIOD_MS}, got {}",
                    self.global.poll_period_ms
                ),
            });
        }
        self.charts.cpu.validate("cpu")?;
        self.charts.memory.validate("memory")?;
        self.charts.network.validate("network")?;
        if Theme::by_name(&self.theme).is_none() {
            return Err(MonitorError::ConfigInvalid {
                key: "theme".to_string(),
                message: format!(
                    "unknown theme '{}', expected one of {:?}",
                    self.theme,
                    Theme::NAMES
                ),
            });
        }
        Ok(())
    }

    /// Returns the sampling period as a Duration.
    #[must_use]
    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.global.poll_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::new();

        assert_eq!(config.version, 1);
        assert_eq!(config.global.poll_period_ms, 1000);
        assert_eq!(config.charts.cpu.capacity, 120);
        assert_eq!(config.charts.network.y_axis, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_minimal() {
        let config = Config::parse("version: 1").unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.charts.memory.capacity, 120);
    }

    #[test]
    fn test_config_parse_full() {
        let yaml = r#"
version: 1
global:
  poll_period_ms: 250
  vim_keys: false
  background_sampling: false
charts:
  cpu:
    capacity: 300
    y_axis: { min: 0, max: 100 }
  network:
    capacity: 30
    y_axis: { min: 0, max: 1000000 }
theme: mono
"#;

        let config = Config::parse(yaml).unwrap();

        assert_eq!(config.poll_period(), Duration::from_millis(250));
        assert!(!config.global.vim_keys);
        assert!(!config.global.background_sampling);
        assert_eq!(config.charts.cpu.capacity, 300);
        assert_eq!(config.charts.network.y_axis, Some(AxisRange::new(0.0, 1_000_000.0)));
        assert_eq!(config.charts.memory.capacity, 120);
        assert_eq!(config.theme, "mono");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_error_includes_line() {
        let yaml = r#"
version: 1
global:
  poll_period_ms: not_a_number
"#;

        let err = Config::parse(yaml).unwrap_err();
        assert!(matches!(err, MonitorError::ConfigParse { .. }));
        assert!(err.to_string().contains('4'), "Error should include line number");
    }

    #[test]
    fn test_validate_rejects_zero_period() {
        let mut config = Config::new();
        config.global.poll_period_ms = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("global.poll_period_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = Config::new();
        config.charts.memory.capacity = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("charts.memory.capacity"));
    }

    #[test]
    fn test_validate_rejects_inverted_axis() {
        let mut config = Config::new();
        config.charts.cpu.y_axis = Some(AxisRange::new(100.0, 0.0));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("charts.cpu.y_axis"));
    }

    #[test]
    fn test_validate_rejects_unknown_theme() {
        let mut config = Config::new();
        config.theme = "neon".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("theme"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/path/config.yaml").unwrap();
        assert_eq!(config.version, 1);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "global:\n  poll_period_ms: 500").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.global.poll_period_ms, 500);
    }

    #[test]
    fn test_chart_entry_keeps_defaults_for_unset_fields() {
        let config = Config::parse("charts:\n  cpu:\n    y_axis: { min: 0, max: 50 }\n").unwrap();
        assert_eq!(config.charts.cpu.capacity, 120);
        assert_eq!(config.charts.cpu.y_axis, Some(AxisRange::new(0.0, 50.0)));

        let yaml = "charts:\n  network:\n    y_axis: { min: 0, max: 10 }\n";
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.charts.network.capacity, 60);

        let config = Config::parse("charts:\n  memory:\n    capacity: 30\n").unwrap();
        assert_eq!(config.charts.memory.capacity, 30);
        assert_eq!(config.charts.memory.y_axis, Some(AxisRange::percent()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chart_entry_null_axis_auto_scales() {
        let config = Config::parse("charts:\n  cpu:\n    y_axis: null\n").unwrap();
        assert_eq!(config.charts.cpu.y_axis, None);
        assert_eq!(config.charts.cpu.capacity, 120);
    }

    #[test]
    fn test_load_or_default_reports_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();

        let err = Config::load_or_default(dir.path()).unwrap_err();
        assert!(matches!(err, MonitorError::ConfigUnreadable { .. }));
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }

    #[test]
    fn test_load_or_default_reports_parse_errors() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "charts: [").unwrap();

        assert!(Config::load_or_default(file.path()).is_err());
    }
}
