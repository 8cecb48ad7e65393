//! Layout system for the dashboard.
//!
//! A [`Preset`] is a stack of rows, each split evenly between its panels.
//! The [`LayoutEngine`] turns the current preset and terminal size into a
//! [`LayoutGeometry`]; the result depends only on `(preset, width, height)`,
//! and every recomputation replaces the previous geometry wholesale.

use crate::monitor::focus::{FocusPanel, HitZone};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Every panel the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    /// CPU utilization chart.
    CpuChart,
    /// Per-core list.
    Cores,
    /// Memory chart.
    Memory,
    /// Network throughput chart.
    Network,
    /// Filesystem usage.
    Disks,
    /// Process table.
    Processes,
}

impl PanelKind {
    /// Focus target for interactive panels.
    #[must_use]
    pub fn focus_panel(self) -> Option<FocusPanel> {
        match self {
            Self::Cores => Some(FocusPanel::CoreList),
            Self::Processes => Some(FocusPanel::ProcessList),
            _ => None,
        }
    }
}

/// Layout preset configuration.
#[derive(Debug, Clone)]
pub struct Preset {
    /// Display name.
    pub name: &'static str,
    /// Rows in the layout.
    pub rows: Vec<LayoutRow>,
}

/// A row in the layout.
#[derive(Debug, Clone)]
pub struct LayoutRow {
    /// Panels in this row, left to right.
    pub panels: Vec<PanelKind>,
    /// Height constraint.
    pub height: Constraint,
}

impl LayoutRow {
    fn new(height: Constraint, panels: &[PanelKind]) -> Self {
        Self { panels: panels.to_vec(), height }
    }
}

impl Preset {
    /// Overview: charts on top, processes and disks below.
    #[must_use]
    pub fn overview() -> Self {
        use PanelKind::{Cores, CpuChart, Disks, Memory, Network, Processes};
        Self {
            name: "overview",
            rows: vec![
                LayoutRow::new(Constraint::Percentage(35), &[CpuChart, Cores]),
                LayoutRow::new(Constraint::Percentage(25), &[Memory, Network]),
                LayoutRow::new(Constraint::Percentage(40), &[Processes, Disks]),
            ],
        }
    }

    /// Process-centric: a thin chart strip, then processes beside cores.
    #[must_use]
    pub fn processes() -> Self {
        use PanelKind::{Cores, CpuChart, Memory, Network, Processes};
        Self {
            name: "processes",
            rows: vec![
                LayoutRow::new(Constraint::Percentage(30), &[CpuChart, Memory, Network]),
                LayoutRow::new(Constraint::Percentage(70), &[Processes, Cores]),
            ],
        }
    }

    /// Calculates the layout areas for the given terminal size.
    #[must_use]
    pub fn calculate(&self, area: Rect) -> Vec<(PanelKind, Rect)> {
        let row_constraints: Vec<Constraint> = self.rows.iter().map(|r| r.height).collect();

        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(row_constraints)
            .split(area);

        self.rows
            .iter()
            .zip(row_areas.iter())
            .flat_map(|(row, &row_area)| {
                let count = u32::try_from(row.panels.len()).unwrap_or(u32::MAX);
                let constraints: Vec<Constraint> =
                    row.panels.iter().map(|_| Constraint::Ratio(1, count)).collect();

                let panel_areas = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints(constraints)
                    .split(row_area);

                row.panels.iter().copied().zip(panel_areas.iter().copied()).collect::<Vec<_>>()
            })
            .collect()
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::overview()
    }
}

/// Per-panel rectangles for one terminal size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutGeometry {
    width: u16,
    height: u16,
    panels: Vec<(PanelKind, Rect)>,
}

impl LayoutGeometry {
    /// Terminal size the geometry was computed for.
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Area of a panel, if the current preset shows it.
    #[must_use]
    pub fn rect(&self, kind: PanelKind) -> Option<Rect> {
        self.panels.iter().find(|(k, _)| *k == kind).map(|(_, r)| *r)
    }

    /// All visible panels with their areas.
    #[must_use]
    pub fn panels(&self) -> &[(PanelKind, Rect)] {
        &self.panels
    }

    /// Hit zones for the interactive panels.
    #[must_use]
    pub fn hit_zones(&self) -> Vec<HitZone> {
        self.panels
            .iter()
            .filter(|(_, rect)| rect.area() > 0)
            .filter_map(|&(kind, rect)| kind.focus_panel().map(|panel| HitZone::new(panel, rect)))
            .collect()
    }
}

/// Owns the presets and the current geometry.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    /// Available presets.
    presets: Vec<Preset>,
    /// Current preset index.
    current: usize,
    geometry: LayoutGeometry,
}

impl LayoutEngine {
    /// Creates an engine with the built-in presets and an empty geometry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            presets: vec![Preset::overview(), Preset::processes()],
            current: 0,
            geometry: LayoutGeometry::default(),
        }
    }

    /// Recomputes the whole geometry for a new terminal size.
    pub fn resize(&mut self, width: u16, height: u16) -> &LayoutGeometry {
        let area = Rect::new(0, 0, width, height);
        self.geometry = LayoutGeometry {
            width,
            height,
            panels: self.presets[self.current].calculate(area),
        };
        &self.geometry
    }

    /// Switches to a preset by index and recomputes at the last known size.
    /// Returns false (and changes nothing) for an unknown index.
    pub fn switch_to(&mut self, index: usize) -> bool {
        if index >= self.presets.len() {
            return false;
        }
        self.current = index;
        let (width, height) = self.geometry.size();
        self.resize(width, height);
        true
    }

    /// The current geometry.
    #[must_use]
    pub fn geometry(&self) -> &LayoutGeometry {
        &self.geometry
    }

    /// Returns the current preset.
    #[must_use]
    pub fn current(&self) -> &Preset {
        &self.presets[self.current]
    }

    /// Index of the current preset.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of presets.
    #[must_use]
    pub fn preset_count(&self) -> usize {
        self.presets.len()
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_has_every_panel() {
        let panels = Preset::overview().calculate(Rect::new(0, 0, 100, 40));
        assert_eq!(panels.len(), 6);
    }

    #[test]
    fn test_process_list_is_half_its_row() {
        let mut engine = LayoutEngine::new();
        let geometry = engine.resize(100, 40);

        let processes = geometry.rect(PanelKind::Processes).unwrap();
        let disks = geometry.rect(PanelKind::Disks).unwrap();
        assert_eq!(processes.width, 50);
        assert_eq!(processes.width + disks.width, 100);
        assert_eq!(processes.y, disks.y);
    }

    #[test]
    fn test_rows_cover_the_screen() {
        let mut engine = LayoutEngine::new();
        let geometry = engine.resize(80, 24);

        let total: u16 = [PanelKind::CpuChart, PanelKind::Memory, PanelKind::Processes]
            .iter()
            .map(|&k| geometry.rect(k).unwrap().height)
            .sum();
        assert_eq!(total, 24);
    }

    #[test]
    fn test_resize_twice_is_identical() {
        let mut engine = LayoutEngine::new();
        let first = engine.resize(100, 40).clone();
        let second = engine.resize(100, 40).clone();

        assert_eq!(first, second);
        assert_eq!(first.hit_zones(), second.hit_zones());
    }

    #[test]
    fn test_hit_zones_only_for_interactive_panels() {
        let mut engine = LayoutEngine::new();
        let zones = engine.resize(100, 40).hit_zones();

        assert_eq!(zones.len(), 2);
        assert!(zones.iter().any(|z| z.panel == FocusPanel::ProcessList));
        assert!(zones.iter().any(|z| z.panel == FocusPanel::CoreList));
    }

    #[test]
    fn test_zero_size_has_no_zones() {
        let mut engine = LayoutEngine::new();
        assert!(engine.resize(0, 0).hit_zones().is_empty());
    }

    #[test]
    fn test_switch_recomputes_at_last_size() {
        let mut engine = LayoutEngine::new();
        engine.resize(120, 50);
        let before = engine.geometry().rect(PanelKind::Cores).unwrap();

        assert!(engine.switch_to(1));
        let after = engine.geometry().rect(PanelKind::Cores).unwrap();

        assert_eq!(engine.geometry().size(), (120, 50));
        assert_ne!(before, after);
        assert_eq!(engine.geometry().rect(PanelKind::Disks), None);
        assert_eq!(engine.current().name, "processes");
    }

    #[test]
    fn test_invalid_switch_is_ignored() {
        let mut engine = LayoutEngine::new();
        engine.resize(100, 40);
        let before = engine.geometry().clone();

        assert!(!engine.switch_to(99));
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.geometry(), &before);
    }

    #[test]
    fn test_default_preset() {
        assert_eq!(Preset::default().rows.len(), 3);
        assert_eq!(LayoutEngine::default().preset_count(), 2);
    }
}
