//! Panel rendering.
//!
//! Each panel is a draw function reading the [`Dashboard`] and the
//! [`Theme`] by shared reference. [`draw_panel`] dispatches on
//! [`PanelKind`].

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;
pub mod process;

use crate::monitor::config::AxisRange;
use crate::monitor::layout::PanelKind;
use crate::monitor::state::Dashboard;
use crate::monitor::theme::Theme;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

/// Draws one panel into its area.
pub fn draw_panel(
    f: &mut Frame,
    dashboard: &Dashboard,
    theme: &Theme,
    kind: PanelKind,
    area: Rect,
) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    match kind {
        PanelKind::CpuChart => cpu::draw_chart(f, dashboard, theme, area),
        PanelKind::Cores => cpu::draw_cores(f, dashboard, theme, area),
        PanelKind::Memory => memory::draw(f, dashboard, theme, area),
        PanelKind::Network => network::draw(f, dashboard, theme, area),
        PanelKind::Disks => disk::draw(f, dashboard, theme, area),
        PanelKind::Processes => process::draw(f, dashboard, theme, area),
    }
}

/// Rounded block with the theme's border for the focus state.
fn panel_block<'a>(title: impl Into<String>, theme: &Theme, focused: bool) -> Block<'a> {
    Block::default()
        .title(Span::styled(title.into(), Style::default().fg(theme.title)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style(focused))
}

/// Placeholder body for a subsystem with no data this tick.
fn draw_unavailable(f: &mut Frame, theme: &Theme, area: Rect) {
    let text = Paragraph::new(Span::styled("unavailable", Style::default().fg(theme.dim)));
    f.render_widget(text, area);
}

/// Truncates a string to fit within `max_len` characters, adding "..." if truncated.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

/// Y bounds for a chart: the configured range, or 0 to a little above the
/// observed maximum.
fn y_bounds(axis: Option<AxisRange>, observed_max: f64) -> [f64; 2] {
    match axis {
        Some(range) => [range.min, range.max],
        None if observed_max > 0.0 => [0.0, observed_max * 1.1],
        None => [0.0, 1.0],
    }
}

/// One line of a history chart.
struct ChartLine<'a> {
    name: &'a str,
    color: ratatui::style::Color,
    points: Vec<(f64, f64)>,
}

/// Renders history lines into `area`. X is the sample index over the
/// series capacity, so the chart fills from the left as data arrives.
fn draw_history(f: &mut Frame, lines: &[ChartLine<'_>], capacity: usize, y: [f64; 2], area: Rect) {
    let datasets: Vec<Dataset<'_>> = lines
        .iter()
        .map(|line| {
            Dataset::default()
                .name(line.name)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(line.color))
                .data(&line.points)
        })
        .collect();

    let x_max = capacity.saturating_sub(1).max(1) as f64;
    let chart = Chart::new(datasets)
        .x_axis(Axis::default().bounds([0.0, x_max]))
        .y_axis(Axis::default().bounds(y));

    f.render_widget(chart, area);
}

/// Indexes values for a chart.
fn indexed(values: impl Iterator<Item = f64>) -> Vec<(f64, f64)> {
    values.enumerate().map(|(i, v)| (i as f64, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::config::Config;
    use crate::monitor::state::Message;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hello", 2), "he");
        assert_eq!(truncate_str("héllo wörld", 6), "hél...");
    }

    #[test]
    fn test_y_bounds() {
        assert_eq!(y_bounds(Some(AxisRange::percent()), 250.0), [0.0, 100.0]);
        assert_eq!(y_bounds(None, 0.0), [0.0, 1.0]);
        let [lo, hi] = y_bounds(None, 100.0);
        assert_eq!(lo, 0.0);
        assert!(hi > 100.0);
    }

    #[test]
    fn test_indexed() {
        assert_eq!(indexed([5.0, 6.0].into_iter()), vec![(0.0, 5.0), (1.0, 6.0)]);
    }

    #[test]
    fn test_every_panel_draws_without_data() {
        let mut dashboard = Dashboard::new(&Config::default());
        dashboard.update(Message::Resize { width: 100, height: 40 });
        let theme = Theme::default();

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal
            .draw(|f| {
                for &(kind, area) in dashboard.geometry().panels() {
                    draw_panel(f, &dashboard, &theme, kind, area);
                }
            })
            .unwrap();
    }

    #[test]
    fn test_tiny_area_is_skipped() {
        let dashboard = Dashboard::new(&Config::default());
        let theme = Theme::mono();

        let mut terminal = Terminal::new(TestBackend::new(10, 10)).unwrap();
        let area = Rect::new(0, 0, 1, 1);
        terminal.draw(|f| draw_panel(f, &dashboard, &theme, PanelKind::Processes, area)).unwrap();
    }
}
