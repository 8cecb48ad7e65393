//! Memory panel: used-percent history.

use super::{draw_history, draw_unavailable, indexed, panel_block, y_bounds, ChartLine};
use crate::monitor::rate::format_bytes;
use crate::monitor::series::SeriesId;
use crate::monitor::state::Dashboard;
use crate::monitor::theme::Theme;
use crate::monitor::types::MemoryUsage;
use ratatui::layout::Rect;
use ratatui::Frame;

fn title(usage: Option<MemoryUsage>) -> String {
    match usage {
        Some(m) => format!(
            " Memory {:.0}% │ {} / {} ",
            m.used_percent().unwrap_or(0.0),
            format_bytes(m.used_bytes),
            format_bytes(m.total_bytes)
        ),
        None => " Memory ".to_string(),
    }
}

/// Draws the memory panel.
pub fn draw(f: &mut Frame, dashboard: &Dashboard, theme: &Theme, area: Rect) {
    let usage = dashboard.latest().and_then(|s| s.memory);
    let series = dashboard.series(SeriesId::Memory);

    let block = panel_block(title(usage), theme, false);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if series.is_empty() && usage.is_none() {
        draw_unavailable(f, theme, inner);
        return;
    }

    let current = series.latest().unwrap_or(0.0);
    let line = ChartLine {
        name: "used",
        color: theme.memory.for_percent(current),
        points: indexed(series.values()),
    };
    let y = y_bounds(dashboard.y_axis(SeriesId::Memory), series.max());
    draw_history(f, &[line], series.capacity(), y, inner);
}
