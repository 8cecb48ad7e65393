//! Disk panel: one usage gauge per mounted filesystem.

use super::{draw_unavailable, panel_block, truncate_str};
use crate::monitor::rate::format_bytes;
use crate::monitor::state::Dashboard;
use crate::monitor::theme::Theme;
use crate::monitor::types::DiskUsage;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Gauge;
use ratatui::Frame;

fn gauge_label(disk: &DiskUsage, width: usize) -> String {
    let sizes = format!(" {}/{}", format_bytes(disk.used_bytes), format_bytes(disk.total_bytes));
    let room = width.saturating_sub(sizes.chars().count());
    format!("{}{sizes}", truncate_str(&disk.mount_point, room))
}

/// Draws the disk panel.
pub fn draw(f: &mut Frame, dashboard: &Dashboard, theme: &Theme, area: Rect) {
    let disks = dashboard.latest().and_then(|s| s.disks.as_deref());

    let title = match disks {
        Some(d) => format!(" Disks ({}) ", d.len()),
        None => " Disks ".to_string(),
    };
    let block = panel_block(title, theme, false);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(disks) = disks else {
        draw_unavailable(f, theme, inner);
        return;
    };

    let visible = disks.len().min(usize::from(inner.height));
    if visible == 0 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); visible])
        .split(inner);

    for (disk, &row) in disks.iter().zip(rows.iter()) {
        let percent = disk.usage_percent();
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme.disk.for_percent(percent)))
            .ratio((percent / 100.0).clamp(0.0, 1.0))
            .label(gauge_label(disk, usize::from(row.width)));
        f.render_widget(gauge, row);
    }
}
