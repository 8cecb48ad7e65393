//! CPU chart and per-core list.

use super::{draw_history, draw_unavailable, indexed, panel_block, y_bounds, ChartLine};
use crate::monitor::focus::FocusPanel;
use crate::monitor::sampler::CpuTarget;
use crate::monitor::series::SeriesId;
use crate::monitor::state::Dashboard;
use crate::monitor::theme::Theme;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Row, Table, TableState};
use ratatui::Frame;

/// Width of the inline usage bar in the core list.
const BAR_WIDTH: usize = 10;

fn target_label(target: CpuTarget) -> String {
    match target {
        CpuTarget::Average => "all cores".to_string(),
        CpuTarget::Core(i) => format!("core {i}"),
    }
}

/// Draws the CPU history chart for the selected core or the average.
pub fn draw_chart(f: &mut Frame, dashboard: &Dashboard, theme: &Theme, area: Rect) {
    let series = dashboard.series(SeriesId::Cpu);
    let current = series.latest().unwrap_or(0.0);

    let title = format!(" CPU {current:.0}% │ {} ", target_label(dashboard.cpu_target()));
    let block = panel_block(title, theme, false);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let line = ChartLine {
        name: "cpu",
        color: theme.cpu.for_percent(current),
        points: indexed(series.values()),
    };
    let y = y_bounds(dashboard.y_axis(SeriesId::Cpu), series.max());
    draw_history(f, &[line], series.capacity(), y, inner);
}

/// Renders a usage bar like `█████░░░░░`.
fn usage_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Draws the per-core list. Row 0 is the all-core average.
pub fn draw_cores(f: &mut Frame, dashboard: &Dashboard, theme: &Theme, area: Rect) {
    let focused = dashboard.focus() == Some(FocusPanel::CoreList);
    let cores = dashboard.latest().and_then(|s| s.cpu.as_deref());

    let title = match cores {
        Some(c) => format!(" Cores ({}) ", c.len()),
        None => " Cores ".to_string(),
    };
    let block = panel_block(title, theme, focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(cores) = cores else {
        draw_unavailable(f, theme, inner);
        return;
    };

    let average =
        if cores.is_empty() { 0.0 } else { cores.iter().sum::<f64>() / cores.len() as f64 };
    let entries = std::iter::once(("all".to_string(), average))
        .chain(cores.iter().enumerate().map(|(i, &p)| (format!("{i}"), p)));

    let rows: Vec<Row<'_>> = entries
        .map(|(label, percent)| {
            let color = theme.cpu.for_percent(percent);
            Row::new(vec![
                Cell::from(label),
                Cell::from(Line::from(Span::styled(
                    usage_bar(percent, BAR_WIDTH),
                    Style::default().fg(color),
                ))),
                Cell::from(format!("{percent:>5.1}%")),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(4), Constraint::Length(BAR_WIDTH as u16), Constraint::Length(7)],
    )
    .column_spacing(1)
    .row_highlight_style(theme.selection);

    let mut state = TableState::default();
    if focused {
        state.select(Some(dashboard.core_selected()));
    }
    f.render_stateful_widget(table, inner, &mut state);
}
