//! Process table.

use super::{draw_unavailable, panel_block, truncate_str};
use crate::monitor::focus::FocusPanel;
use crate::monitor::rate::format_bytes;
use crate::monitor::state::{Dashboard, ProcessSort};
use crate::monitor::theme::Theme;
use crate::monitor::types::ProcessInfo;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Cell, Row, Table, TableState};
use ratatui::Frame;

/// Column headers with the sort column each one represents.
const COLUMNS: [(&str, Option<ProcessSort>); 6] = [
    ("PID", Some(ProcessSort::Pid)),
    ("S", None),
    ("CPU%", Some(ProcessSort::Cpu)),
    ("MEM%", Some(ProcessSort::Memory)),
    ("MEM", None),
    ("NAME", Some(ProcessSort::Name)),
];

fn row<'a>(p: &ProcessInfo, theme: &Theme, name_width: usize) -> Row<'a> {
    Row::new(vec![
        Cell::from(p.pid.to_string()),
        Cell::from(p.state.as_char().to_string()),
        Cell::from(Span::styled(
            format!("{:>5.1}", p.cpu_percent),
            Style::default().fg(theme.cpu.for_percent(p.cpu_percent)),
        )),
        Cell::from(Span::styled(
            format!("{:>5.1}", p.mem_percent),
            Style::default().fg(theme.memory.for_percent(p.mem_percent)),
        )),
        Cell::from(format_bytes(p.mem_bytes)),
        Cell::from(truncate_str(&p.name, name_width)),
    ])
}

/// Draws the process table.
pub fn draw(f: &mut Frame, dashboard: &Dashboard, theme: &Theme, area: Rect) {
    let focused = dashboard.focus() == Some(FocusPanel::ProcessList);
    let available = dashboard.latest().is_some_and(|s| s.processes.is_some());
    let processes = dashboard.processes();
    let sort = dashboard.process_sort();

    let title = format!(" Processes ({}) │ sort: {} ", processes.len(), sort.label());
    let block = panel_block(title, theme, focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if !available {
        draw_unavailable(f, theme, inner);
        return;
    }

    let header = Row::new(COLUMNS.iter().map(|&(label, column)| {
        let mut style = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);
        if column == Some(sort) {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        Cell::from(Span::styled(label, style))
    }));

    let widths = [
        Constraint::Length(7),
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Min(8),
    ];
    let name_width = usize::from(inner.width.saturating_sub(7 + 1 + 5 + 5 + 7 + 5)).max(8);

    let rows: Vec<Row<'_>> = processes.iter().map(|p| row(p, theme, name_width)).collect();
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .row_highlight_style(theme.selection);

    let mut state = TableState::default();
    if focused && !processes.is_empty() {
        state.select(Some(dashboard.process_selected()));
    }
    f.render_stateful_widget(table, inner, &mut state);
}
