//! Frame composition: every panel of the current layout, plus the help
//! overlay when it is open.

use crate::monitor::panels::draw_panel;
use crate::monitor::state::Dashboard;
use crate::monitor::theme::Theme;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use ratatui::Frame;

/// Draws one frame.
///
/// Panels are drawn at the rectangles of the last computed geometry, which
/// is also what the focus router hit-tests against.
pub fn draw(f: &mut Frame, dashboard: &Dashboard, theme: &Theme) {
    for &(kind, area) in dashboard.geometry().panels() {
        draw_panel(f, dashboard, theme, kind, area);
    }

    if dashboard.show_help() {
        let area = f.area();
        draw_help_overlay(f, theme, area);
    }
}

fn heading(text: &'static str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(theme.title).add_modifier(Modifier::BOLD)))
}

fn draw_help_overlay(f: &mut Frame, theme: &Theme, area: Rect) {
    let popup_width = 50;
    let popup_height = 22;

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width.min(area.width),
        height: popup_height.min(area.height),
    };

    f.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(""),
        heading("  Focus:", theme),
        Line::from("    click             Focus process or core list"),
        Line::from(""),
        heading("  Focused list:", theme),
        Line::from("    j/k, ↑/↓          Move up/down"),
        Line::from("    PgUp/PgDn         Page up/down"),
        Line::from("    g/G, Home/End     Go to top/bottom"),
        Line::from("    s                 Cycle process sort"),
        Line::from(""),
        heading("  Layout:", theme),
        Line::from("    1                 Overview"),
        Line::from("    2                 Processes"),
        Line::from(""),
        heading("  General:", theme),
        Line::from("    q, Esc            Quit"),
        Line::from("    ?, F1             Toggle help"),
        Line::from(""),
    ];

    let help = Paragraph::new(help_text).style(Style::default().fg(theme.foreground)).block(
        Block::default()
            .title(Span::styled(" Help ", Style::default().fg(theme.title)))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border_style(true)),
    );

    f.render_widget(help, popup_area);
}
