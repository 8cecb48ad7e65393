//! Network panel: aggregate receive and transmit rates.

use super::{draw_history, indexed, panel_block, y_bounds, ChartLine};
use crate::monitor::rate::{format_bytes_rate, NetworkRates};
use crate::monitor::series::SeriesId;
use crate::monitor::state::Dashboard;
use crate::monitor::theme::Theme;
use ratatui::layout::Rect;
use ratatui::Frame;

fn title(rates: Option<&NetworkRates>) -> String {
    match rates {
        Some(r) => format!(
            " Network │ ↓ {} │ ↑ {} │ {} if ",
            format_bytes_rate(r.total.rx_per_sec),
            format_bytes_rate(r.total.tx_per_sec),
            r.interfaces.len()
        ),
        None => " Network ".to_string(),
    }
}

/// Draws the network panel.
pub fn draw(f: &mut Frame, dashboard: &Dashboard, theme: &Theme, area: Rect) {
    let rx = dashboard.series(SeriesId::NetRx);
    let tx = dashboard.series(SeriesId::NetTx);

    let block = panel_block(title(dashboard.rates()), theme, false);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = [
        ChartLine { name: "rx", color: theme.net_rx, points: indexed(rx.values()) },
        ChartLine { name: "tx", color: theme.net_tx, points: indexed(tx.values()) },
    ];
    let y = y_bounds(dashboard.y_axis(SeriesId::NetRx), rx.max().max(tx.max()));
    draw_history(f, &lines, rx.capacity(), y, inner);
}
