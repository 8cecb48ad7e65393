//! Theme system for the dashboard.
//!
//! A [`Theme`] is picked by name from configuration at startup and handed
//! to the renderer by shared reference; nothing mutates it afterwards.

use ratatui::style::{Color, Modifier, Style};

/// A color gradient with 2-3 stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: Vec<Color>,
}

impl Gradient {
    /// Creates a two-color gradient from hex strings.
    #[must_use]
    pub fn two(start: &str, end: &str) -> Self {
        Self { stops: vec![parse_color(start), parse_color(end)] }
    }

    /// Creates a three-color gradient from hex strings.
    #[must_use]
    pub fn three(start: &str, mid: &str, end: &str) -> Self {
        Self { stops: vec![parse_color(start), parse_color(mid), parse_color(end)] }
    }

    /// A gradient that is the same color everywhere.
    #[must_use]
    pub fn flat(color: Color) -> Self {
        Self { stops: vec![color] }
    }

    /// Samples the gradient at position t (0.0 - 1.0).
    #[must_use]
    pub fn sample(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self.stops.as_slice() {
            [] => Color::White,
            [only] => *only,
            stops => {
                let segment_count = stops.len() - 1;
                let segment_size = 1.0 / segment_count as f64;
                let segment = ((t / segment_size) as usize).min(segment_count - 1);
                let local_t = (t - segment as f64 * segment_size) / segment_size;

                interpolate_color(stops[segment], stops[segment + 1], local_t)
            }
        }
    }

    /// Samples at a percentage (0-100).
    #[must_use]
    pub fn for_percent(&self, percent: f64) -> Color {
        self.sample(percent / 100.0)
    }
}

/// Immutable styling for every panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Theme name.
    pub name: &'static str,
    /// Default text color.
    pub foreground: Color,
    /// De-emphasized text.
    pub dim: Color,
    /// Border of unfocused panels.
    pub border: Color,
    /// Border of the focused panel.
    pub border_focused: Color,
    /// Panel titles.
    pub title: Color,
    /// CPU usage colors.
    pub cpu: Gradient,
    /// Memory usage colors.
    pub memory: Gradient,
    /// Disk usage colors.
    pub disk: Gradient,
    /// Receive line.
    pub net_rx: Color,
    /// Transmit line.
    pub net_tx: Color,
    /// Highlighted list row.
    pub selection: Style,
}

impl Theme {
    /// Names accepted by [`Theme::by_name`].
    pub const NAMES: [&'static str; 2] = ["default", "mono"];

    /// The default colored theme.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            name: "default",
            foreground: parse_color("#c0caf5"),
            dim: parse_color("#565f89"),
            border: parse_color("#3b4261"),
            border_focused: parse_color("#7aa2f7"),
            title: parse_color("#7dcfff"),
            cpu: Gradient::three("#7aa2f7", "#e0af68", "#f7768e"),
            memory: Gradient::three("#9ece6a", "#e0af68", "#f7768e"),
            disk: Gradient::three("#73daca", "#e0af68", "#f7768e"),
            net_rx: parse_color("#9ece6a"),
            net_tx: parse_color("#bb9af7"),
            selection: Style::default().bg(parse_color("#283457")).add_modifier(Modifier::BOLD),
        }
    }

    /// A theme using only the terminal's default palette.
    #[must_use]
    pub fn mono() -> Self {
        Self {
            name: "mono",
            foreground: Color::Reset,
            dim: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::White,
            title: Color::White,
            cpu: Gradient::flat(Color::White),
            memory: Gradient::flat(Color::White),
            disk: Gradient::flat(Color::White),
            net_rx: Color::White,
            net_tx: Color::Gray,
            selection: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Looks a theme up by name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::colored()),
            "mono" => Some(Self::mono()),
            _ => None,
        }
    }

    /// Border style for a panel.
    #[must_use]
    pub fn border_style(&self, focused: bool) -> Style {
        let color = if focused { self.border_focused } else { self.border };
        Style::default().fg(color)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::colored()
    }
}

/// Parses a hex color string to a ratatui Color.
fn parse_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');

    if hex.len() != 6 || !hex.is_ascii() {
        return Color::White;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);

    Color::Rgb(r, g, b)
}

/// Interpolates between two colors.
fn interpolate_color(start: Color, end: Color, t: f64) -> Color {
    let (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) = (start, end) else {
        return if t < 0.5 { start } else { end };
    };

    let mix = |a: u8, b: u8| ((1.0 - t) * f64::from(a) + t * f64::from(b)) as u8;
    Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#FF0000"), Color::Rgb(255, 0, 0));
        assert_eq!(parse_color("#00FF00"), Color::Rgb(0, 255, 0));
        assert_eq!(parse_color("0000FF"), Color::Rgb(0, 0, 255));
        assert_eq!(parse_color("#abc"), Color::White);
    }

    #[test]
    fn test_gradient_sample() {
        let gradient = Gradient::two("#000000", "#FFFFFF");

        assert_eq!(gradient.sample(0.0), Color::Rgb(0, 0, 0));
        assert_eq!(gradient.sample(1.0), Color::Rgb(255, 255, 255));
        assert_eq!(gradient.sample(7.0), Color::Rgb(255, 255, 255));

        if let Color::Rgb(r, _, _) = gradient.sample(0.5) {
            assert!((i32::from(r) - 127).abs() <= 1);
        }
    }

    #[test]
    fn test_gradient_three_stops() {
        let gradient = Gradient::three("#FF0000", "#00FF00", "#0000FF");

        assert_eq!(gradient.sample(0.0), Color::Rgb(255, 0, 0));
        assert_eq!(gradient.for_percent(50.0), Color::Rgb(0, 255, 0));
        assert_eq!(gradient.sample(1.0), Color::Rgb(0, 0, 255));
    }

    #[test]
    fn test_flat_gradient_and_nan() {
        let gradient = Gradient::flat(Color::Gray);
        assert_eq!(gradient.sample(0.3), Color::Gray);
        assert_eq!(Gradient::two("#000000", "#FFFFFF").sample(f64::NAN), Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_theme_by_name() {
        for name in Theme::NAMES {
            assert_eq!(Theme::by_name(name).map(|t| t.name), Some(name));
        }
        assert!(Theme::by_name("neon").is_none());
        assert_eq!(Theme::default().name, "default");
    }

    #[test]
    fn test_border_style_focus() {
        let theme = Theme::colored();
        assert_eq!(theme.border_style(true).fg, Some(theme.border_focused));
        assert_eq!(theme.border_style(false).fg, Some(theme.border));
    }
}
