//! Focus routing.
//!
//! Focus starts on no panel and changes only through a completed primary
//! click: a primary press and the following primary release landing in the
//! same hit zone. Keys never move focus; the dashboard dispatches them to
//! whatever [`FocusRouter::focus`] returns.

use crate::monitor::input::{PointerButton, PointerEvent};
use ratatui::layout::Rect;
use std::fmt;

/// Panels that can hold focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusPanel {
    /// The process table.
    ProcessList,
    /// The per-core CPU list.
    CoreList,
}

impl fmt::Display for FocusPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ProcessList => "processes",
            Self::CoreList => "cores",
        })
    }
}

/// Screen rectangle that resolves pointer events to a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitZone {
    /// Panel the zone belongs to.
    pub panel: FocusPanel,
    /// Area in terminal cells.
    pub rect: Rect,
}

impl HitZone {
    /// Creates a hit zone.
    #[must_use]
    pub fn new(panel: FocusPanel, rect: Rect) -> Self {
        Self { panel, rect }
    }

    /// Returns true if the cell `(x, y)` is inside the zone.
    #[must_use]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        let r = self.rect;
        x >= r.x
            && y >= r.y
            && u32::from(x) < u32::from(r.x) + u32::from(r.width)
            && u32::from(y) < u32::from(r.y) + u32::from(r.height)
    }
}

/// Owns the focus state and the current hit zones.
#[derive(Debug, Clone, Default)]
pub struct FocusRouter {
    zones: Vec<HitZone>,
    focus: Option<FocusPanel>,
    /// Zone under the primary press of the gesture in progress.
    /// `Some(None)` is a press outside every zone.
    pressed: Option<Option<FocusPanel>>,
}

impl FocusRouter {
    /// Creates a router with no zones and no focus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every registered zone. A gesture in progress is abandoned,
    /// since its press was resolved against the old geometry.
    pub fn register_zones(&mut self, zones: impl IntoIterator<Item = HitZone>) {
        self.zones = zones.into_iter().collect();
        self.pressed = None;
    }

    /// Registered zones.
    #[must_use]
    pub fn zones(&self) -> &[HitZone] {
        &self.zones
    }

    /// Panel whose zone contains `(x, y)`, if any.
    #[must_use]
    pub fn zone_at(&self, x: u16, y: u16) -> Option<FocusPanel> {
        self.zones.iter().find(|z| z.contains(x, y)).map(|z| z.panel)
    }

    /// The focused panel.
    #[must_use]
    pub fn focus(&self) -> Option<FocusPanel> {
        self.focus
    }

    /// Feeds one pointer event. Returns true if focus changed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let (x, y) = event.position();
        match event {
            PointerEvent::Press { button: PointerButton::Primary, .. } => {
                self.pressed = Some(self.zone_at(x, y));
                false
            }
            PointerEvent::Release { button: PointerButton::Primary, .. } => {
                let pressed = self.pressed.take().flatten();
                let released = self.zone_at(x, y);
                match (pressed, released) {
                    (Some(a), Some(b)) if a == b && self.focus != Some(b) => {
                        tracing::debug!(panel = %b, "focus changed");
                        self.focus = Some(b);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}
