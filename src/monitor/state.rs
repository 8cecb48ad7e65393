//! Dashboard state and its transitions.
//!
//! [`Dashboard`] is owned by the event loop and changed only through
//! [`Dashboard::update`]. The renderer reads it through shared accessors
//! between updates, so a frame never sees a half-applied message.

use crate::monitor::config::{AxisRange, ChartConfig, Config};
use crate::monitor::focus::{FocusPanel, FocusRouter};
use crate::monitor::input::{Action, InputEvent, InputHandler, PointerEvent};
use crate::monitor::layout::{LayoutEngine, LayoutGeometry, PanelKind};
use crate::monitor::rate::NetworkRates;
use crate::monitor::sampler::{CpuTarget, Telemetry};
use crate::monitor::series::{Series, SeriesId};
use crate::monitor::types::{ProcessInfo, Snapshot};
use crossterm::event::KeyEvent;
use std::cmp::Ordering;

/// Everything that can change the dashboard.
#[derive(Debug, Clone)]
pub enum Message {
    /// A sampling tick produced a snapshot.
    Tick(Snapshot),
    /// A key was pressed.
    Key(KeyEvent),
    /// A pointer event.
    Pointer(PointerEvent),
    /// The terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },
}

impl From<InputEvent> for Message {
    fn from(event: InputEvent) -> Self {
        match event {
            InputEvent::Key(key) => Self::Key(key),
            InputEvent::Pointer(pointer) => Self::Pointer(pointer),
            InputEvent::Resize { width, height } => Self::Resize { width, height },
        }
    }
}

/// Process table sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessSort {
    /// Highest CPU first.
    #[default]
    Cpu,
    /// Highest memory first.
    Memory,
    /// Lowest PID first.
    Pid,
    /// Alphabetical by name.
    Name,
}

impl ProcessSort {
    /// The next column in the cycle.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Cpu => Self::Memory,
            Self::Memory => Self::Pid,
            Self::Pid => Self::Name,
            Self::Name => Self::Cpu,
        }
    }

    /// Column header label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "mem",
            Self::Pid => "pid",
            Self::Name => "name",
        }
    }

    fn compare(self, a: &ProcessInfo, b: &ProcessInfo) -> Ordering {
        let primary = match self {
            Self::Cpu => b.cpu_percent.total_cmp(&a.cpu_percent),
            Self::Memory => b.mem_bytes.cmp(&a.mem_bytes),
            Self::Pid => a.pid.cmp(&b.pid),
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        };
        primary.then(a.pid.cmp(&b.pid))
    }
}

/// Cursor into a list whose length changes between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    selected: usize,
}

impl Selection {
    /// Selected row.
    #[must_use]
    pub fn selected(self) -> usize {
        self.selected
    }

    /// Keeps the cursor inside a list of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Moves by `delta` rows, stopping at either end.
    pub fn move_by(&mut self, delta: isize, len: usize) {
        let target = self.selected.saturating_add_signed(delta);
        self.selected = target;
        self.clamp(len);
    }

    /// Jumps to a row.
    pub fn set(&mut self, row: usize, len: usize) {
        self.selected = row;
        self.clamp(len);
    }
}

/// The dashboard model.
#[derive(Debug)]
pub struct Dashboard {
    telemetry: Telemetry,
    layout: LayoutEngine,
    router: FocusRouter,
    input: InputHandler,
    charts: [ChartConfig; 3],
    processes: Vec<ProcessInfo>,
    process_sort: ProcessSort,
    process_selection: Selection,
    core_count: usize,
    core_selection: Selection,
    show_help: bool,
    should_quit: bool,
}

impl Dashboard {
    /// Creates the dashboard from a validated configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            telemetry: Telemetry::new(&config.charts),
            layout: LayoutEngine::new(),
            router: FocusRouter::new(),
            input: InputHandler::new(config.global.vim_keys),
            charts: [
                config.charts.cpu.clone(),
                config.charts.memory.clone(),
                config.charts.network.clone(),
            ],
            processes: Vec::new(),
            process_sort: ProcessSort::default(),
            process_selection: Selection::default(),
            core_count: 0,
            core_selection: Selection::default(),
            show_help: false,
            should_quit: false,
        }
    }

    /// Applies one message.
    pub fn update(&mut self, message: Message) {
        match message {
            Message::Tick(snapshot) => self.on_tick(snapshot),
            Message::Key(key) => self.on_key(key),
            Message::Pointer(pointer) => self.on_pointer(pointer),
            Message::Resize { width, height } => self.on_resize(width, height),
        }
    }

    fn on_tick(&mut self, snapshot: Snapshot) {
        if let Some(cores) = &snapshot.cpu {
            self.core_count = cores.len();
            let rows = self.core_rows();
            self.core_selection.clamp(rows);
            self.sync_cpu_target();
        }

        // A missed process scan keeps the previous rows and selection.
        if let Some(list) = &snapshot.processes {
            let selected_pid = self.selected_process().map(|p| p.pid);
            self.processes.clone_from(list);
            self.sort_processes(selected_pid);
        }

        self.telemetry.apply(snapshot);
    }

    fn on_key(&mut self, key: KeyEvent) {
        let action = self.input.handle_key(key);

        if action == Action::None {
            return;
        }
        if action.is_global() {
            self.global_action(action);
            return;
        }
        match self.router.focus() {
            Some(FocusPanel::ProcessList) => self.process_action(action),
            Some(FocusPanel::CoreList) => self.core_action(action),
            None => tracing::trace!(?action, "no focused panel, key dropped"),
        }
    }

    fn global_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Help => self.show_help = !self.show_help,
            Action::Preset(n) => {
                let index = usize::from(n).saturating_sub(1);
                if self.layout.switch_to(index) {
                    self.router.register_zones(self.layout.geometry().hit_zones());
                }
            }
            _ => {}
        }
    }

    fn on_pointer(&mut self, pointer: PointerEvent) {
        self.router.handle_pointer(pointer);
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        let zones = self.layout.resize(width, height).hit_zones();
        self.router.register_zones(zones);
    }

    fn process_action(&mut self, action: Action) {
        let len = self.processes.len();
        let page = self.page_size(PanelKind::Processes, 3);

        match action {
            Action::CycleSort => {
                let selected_pid = self.selected_process().map(|p| p.pid);
                self.process_sort = self.process_sort.next();
                self.sort_processes(selected_pid);
            }
            other => navigate(&mut self.process_selection, other, len, page),
        }
    }

    fn core_action(&mut self, action: Action) {
        let page = self.page_size(PanelKind::Cores, 2);
        let rows = self.core_rows();
        navigate(&mut self.core_selection, action, rows, page);
        self.sync_cpu_target();
    }

    /// Rows that fit in a panel, after `chrome` rows of border and header.
    fn page_size(&self, kind: PanelKind, chrome: u16) -> usize {
        self.layout
            .geometry()
            .rect(kind)
            .map_or(1, |r| usize::from(r.height.saturating_sub(chrome)).max(1))
    }

    fn core_rows(&self) -> usize {
        self.core_count + 1
    }

    fn sync_cpu_target(&mut self) {
        let target = match self.core_selection.selected() {
            0 => CpuTarget::Average,
            row => CpuTarget::Core(row - 1),
        };
        self.telemetry.select_cpu(target);
    }

    fn sort_processes(&mut self, keep_pid: Option<u32>) {
        let sort = self.process_sort;
        self.processes.sort_by(|a, b| sort.compare(a, b));

        let len = self.processes.len();
        match keep_pid.and_then(|pid| self.processes.iter().position(|p| p.pid == pid)) {
            Some(row) => self.process_selection.set(row, len),
            None => self.process_selection.clamp(len),
        }
    }

    /// Series for a chart line.
    #[must_use]
    pub fn series(&self, id: SeriesId) -> &Series {
        self.telemetry.series().get(id)
    }

    /// Configured Y bounds for a chart line, `None` to auto-scale.
    #[must_use]
    pub fn y_axis(&self, id: SeriesId) -> Option<AxisRange> {
        match id {
            SeriesId::Cpu => self.charts[0].y_axis,
            SeriesId::Memory => self.charts[1].y_axis,
            SeriesId::NetRx | SeriesId::NetTx => self.charts[2].y_axis,
        }
    }

    /// The most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<&Snapshot> {
        self.telemetry.latest()
    }

    /// Rates from the most recent tick.
    #[must_use]
    pub fn rates(&self) -> Option<&NetworkRates> {
        self.telemetry.rates()
    }

    /// Snapshots applied so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.telemetry.ticks()
    }

    /// The focused panel.
    #[must_use]
    pub fn focus(&self) -> Option<FocusPanel> {
        self.router.focus()
    }

    /// The focus router, for inspecting hit zones.
    #[must_use]
    pub fn router(&self) -> &FocusRouter {
        &self.router
    }

    /// Current panel geometry.
    #[must_use]
    pub fn geometry(&self) -> &LayoutGeometry {
        self.layout.geometry()
    }

    /// Index of the active layout preset.
    #[must_use]
    pub fn preset(&self) -> usize {
        self.layout.current_index()
    }

    /// Process rows in display order.
    #[must_use]
    pub fn processes(&self) -> &[ProcessInfo] {
        &self.processes
    }

    /// Selected process row.
    #[must_use]
    pub fn process_selected(&self) -> usize {
        self.process_selection.selected()
    }

    /// The selected process, if the list is not empty.
    #[must_use]
    pub fn selected_process(&self) -> Option<&ProcessInfo> {
        self.processes.get(self.process_selection.selected())
    }

    /// Current sort column.
    #[must_use]
    pub fn process_sort(&self) -> ProcessSort {
        self.process_sort
    }

    /// Selected core-list row; row 0 is the all-core average.
    #[must_use]
    pub fn core_selected(&self) -> usize {
        self.core_selection.selected()
    }

    /// What the CPU chart currently plots.
    #[must_use]
    pub fn cpu_target(&self) -> CpuTarget {
        self.telemetry.cpu_target()
    }

    /// Whether the help overlay is visible.
    #[must_use]
    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// Whether the loop should exit.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

fn navigate(selection: &mut Selection, action: Action, len: usize, page: usize) {
    let page = isize::try_from(page).unwrap_or(isize::MAX);
    match action {
        Action::Up => selection.move_by(-1, len),
        Action::Down => selection.move_by(1, len),
        Action::PageUp => selection.move_by(-page, len),
        Action::PageDown => selection.move_by(page, len),
        Action::Home => selection.set(0, len),
        Action::End => selection.set(len.saturating_sub(1), len),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::input::PointerButton;
    use crate::monitor::types::ProcessState;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::time::{Duration, Instant};

    fn key(code: KeyCode) -> Message {
        Message::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn click(dashboard: &mut Dashboard, kind: PanelKind) {
        let rect = dashboard.geometry().rect(kind).unwrap();
        let (x, y) = (rect.x + 1, rect.y + 1);
        dashboard.update(Message::Pointer(PointerEvent::Press {
            button: PointerButton::Primary,
            x,
            y,
        }));
        dashboard.update(Message::Pointer(PointerEvent::Release {
            button: PointerButton::Primary,
            x,
            y,
        }));
    }

    fn process(pid: u32, name: &str, cpu: f64, mem: u64) -> ProcessInfo {
        ProcessInfo {
            pid,
            name: name.to_string(),
            state: ProcessState::Running,
            cpu_percent: cpu,
            mem_bytes: mem,
            mem_percent: 0.0,
        }
    }

    fn tick(at: Instant, cores: Vec<f64>, processes: Vec<ProcessInfo>) -> Message {
        let mut snap = Snapshot::empty(at);
        snap.cpu = Some(cores);
        snap.processes = Some(processes);
        Message::Tick(snap)
    }

    fn dashboard() -> Dashboard {
        let mut dashboard = Dashboard::new(&Config::default());
        dashboard.update(Message::Resize { width: 120, height: 40 });
        dashboard
    }

    #[test]
    fn test_keys_without_focus_are_dropped() {
        let mut d = dashboard();
        let rows = vec![process(1, "a", 0.0, 0), process(2, "b", 0.0, 0)];
        d.update(tick(Instant::now(), vec![1.0], rows));

        d.update(key(KeyCode::Down));
        d.update(key(KeyCode::Char('s')));

        assert_eq!(d.process_selected(), 0);
        assert_eq!(d.process_sort(), ProcessSort::Cpu);
        assert_eq!(d.focus(), None);
    }

    #[test]
    fn test_keys_go_to_focused_panel() {
        let mut d = dashboard();
        d.update(tick(
            Instant::now(),
            vec![1.0],
            vec![process(1, "a", 3.0, 0), process(2, "b", 2.0, 0), process(3, "c", 1.0, 0)],
        ));

        click(&mut d, PanelKind::Processes);
        assert_eq!(d.focus(), Some(FocusPanel::ProcessList));

        d.update(key(KeyCode::Down));
        d.update(key(KeyCode::Down));
        d.update(key(KeyCode::Down));
        assert_eq!(d.process_selected(), 2, "selection stops at the last row");

        d.update(key(KeyCode::Home));
        assert_eq!(d.process_selected(), 0);
        assert_eq!(d.core_selected(), 0, "unfocused panel untouched");
    }

    #[test]
    fn test_global_keys_ignore_focus() {
        let mut d = dashboard();

        d.update(key(KeyCode::Char('?')));
        assert!(d.show_help());

        d.update(key(KeyCode::Char('2')));
        assert_eq!(d.preset(), 1);
        assert_eq!(d.focus(), None);

        d.update(key(KeyCode::Char('q')));
        assert!(d.should_quit());
    }

    #[test]
    fn test_preset_switch_replaces_zones() {
        let mut d = dashboard();
        let before = d.router().zones().to_vec();

        d.update(key(KeyCode::Char('2')));

        assert_ne!(d.router().zones(), before.as_slice());
        assert_eq!(d.router().zones(), d.geometry().hit_zones().as_slice());

        d.update(key(KeyCode::Char('9')));
        assert_eq!(d.preset(), 1, "unknown preset ignored");
    }

    #[test]
    fn test_sort_cycle_keeps_selected_process() {
        let mut d = dashboard();
        d.update(tick(
            Instant::now(),
            vec![1.0],
            vec![
                process(30, "zsh", 9.0, 10),
                process(10, "bash", 1.0, 300),
                process(20, "Xorg", 5.0, 200),
            ],
        ));
        click(&mut d, PanelKind::Processes);

        let pids: Vec<u32> = d.processes().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![30, 20, 10]);

        d.update(key(KeyCode::Down));
        assert_eq!(d.selected_process().map(|p| p.pid), Some(20));

        d.update(key(KeyCode::Char('s')));
        assert_eq!(d.process_sort(), ProcessSort::Memory);
        let pids: Vec<u32> = d.processes().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![10, 20, 30]);
        assert_eq!(d.selected_process().map(|p| p.pid), Some(20));

        d.update(key(KeyCode::Char('s')));
        d.update(key(KeyCode::Char('s')));
        assert_eq!(d.process_sort(), ProcessSort::Name);
        let names: Vec<&str> = d.processes().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["bash", "Xorg", "zsh"]);
    }

    #[test]
    fn test_selection_clamped_when_list_shrinks() {
        let mut d = dashboard();
        let t0 = Instant::now();
        let many: Vec<ProcessInfo> = (1..=10).map(|pid| process(pid, "p", 0.0, 0)).collect();
        d.update(tick(t0, vec![1.0], many));
        click(&mut d, PanelKind::Processes);
        d.update(key(KeyCode::End));
        assert_eq!(d.process_selected(), 9);

        let shrunk = vec![process(1, "p", 0.0, 0), process(2, "p", 0.0, 0)];
        d.update(tick(t0 + Duration::from_secs(1), vec![1.0], shrunk));
        assert_eq!(d.process_selected(), 1);

        d.update(tick(t0 + Duration::from_secs(2), vec![1.0], Vec::new()));
        assert_eq!(d.process_selected(), 0);
        assert!(d.selected_process().is_none());
    }

    #[test]
    fn test_missed_process_scan_keeps_rows_and_selection() {
        let mut d = dashboard();
        let t0 = Instant::now();
        let rows = || (1..=5).map(|pid| process(pid, "p", 0.0, 0)).collect::<Vec<_>>();
        d.update(tick(t0, vec![1.0], rows()));
        click(&mut d, PanelKind::Processes);
        d.update(key(KeyCode::End));
        assert_eq!(d.selected_process().map(|p| p.pid), Some(5));

        let mut gap = Snapshot::empty(t0 + Duration::from_secs(1));
        gap.cpu = Some(vec![1.0]);
        d.update(Message::Tick(gap));
        assert_eq!(d.processes().len(), 5);
        assert_eq!(d.selected_process().map(|p| p.pid), Some(5));

        d.update(tick(t0 + Duration::from_secs(2), vec![1.0], rows()));
        assert_eq!(d.selected_process().map(|p| p.pid), Some(5));
    }

    #[test]
    fn test_core_selection_drives_cpu_chart() {
        let mut d = dashboard();
        let t0 = Instant::now();
        d.update(tick(t0, vec![10.0, 50.0, 90.0], Vec::new()));
        assert_eq!(d.series(SeriesId::Cpu).latest(), Some(50.0));

        click(&mut d, PanelKind::Cores);
        d.update(key(KeyCode::Down));
        assert_eq!(d.cpu_target(), CpuTarget::Core(0));
        assert!(d.series(SeriesId::Cpu).is_empty(), "history of the previous target is discarded");

        d.update(tick(t0 + Duration::from_secs(1), vec![10.0, 50.0, 90.0], Vec::new()));
        assert_eq!(d.series(SeriesId::Cpu).latest(), Some(10.0));

        d.update(key(KeyCode::End));
        assert_eq!(d.cpu_target(), CpuTarget::Core(2));
    }

    #[test]
    fn test_core_selection_clamped_when_cores_disappear() {
        let mut d = dashboard();
        let t0 = Instant::now();
        d.update(tick(t0, vec![1.0, 2.0, 3.0, 4.0], Vec::new()));
        click(&mut d, PanelKind::Cores);
        d.update(key(KeyCode::End));
        assert_eq!(d.cpu_target(), CpuTarget::Core(3));

        d.update(tick(t0 + Duration::from_secs(1), vec![1.0, 2.0], Vec::new()));
        assert_eq!(d.cpu_target(), CpuTarget::Core(1));
        assert_eq!(d.series(SeriesId::Cpu).latest(), Some(2.0));
    }

    #[test]
    fn test_page_navigation() {
        let mut d = dashboard();
        let many: Vec<ProcessInfo> = (1..=200).map(|pid| process(pid, "p", 0.0, 0)).collect();
        d.update(tick(Instant::now(), vec![1.0], many));
        click(&mut d, PanelKind::Processes);

        d.update(key(KeyCode::PageDown));
        let page = d.process_selected();
        assert!(page > 1);

        d.update(key(KeyCode::PageUp));
        assert_eq!(d.process_selected(), 0);
    }

    #[test]
    fn test_y_axis_from_config() {
        let d = dashboard();
        assert_eq!(d.y_axis(SeriesId::Memory), Some(AxisRange::percent()));
        assert_eq!(d.y_axis(SeriesId::NetTx), None);
    }

    #[test]
    fn test_selection_move_by() {
        let mut sel = Selection::default();
        sel.move_by(-5, 10);
        assert_eq!(sel.selected(), 0);
        sel.move_by(25, 10);
        assert_eq!(sel.selected(), 9);
        sel.clamp(0);
        assert_eq!(sel.selected(), 0);
    }

    #[test]
    fn test_sort_cycle_wraps() {
        let mut sort = ProcessSort::Cpu;
        for _ in 0..4 {
            sort = sort.next();
        }
        assert_eq!(sort, ProcessSort::Cpu);
        assert_eq!(ProcessSort::Memory.label(), "mem");
    }
}
