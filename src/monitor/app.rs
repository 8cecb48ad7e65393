//! Main application loop for the dashboard.

use crate::monitor::config::Config;
use crate::monitor::error::{MonitorError, Result};
use crate::monitor::input::InputEvent;
use crate::monitor::sampler::Sampler;
use crate::monitor::source::SystemSource;
use crate::monitor::state::{Dashboard, Message};
use crate::monitor::theme::Theme;
use crate::monitor::types::MetricSource;
use crate::monitor::ui;

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, stdout};
use std::time::Instant;

/// The dashboard application: model, theme and sampler.
#[derive(Debug)]
pub struct App {
    mouse: bool,
    theme: Theme,
    dashboard: Dashboard,
    sampler: Sampler,
}

impl App {
    /// Creates the application over the host's `/proc` source.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the background
    /// sampler cannot be started.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_source(config, SystemSource::new())
    }

    /// Creates the application over any metric source.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the background
    /// sampler cannot be started.
    pub fn with_source<S: MetricSource + 'static>(config: Config, source: S) -> Result<Self> {
        config.validate()?;

        let theme = Theme::by_name(&config.theme).ok_or_else(|| MonitorError::ConfigInvalid {
            key: "theme".to_string(),
            message: format!("unknown theme '{}'", config.theme),
        })?;

        let now = Instant::now();
        let sampler = if config.global.background_sampling {
            Sampler::background(source, config.poll_period(), now)?
        } else {
            Sampler::inline(source, config.poll_period(), now)
        };

        tracing::info!(
            period_ms = config.global.poll_period_ms,
            background = config.global.background_sampling,
            theme = theme.name,
            "dashboard starting"
        );

        Ok(Self {
            mouse: config.global.mouse,
            theme,
            dashboard: Dashboard::new(&config),
            sampler,
        })
    }

    /// The dashboard model.
    #[must_use]
    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Returns whether the app should quit.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.dashboard.should_quit()
    }

    /// Feeds one input event to the dashboard.
    pub fn handle_input(&mut self, event: InputEvent) {
        self.dashboard.update(Message::from(event));
    }

    /// Advances sampling. Applies a snapshot if one is ready and re-arms
    /// the scheduler once the dashboard has taken it. Returns true if a
    /// snapshot was applied.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(snapshot) = self.sampler.poll(now) else {
            return false;
        };
        self.dashboard.update(Message::Tick(snapshot));
        self.sampler.complete(Instant::now());
        true
    }

    /// Runs the application main loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup or rendering fails.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        if self.mouse {
            stdout().execute(EnableMouseCapture)?;
        }
        let backend = CrosstermBackend::new(stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        if self.mouse {
            stdout().execute(DisableMouseCapture)?;
        }
        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        self.sampler.shutdown();
        tracing::info!(ticks = self.dashboard.ticks(), "dashboard stopped");

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let size = terminal.size()?;
        self.dashboard.update(Message::Resize { width: size.width, height: size.height });

        loop {
            terminal.draw(|frame| ui::draw(frame, &self.dashboard, &self.theme))?;

            if event::poll(self.sampler.timeout(Instant::now()))? {
                if let Some(input) = InputEvent::from_crossterm(event::read()?) {
                    self.handle_input(input);
                }
            }

            if self.should_quit() {
                break;
            }

            self.tick(Instant::now());
        }

        Ok(())
    }
}
