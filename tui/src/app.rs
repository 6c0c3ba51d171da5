//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ConductorClient for conversation control
//! - DisplayState for rendering
//!
//! The App never decides conversation behavior. It:
//! 1. Converts terminal events to Conductor calls
//! 2. Polls the Conductor for finished exchanges every tick
//! 3. Snapshots the Conductor into a DisplayState
//! 4. Renders the snapshot

use std::time::Duration;

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::Terminal;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

use buddy_conductor::{BuddyConfig, GuidanceBackend, HttpBackend, Submission};

use crate::conductor_client::ConductorClient;
use crate::display::{DisplayState, ServiceHealth};
use crate::ui::{self, INPUT_HEIGHT};

/// Render tick (~20 FPS); also bounds how late a finished exchange shows up
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Lines per mouse wheel step
const WHEEL_STEP: usize = 3;

/// Main application state
pub struct App<B: GuidanceBackend + 'static = HttpBackend> {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Conductor Integration ===
    /// Client for the embedded Conductor
    conductor: ConductorClient<B>,
    /// Snapshot rendered each frame
    display: DisplayState,

    // === Input State ===
    /// User input buffer
    input_buffer: String,
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Total rendered lines (for scroll bounds)
    total_lines: usize,
    /// Citation lists expanded
    show_sources: bool,

    // === Service State ===
    health: ServiceHealth,
    health_probe: Option<oneshot::Receiver<bool>>,

    /// Terminal size
    size: (u16, u16),
}

impl App<HttpBackend> {
    /// Create an App talking HTTP to the configured service
    pub fn new(config: &BuddyConfig) -> anyhow::Result<Self> {
        Ok(Self::with_client(ConductorClient::from_config(config)?))
    }
}

impl<B: GuidanceBackend + 'static> App<B> {
    /// Create an App around an existing client
    pub fn with_client(conductor: ConductorClient<B>) -> Self {
        let mut app = Self {
            running: true,
            conductor,
            display: DisplayState::default(),
            input_buffer: String::new(),
            scroll_offset: 0,
            total_lines: 0,
            show_sources: false,
            health: ServiceHealth::Unknown,
            health_probe: None,
            size: (80, 24),
        };
        app.refresh_display();
        app
    }

    /// Main event loop
    pub async fn run<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> anyhow::Result<()> {
        let size = terminal.size()?;
        self.size = (size.width, size.height);

        let mut event_stream = EventStream::new();
        let mut ticker = tokio::time::interval(FRAME_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.start_health_probe();

        // Render initial frame immediately so user sees UI
        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Terminal event error");
                        }
                        None => {
                            tracing::info!("Terminal event stream closed");
                            self.running = false;
                        }
                    }
                }

                _ = ticker.tick() => {}
            }

            self.tick();
            self.render(terminal)?;
        }

        tracing::info!(session_id = %self.conductor.conductor().session_id(), "TUI exiting");
        Ok(())
    }

    /// Probe `/health` in the background; the result lands on a later tick
    pub fn start_health_probe(&mut self) {
        self.health = ServiceHealth::Unknown;
        self.health_probe = Some(self.conductor.spawn_health_check());
    }

    /// Poll background work and refresh the display snapshot
    pub fn tick(&mut self) {
        if self.conductor.poll().is_some() {
            // New content: jump to the latest message
            self.scroll_offset = 0;
        }
        self.poll_health();
        self.refresh_display();
    }

    /// Wait for the in-flight exchange, then refresh
    pub async fn settle(&mut self) {
        if self.conductor.wait().await.is_some() {
            self.scroll_offset = 0;
        }
        self.refresh_display();
    }

    fn poll_health(&mut self) {
        let Some(probe) = self.health_probe.as_mut() else {
            return;
        };
        let healthy = match probe.try_recv() {
            Ok(healthy) => healthy,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => false,
        };
        self.health_probe = None;
        self.health = if healthy {
            ServiceHealth::Online
        } else {
            ServiceHealth::Offline
        };
    }

    fn refresh_display(&mut self) {
        self.conductor.fill_display(&mut self.display);
        self.display.input.clone_from(&self.input_buffer);
        self.display.show_sources = self.show_sources;
        self.display.scroll_offset = self.scroll_offset;
        self.display.health = self.health;
    }

    /// Draw one frame
    pub fn render<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> anyhow::Result<()> {
        self.refresh_display();
        let mut total_lines = 0;
        terminal.draw(|frame| {
            total_lines = ui::draw(frame, &self.display);
        })?;
        self.total_lines = total_lines;
        Ok(())
    }

    /// Dispatch one terminal event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(w, h) => self.size = (w, h),
            _ => {}
        }
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            // Quit
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if ctrl => self.running = false,

            // Clear conversation
            KeyCode::Char('l') if ctrl => {
                self.conductor.clear();
                self.scroll_offset = 0;
            }

            // Submit; the buffer survives an ignored submission
            KeyCode::Enter => {
                let submission = self.conductor.submit(&self.input_buffer);
                self.after_submission(&submission);
                if submission.is_accepted() {
                    self.input_buffer.clear();
                }
            }

            // Quick actions F1-F6
            KeyCode::F(n @ 1..=6) => {
                let submission = self.conductor.quick_action(usize::from(n - 1));
                self.after_submission(&submission);
            }

            KeyCode::F(8) => self.show_sources = !self.show_sources,

            KeyCode::Tab => {
                let region = self.conductor.cycle_region();
                tracing::debug!(region = %region, "Region selected");
            }

            // Typing
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + self.page_size()).min(max_scroll);
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(self.page_size());
            }

            _ => {}
        }
        self.refresh_display();
    }

    fn after_submission(&mut self, submission: &Submission) {
        match submission {
            Submission::Accepted { .. } => self.scroll_offset = 0,
            Submission::Ignored(reason) => {
                tracing::debug!(reason = ?reason, "Submission ignored");
            }
        }
    }

    fn page_size(&self) -> usize {
        usize::from(self.size.1.saturating_sub(INPUT_HEIGHT + 3) / 2).max(1)
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + WHEEL_STEP).min(max_scroll);
            }
            MouseEventKind::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(WHEEL_STEP);
            }
            _ => {}
        }
    }

    /// Current display snapshot
    pub fn display_state(&self) -> &DisplayState {
        &self.display
    }

    /// Whether the event loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Borrow the conductor client
    pub fn client(&self) -> &ConductorClient<B> {
        &self.conductor
    }
}
