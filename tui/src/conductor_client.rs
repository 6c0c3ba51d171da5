//! Conductor Client
//!
//! Thin wrapper around the Conductor for TUI integration. The Conductor is
//! embedded in-process and talks to the guidance service over HTTP.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any business logic.
//! All conversation state lives in the Conductor. The TUI's job is:
//! 1. Convert terminal events to SurfaceEvents
//! 2. Send SurfaceEvents to the Conductor
//! 3. Poll the Conductor for finished exchanges
//! 4. Render a DisplayState snapshot of the Conductor

use buddy_conductor::{
    BuddyConfig, Conductor, ConductorState, ExchangeOutcome, GuidanceBackend, HttpBackend,
    Region, Submission, SurfaceEvent,
};

use tokio::sync::oneshot;

use crate::display::{DisplayMessage, DisplayState};

/// Client for the embedded Conductor
pub struct ConductorClient<B: GuidanceBackend + 'static = HttpBackend> {
    /// The embedded Conductor instance
    conductor: Conductor<B>,
}

impl ConductorClient<HttpBackend> {
    /// Create a client talking HTTP to the configured service
    pub fn from_config(config: &BuddyConfig) -> anyhow::Result<Self> {
        let backend = HttpBackend::from_config(&config.backend)?;
        tracing::info!(base_url = backend.base_url(), "Using guidance service");
        Ok(Self::with_backend(backend, config))
    }
}

impl<B: GuidanceBackend + 'static> ConductorClient<B> {
    /// Create a client around any backend
    pub fn with_backend(backend: B, config: &BuddyConfig) -> Self {
        Self {
            conductor: Conductor::new(backend, config.conductor.clone()),
        }
    }

    /// Send a surface event to the Conductor
    pub fn send_event(&mut self, event: SurfaceEvent) -> Option<Submission> {
        self.conductor.handle_event(event)
    }

    /// Submit typed text
    pub fn submit(&mut self, text: &str) -> Submission {
        self.conductor.dispatch(text)
    }

    /// Submit a quick action by index
    pub fn quick_action(&mut self, index: usize) -> Submission {
        self.conductor.quick_action(index)
    }

    /// Advance the region selector
    pub fn cycle_region(&mut self) -> Region {
        let next = self.conductor.region().next();
        self.conductor
            .handle_event(SurfaceEvent::RegionChanged { region: next });
        next
    }

    /// Clear the conversation
    pub fn clear(&mut self) {
        self.conductor.handle_event(SurfaceEvent::ClearConversation);
    }

    /// Apply a finished exchange, if any (must be called regularly)
    pub fn poll(&mut self) -> Option<ExchangeOutcome> {
        self.conductor.poll_response()
    }

    /// Wait for the in-flight exchange, if any
    pub async fn wait(&mut self) -> Option<ExchangeOutcome> {
        self.conductor.wait_for_response().await
    }

    /// Probe the service
    pub async fn health_check(&self) -> bool {
        self.conductor.health_check().await
    }

    /// Probe the service in the background
    ///
    /// The receiver yields the result once; the render loop polls it.
    pub fn spawn_health_check(&self) -> oneshot::Receiver<bool> {
        let (tx, rx) = oneshot::channel();
        let backend = self.conductor.backend();
        tokio::spawn(async move {
            let healthy = backend.health_check().await;
            tracing::info!(healthy, "Service health probe finished");
            let _ = tx.send(healthy);
        });
        rx
    }

    /// Get the current Conductor state
    pub fn state(&self) -> ConductorState {
        self.conductor.state()
    }

    /// Borrow the Conductor
    pub fn conductor(&self) -> &Conductor<B> {
        &self.conductor
    }

    /// Copy the Conductor's state into a display snapshot
    pub fn fill_display(&self, display: &mut DisplayState) {
        display.messages = self
            .conductor
            .messages()
            .iter()
            .map(DisplayMessage::from)
            .collect();
        display.banner = self.conductor.emergency_banner();
        display.last_error = self.conductor.last_error().map(String::from);
        display.conductor_state = self.conductor.state();
        display.region = self.conductor.region();
    }
}
