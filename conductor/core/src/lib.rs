//! Buddy Conductor - Headless Conversation Control for First-Aid Buddy
//!
//! This crate holds everything a First-Aid Buddy client needs to run a
//! conversation with the guidance service, independent of any UI framework.
//! It can drive the terminal surface, another front end, or run headless in
//! tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        UI Surfaces                              │
//! │  ┌───────────────┐   ┌───────────────────────────────────────┐  │
//! │  │  TUI (ratatui)│   │  Headless / tests (ScriptedBackend)   │  │
//! │  └───────┬───────┘   └──────────────────┬────────────────────┘  │
//! │          └──────────────┬───────────────┘                       │
//! │            SurfaceEvent (up) / read-only views (down)           │
//! └─────────────────────────┼───────────────────────────────────────┘
//!                           │
//! ┌─────────────────────────┼───────────────────────────────────────┐
//! │                  CONDUCTOR CORE                                 │
//! │  ┌──────────────────────┴────────────────────────────────────┐  │
//! │  │                      Conductor                            │  │
//! │  │  ┌──────────┐  ┌──────────────┐  ┌──────────┐  ┌────────┐ │  │
//! │  │  │ Session  │  │ Conversation │  │Emergency │  │Backend │ │  │
//! │  │  │ + Region │  │    Store     │  │ Watcher  │  │ (HTTP) │ │  │
//! │  │  └──────────┘  └──────────────┘  └──────────┘  └────────┘ │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: the submission controller; owns all conversation state
//! - [`SurfaceEvent`]: user actions reported by a surface
//! - [`Session`]: session id, region and the message log
//! - [`EmergencyBanner`]: derived banner state
//! - [`GuidanceBackend`]: the transport seam ([`HttpBackend`], [`ScriptedBackend`])
//!
//! # Quick Start
//!
//! ```ignore
//! use buddy_conductor::{load_config, Conductor, HttpBackend, SurfaceEvent};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let backend = HttpBackend::from_config(&config.backend)?;
//!     let mut conductor = Conductor::new(backend, config.conductor);
//!
//!     conductor.handle_event(SurfaceEvent::submit("Someone is choking"));
//!     conductor.wait_for_response().await;
//!
//!     if let Some(banner) = conductor.emergency_banner() {
//!         println!("Call {} immediately", banner.emergency_number);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod conductor;
pub mod config;
pub mod events;
pub mod messages;
pub mod quick_actions;
pub mod region;
pub mod session;
pub mod watcher;

// Re-exports for convenience
pub use backend::{
    BackendConfig, ChatRequest, ChatResponse, GuidanceBackend, HttpBackend, ScriptedBackend,
    TransportError,
};
pub use conductor::{
    Conductor, ConductorConfig, ExchangeOutcome, IgnoreReason, LateResponsePolicy, Submission,
};
pub use events::SurfaceEvent;
pub use messages::{Citation, ConductorState, MessageId, MessageRole, SessionId};
pub use quick_actions::{quick_action, QuickAction, QUICK_ACTIONS};
pub use region::Region;
pub use session::{Conversation, ConversationMessage, Session, SessionMetadata};
pub use watcher::{active_banner, EmergencyBanner};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, BuddyConfig, BuddyToml, ConfigError,
    ConfigOverrides, ConfigSource,
};
