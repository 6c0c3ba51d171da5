//! First-Aid Buddy TUI - Terminal interface for the guidance service
//!
//! A full-screen chat client. All conversation behavior lives in the
//! embedded `buddy-conductor`; this crate only turns key presses into
//! Conductor calls and draws what the Conductor reports.
//!
//! # Architecture
//!
//! - **App**: event loop, key bindings, scroll state
//! - **ConductorClient**: thin wrapper over the embedded Conductor
//! - **Display**: per-frame snapshot and text helpers
//! - **Markup**: bullet/emphasis parsing for answers
//! - **UI**: ratatui layout and widgets

pub mod app;
pub mod conductor_client;
pub mod display;
pub mod markup;
pub mod theme;
pub mod ui;

pub use app::App;
