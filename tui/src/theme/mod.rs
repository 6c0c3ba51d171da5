//! Theme and Colors
//!
//! First-Aid Buddy's palette. Red is reserved for emergencies and errors so
//! the banner is never confused with ordinary content.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Roles
// ============================================================================

/// User messages - calm blue
pub const USER_BLUE: Color = Color::Rgb(79, 142, 247);

/// Assistant name and accents - warm orange
pub const BUDDY_ORANGE: Color = Color::Rgb(251, 146, 60);

/// Assistant body text
pub const TEXT_PRIMARY: Color = Color::Rgb(230, 230, 235);

/// Secondary text (hints, citations, separators)
pub const DIM_GRAY: Color = Color::Rgb(110, 110, 120);

/// Faded lines at the scroll edges
pub const FADE_GRAY: Color = Color::Rgb(80, 80, 80);

// ============================================================================
// Alerts
// ============================================================================

/// Emergency banner
pub const EMERGENCY_RED: Color = Color::Rgb(240, 71, 71);

/// Emergency advisory text
pub const EMERGENCY_SOFT: Color = Color::Rgb(248, 113, 113);

/// Error line
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Service reachable
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Busy indicator
pub const THINKING_YELLOW: Color = Color::Rgb(255, 223, 128);

// ============================================================================
// Styles
// ============================================================================

/// Style for `**emphasized**` runs
pub fn emphasis() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Style for the banner headline
pub fn banner_headline() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(EMERGENCY_RED)
        .add_modifier(Modifier::BOLD)
}
