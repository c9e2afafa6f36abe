// ============================================================================
// Module : ui
// ============================================================================
// Terminal user interface rendering. Pure view code: everything reads from
// App, nothing mutates it.
// ============================================================================

pub mod comparison; // Multi-series NAV chart
pub mod events;     // Keyboard event handling
pub mod funds;      // Fund selection screen (list, filters, footer)
pub mod login;      // Login form

pub use events::{Event, EventHandler};

use ratatui::Frame;

use crate::app::{App, Screen};

/// Draws the active screen.
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Login => login::render(frame, app),
        Screen::Funds | Screen::Input => funds::render(frame, app),
        Screen::Comparison => comparison::render(frame, app),
    }
}
