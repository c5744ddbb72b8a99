//! Events flowing into the session loop, and what handling them asks for.
//!
//! The loop multiplexes:
//! - keyboard/resize events from the input thread ([`InputEvent`])
//! - three timer cadences (see [`super::scheduler::Cadence`])
//!
//! Every handler answers with an [`Outcome`]: keep going, redraw something,
//! or quit.

use crossterm::event::KeyEvent;

/// Terminal input forwarded by the keyboard thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Key press (releases are dropped by the producer).
    Key(KeyEvent),
    /// New terminal size, columns then rows.
    Resize(u16, u16),
}

/// What the screen needs after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    /// Advance the timestamp and repaint.
    Clock,
    /// Fetch quotes, then repaint. Skipped if the fetch fails.
    Quotes,
    /// Fetch the market header, then repaint. Skipped if the fetch fails.
    Market,
    /// Clear and repaint the normal view from the latest data.
    Dashboard,
    /// Clear and show the help screen.
    Help,
    /// Repaint the current state as is (editor echo, regrouping).
    Frame,
    /// Adopt the new terminal size, then repaint help or the normal view.
    Resize,
}

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Redraw(Redraw),
    Quit,
}
