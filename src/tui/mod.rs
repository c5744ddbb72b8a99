//! Full-screen dashboard and the session controller behind it.
//!
//! ## Architecture
//!
//! [`app::Session`] is the model: mode, pause flag, scroll offset. It turns
//! key presses and timer ticks into [`event::Outcome`]s and never touches
//! the terminal or the network. [`runner::SessionLoop`] owns the input
//! channel, the [`scheduler::RefreshScheduler`], the feed and the screen,
//! and performs whatever the session asks for. Rendering is immediate mode:
//! every draw builds a [`screen::View`] from the latest data.

pub mod app;
pub mod column_editor;
pub mod dashboard;
pub mod editor;
pub mod event;
pub mod input;
pub mod layout;
pub mod line_editor;
pub mod runner;
pub mod scheduler;
pub mod screen;
pub mod scroll;
