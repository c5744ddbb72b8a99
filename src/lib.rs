//! marketdeck: live market and stock quotes in a full-screen terminal
//! dashboard.
//!
//! Profile persistence, the quote feed and the interactive session
//! controller.

pub mod config;
pub mod market;
pub mod profile;
pub mod tui;
