//! Session loop: one task waiting on the keyboard and three timers.
//!
//! Each selected event is handled to completion (including any fetch and
//! repaint it asks for) before the loop waits again.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::market::arrange::arrange;
use crate::market::feed::Feed;
use crate::market::{MarketSnapshot, Quote};
use crate::profile::Profile;

use super::app::Session;
use super::event::{InputEvent, Outcome, Redraw};
use super::scheduler::RefreshScheduler;
use super::screen::{Overlay, Screen, TerminalScreen, View};

/// Keyboard events buffered between the input thread and the loop.
pub const INPUT_BUFFER: usize = 64;

/// How often the input thread checks whether the loop is gone.
const INPUT_POLL: Duration = Duration::from_millis(250);

pub struct SessionLoop<S, F> {
    session: Session,
    profile: Profile,
    screen: S,
    feed: F,
    market: MarketSnapshot,
    quotes: Vec<Quote>,
    clock: DateTime<Local>,
}

impl<S: Screen, F: Feed> SessionLoop<S, F> {
    pub fn new(profile: Profile, screen: S, feed: F) -> Self {
        let session = Session::new(screen.visible_rows());
        Self {
            session,
            profile,
            screen,
            feed,
            market: MarketSnapshot::default(),
            quotes: Vec::new(),
            clock: Local::now(),
        }
    }

    /// Run until quit (or until the input channel closes). Hands the
    /// profile back so the caller can save it.
    pub async fn run(mut self, mut input: mpsc::Receiver<InputEvent>) -> Profile {
        info!(tickers = self.profile.tickers.len(), "session started");
        self.refresh_market().await;
        self.refresh_quotes().await;
        self.apply(Redraw::Dashboard).await;

        let mut scheduler = RefreshScheduler::start();
        loop {
            let outcome = tokio::select! {
                event = input.recv() => match event {
                    Some(event) => self.session.handle_input(event, &mut self.profile),
                    None => {
                        info!("input closed");
                        Outcome::Quit
                    }
                },
                cadence = scheduler.next() => self.session.handle_tick(cadence),
            };

            match outcome {
                Outcome::Continue => {}
                Outcome::Redraw(redraw) => self.apply(redraw).await,
                Outcome::Quit => break,
            }
        }

        info!("session ended");
        self.profile
    }

    async fn apply(&mut self, redraw: Redraw) {
        debug!(?redraw, "redraw");
        match redraw {
            Redraw::Clock => {
                self.clock = Local::now();
                self.render();
            }
            Redraw::Quotes => {
                if self.refresh_quotes().await {
                    self.render();
                }
            }
            Redraw::Market => {
                if self.refresh_market().await {
                    self.render();
                }
            }
            Redraw::Dashboard | Redraw::Help => {
                self.clear();
                self.render();
            }
            Redraw::Frame => self.render(),
            Redraw::Resize => {
                if let Err(e) = self.screen.resize() {
                    warn!(error = %e, "resize failed");
                }
                self.session
                    .set_visible_rows(self.screen.visible_rows(), self.profile.tickers.len());
                self.render();
            }
        }
    }

    async fn refresh_quotes(&mut self) -> bool {
        match self.feed.quotes(&self.profile.tickers).await {
            Ok(quotes) => {
                self.quotes = quotes;
                true
            }
            Err(e) => {
                warn!(error = %e, "quote refresh failed");
                false
            }
        }
    }

    async fn refresh_market(&mut self) -> bool {
        match self.feed.market().await {
            Ok(market) => {
                self.market = market;
                true
            }
            Err(e) => {
                warn!(error = %e, "market refresh failed");
                false
            }
        }
    }

    fn clear(&mut self) {
        if let Err(e) = self.screen.clear() {
            warn!(error = %e, "clear failed");
        }
    }

    fn render(&mut self) {
        let view = View {
            market: &self.market,
            quotes: arrange(&self.quotes, &self.profile),
            clock: self.clock,
            paused: self.session.paused(),
            offset: self.session.offset(),
            sort_column: self.profile.sort_column(),
            ascending: self.profile.ascending,
            filter: self.profile.filter(),
            overlay: Overlay::from(self.session.mode()),
        };
        if let Err(e) = self.screen.draw(&view) {
            warn!(error = %e, "draw failed");
        }
    }
}

/// Forward terminal key presses and resizes until the receiver goes away.
pub fn spawn_input_thread(tx: mpsc::Sender<InputEvent>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("keyboard".into())
        .spawn(move || loop {
            if tx.is_closed() {
                break;
            }
            match event::poll(INPUT_POLL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(error = %e, "terminal poll failed");
                    break;
                }
            }
            let forwarded = match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => InputEvent::Key(key),
                Ok(Event::Resize(cols, rows)) => InputEvent::Resize(cols, rows),
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "terminal read failed");
                    break;
                }
            };
            if tx.blocking_send(forwarded).is_err() {
                break;
            }
        })
}

/// Take over the terminal, run the dashboard, and give the terminal back.
pub async fn run_dashboard<F: Feed>(profile: Profile, feed: F) -> anyhow::Result<Profile> {
    enter_terminal()?;

    let result = async {
        let screen = TerminalScreen::new()?;
        let (tx, rx) = mpsc::channel(INPUT_BUFFER);
        spawn_input_thread(tx)?;
        Ok::<_, anyhow::Error>(SessionLoop::new(profile, screen, feed).run(rx).await)
    }
    .await;

    restore_terminal()?;
    result
}

/// Raw mode, alternate screen, hidden cursor. A failure part way leaves the
/// terminal as it was found.
fn enter_terminal() -> io::Result<()> {
    enable_raw_mode()?;
    undo_on_error(
        || {
            io::stdout().execute(EnterAlternateScreen)?.execute(Hide)?;
            Ok(())
        },
        || {
            if let Err(e) = restore_terminal() {
                warn!(error = %e, "terminal restore failed");
            }
        },
    )
}

/// Run `steps`, calling `undo` before returning their error.
fn undo_on_error<T>(
    steps: impl FnOnce() -> io::Result<T>,
    undo: impl FnOnce(),
) -> io::Result<T> {
    steps().inspect_err(|_| undo())
}

fn restore_terminal() -> io::Result<()> {
    let raw = disable_raw_mode();
    io::stdout().execute(Show)?.execute(LeaveAlternateScreen)?;
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn failed_setup_is_undone() {
        let undone = Cell::new(false);
        let result: io::Result<()> = undo_on_error(
            || Err(io::Error::other("alternate screen unavailable")),
            || undone.set(true),
        );
        assert_eq!(result.unwrap_err().to_string(), "alternate screen unavailable");
        assert!(undone.get());
    }

    #[test]
    fn successful_setup_is_kept() {
        let undone = Cell::new(false);
        let result = undo_on_error(|| Ok(7), || undone.set(true));
        assert_eq!(result.unwrap(), 7);
        assert!(!undone.get());
    }
}
