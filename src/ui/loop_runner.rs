//! Dashboard event loop and terminal lifecycle.

use crate::app::{App, AppEvent};
use anyhow::Result;
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

use super::events::handle_app_event;
use super::input::handle_input;
use super::render::render;

/// What the loop should do after a key press.
pub enum Action {
    Continue,
    Quit,
}

/// Number of frames in the busy spinner animation.
pub(super) const SPINNER_FRAMES: usize = 10;

/// Redraw cadence while idle; also how quickly scheduler polls show up.
const TICK: Duration = Duration::from_millis(250);

/// Raw mode plus alternate screen, undone on drop.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        // Restore before the panic message prints, or it lands in the
        // alternate screen and vanishes.
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            leave_screen(&mut io::stdout());
            previous(info);
        }));

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        leave_screen(self.terminal.backend_mut());
        if let Err(e) = self.terminal.show_cursor() {
            tracing::warn!(error = %e, "Failed to restore cursor");
        }
    }
}

fn leave_screen<W: io::Write>(out: &mut W) {
    let _ = disable_raw_mode();
    let _ = execute!(out, LeaveAlternateScreen);
}

/// SIGINT/SIGTERM as a single awaitable. Never fires off Unix.
struct ShutdownSignals {
    #[cfg(unix)]
    term: tokio::signal::unix::Signal,
    #[cfg(unix)]
    int: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            term: signal(SignalKind::terminate())?,
            int: signal(SignalKind::interrupt())?,
        })
    }

    /// Resolves with the signal name.
    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.term.recv() => "SIGTERM",
            _ = self.int.recv() => "SIGINT",
        }
    }
}

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self {})
    }

    async fn recv(&mut self) -> &'static str {
        std::future::pending().await
    }
}

/// Run the dashboard until the user quits or a shutdown signal arrives.
///
/// The loop multiplexes, in priority order: shutdown signals, terminal
/// events, background task results, and a [`TICK`] timer. Feed data is never
/// pushed into the loop; each pass pulls the controller's view and redraws
/// only if its version moved.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let mut signals = ShutdownSignals::install()?;
    let mut input = EventStream::new();
    let mut ticker = tokio::time::interval(TICK);

    loop {
        // Background results first, so a burst of key presses cannot starve them
        while let Ok(event) = event_rx.try_recv() {
            handle_app_event(app, event);
            app.needs_redraw = true;
        }
        let view_changed = app.sync_view();
        let status_expired = app.clear_expired_status();
        if view_changed || status_expired {
            app.needs_redraw = true;
        }

        if std::mem::take(&mut app.needs_redraw) {
            guard.terminal.draw(|f| render(f, app))?;
        }

        tokio::select! {
            biased;

            name = signals.recv() => {
                tracing::info!(signal = name, "Shutting down on signal");
                break;
            }

            event = input.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    app.needs_redraw = true;
                    match handle_input(app, key.code, key.modifiers, &event_tx) {
                        Ok(Action::Quit) => break,
                        Ok(Action::Continue) => {}
                        Err(e) => app.set_status(format!("Error: {}", e)),
                    }
                }
                Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                Some(Ok(_)) => {}
                Some(Err(e)) => tracing::warn!(error = %e, "Terminal event stream error"),
                None => {
                    tracing::warn!("Terminal event stream closed");
                    break;
                }
            },

            Some(event) = event_rx.recv() => {
                handle_app_event(app, event);
                app.needs_redraw = true;
            }

            _ = ticker.tick() => {
                if app.is_busy() {
                    app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES;
                    app.needs_redraw = true;
                }
            }
        }
    }

    drop(guard);
    Ok(())
}
