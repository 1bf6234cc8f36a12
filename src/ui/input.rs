//! Keyboard input handling for the dashboard.

use crate::app::{App, AppEvent};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use cyberhound::util::validate_link;
use tokio::sync::mpsc;

use super::helpers::{spawn_refresh, spawn_scan};
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(Action::Quit),
        KeyCode::Char('q') | KeyCode::Esc => return Ok(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Char('s') => {
            let target = app.controller.default_target().to_string();
            spawn_scan(app, target, event_tx);
        }
        KeyCode::Char('r') => spawn_refresh(app, event_tx),
        KeyCode::Char('o') | KeyCode::Enter => open_selected(app),
        _ => {}
    }
    Ok(Action::Continue)
}

/// Open the selected record's link in the system browser.
fn open_selected(app: &mut App) {
    let Some(link) = app.selected_link().map(str::to_string) else {
        app.set_status("No intercept selected");
        return;
    };

    // Backend-supplied links go to the OS opener; only http(s) gets through.
    match validate_link(&link) {
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                app.set_status(format!("Failed to open browser: {}", e));
            } else {
                app.set_status(format!("Opening {}", url.host_str().unwrap_or("link")));
            }
        }
        Err(e) => app.set_status(e.to_string()),
    }
}
