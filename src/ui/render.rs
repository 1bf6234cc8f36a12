//! Layout for the dashboard.

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    widgets::Paragraph,
    Frame,
};

use super::{activity, deals, detail, header, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 16;

/// Activity panel height: the full log plus borders.
const ACTIVITY_HEIGHT: u16 = cyberhound::feed::LOG_CAPACITY as u16 + 2;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    header::render(f, app, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    deals::render(f, app, columns[0]);

    // Activity log keeps its full height when there is room; the detail
    // panel takes what is left.
    let activity_height = ACTIVITY_HEIGHT.min(columns[1].height / 2);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(activity_height)])
        .split(columns[1]);

    detail::render(f, app, right[0]);
    activity::render(f, app, right[1]);
    status::render(f, app, rows[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyberhound::feed::{
        FeedSyncController, FixtureProvider, HttpIntelSource, Intercept, SyncOptions,
    };
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn test_app() -> App {
        let source = HttpIntelSource::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            "/latest_deals.json",
            "/api/scan",
            Duration::from_secs(1),
        )
        .unwrap();
        let controller = FeedSyncController::new(
            source,
            FixtureProvider::default(),
            SyncOptions {
                boot_sequence: Vec::new(),
                ..SyncOptions::default()
            },
        );
        App::new(controller, "https://promo.example".to_string(), true)
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[tokio::test]
    async fn test_render_offline_dashboard() {
        let mut app = test_app();
        app.controller.poll().await;
        app.sync_view();

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("CYBERHOUND"));
        assert!(text.contains("OFFLINE"));
        assert!(text.contains("CLEARANCE"));
        assert!(text.contains("ADOBE CREATIVE CLOUD"));
        assert!(text.contains("LINK FAILURE"));
    }

    #[tokio::test]
    async fn test_render_last_intercept() {
        let mut app = test_app();
        app.view.last_intercept = Some(Intercept {
            target: Some("Adobe".to_string()),
            deal: Some("3mo free".to_string()),
            verdict: Some("BUY".to_string()),
        });

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("INTERCEPT CONFIRMED"));
        assert!(text.contains("3mo free"));
        assert!(text.contains("VERDICT BUY"));
        assert!(text.contains("No target selected"));
    }

    #[tokio::test]
    async fn test_render_small_terminal_shows_message() {
        let app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("Terminal too small"));
    }

    #[tokio::test]
    async fn test_render_empty_snapshot() {
        let app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("IDLE"));
        assert!(text.contains("No intercepts"));
    }
}
