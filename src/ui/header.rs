use crate::app::App;
use cyberhound::feed::SyncStatus;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::loop_runner::SPINNER_FRAMES;

const SPINNER: [&str; SPINNER_FRAMES] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn status_color(status: SyncStatus) -> Color {
    match status {
        SyncStatus::ConnectedLive => Color::Green,
        SyncStatus::ConnectedEmpty => Color::Yellow,
        SyncStatus::OfflineSimulated => Color::Red,
        SyncStatus::Scanning | SyncStatus::Initializing => Color::Cyan,
        SyncStatus::Idle => Color::DarkGray,
    }
}

/// Title bar with the link badge and clearance flag.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let status = app.view.status;
    let badge = if app.is_busy() {
        format!(" {} {} ", SPINNER[app.spinner_frame % SPINNER_FRAMES], status.label())
    } else {
        format!(" LINK: {} ", status.label())
    };

    let clearance = if app.clearance {
        Span::styled(
            " CLEARANCE: GRANTED ",
            Style::default().fg(Color::Black).bg(Color::Magenta),
        )
    } else {
        Span::styled(" CLEARANCE: RESTRICTED ", Style::default().fg(Color::DarkGray))
    };

    let line = Line::from(vec![
        Span::styled(
            "CYBERHOUND ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            badge,
            Style::default()
                .fg(Color::Black)
                .bg(status_color(status))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        clearance,
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let paragraph = Paragraph::new(line).block(block);
    f.render_widget(paragraph, area);
}
