use crate::app::App;
use cyberhound::util::{sanitize, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the activity log, newest entry on top.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .view
        .log
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let text = sanitize(&entry.display()).into_owned();
            let text = truncate_to_width(&text, width).into_owned();
            let style = if i == 0 {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title("Activity"),
    );
    f.render_widget(list, area);
}
