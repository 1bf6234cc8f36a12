use crate::app::App;
use cyberhound::feed::Deal;
use cyberhound::util::{sanitize, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Width reserved for the score column, e.g. ` 92.0 `.
const SCORE_WIDTH: usize = 7;

/// One-line summary of a record's reward terms, if it carries any.
pub(super) fn terms(deal: &Deal) -> Option<String> {
    if let Some(reward) = deal.detail_text("reward") {
        return Some(reward);
    }
    match (
        deal.detail_text("discount_amount"),
        deal.detail_text("duration_months"),
    ) {
        (Some(discount), Some(months)) => Some(format!("{}% off / {} mo", discount, months)),
        (Some(discount), None) => Some(format!("{}% off", discount)),
        (None, Some(months)) => Some(format!("{} mo", months)),
        (None, None) => None,
    }
}

/// Render the intercept list panel
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let label_width = inner_width.saturating_sub(SCORE_WIDTH);

    let items: Vec<ListItem> = if app.deals().is_empty() {
        vec![ListItem::new("No intercepts")]
    } else {
        app.deals()
            .iter()
            .enumerate()
            .map(|(i, deal)| {
                let score = deal
                    .value_score
                    .map_or_else(|| "   -- ".to_string(), |s| format!("{:>5.1} ", s));
                let label = sanitize(&deal.label);
                let label = truncate_to_width(&label, label_width).into_owned();

                let style = if i == app.selected {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else {
                    Style::default()
                };

                let mut lines = vec![Line::from(vec![
                    Span::styled(score, Style::default().fg(Color::Green)),
                    Span::styled(label, style.add_modifier(Modifier::BOLD)),
                ])];
                if let Some(terms) = terms(deal) {
                    let terms = sanitize(&terms);
                    let terms = truncate_to_width(&terms, label_width).into_owned();
                    lines.push(Line::from(vec![
                        Span::raw(" ".repeat(SCORE_WIDTH - 1)),
                        Span::styled(terms, style.fg(Color::Yellow)),
                    ]));
                }
                ListItem::new(lines)
            })
            .collect()
    };

    let title = if app.view.status.is_simulated() {
        format!("Intercepts ({}, simulated)", app.deals().len())
    } else {
        format!("Intercepts ({})", app.deals().len())
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );

    let mut state = ListState::default();
    if !app.deals().is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}
