use crate::app::App;
use cyberhound::feed::Intercept;
use cyberhound::util::sanitize;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::deals::terms;

const KEY_STYLE: Style = Style::new().fg(Color::DarkGray);

fn intercept_lines(intercept: &Intercept) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "INTERCEPT CONFIRMED",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ))];
    let fields = [
        ("TARGET ", intercept.target.as_deref()),
        ("DEAL   ", intercept.deal.as_deref()),
        ("VERDICT", Some(intercept.verdict_or_unknown())),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", name), KEY_STYLE),
                Span::raw(sanitize(value).into_owned()),
            ]));
        }
    }
    lines.push(Line::raw(""));
    lines
}

/// Render the panel describing the last intercept and the selected record.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title("Target");

    let mut lines = app
        .view
        .last_intercept
        .as_ref()
        .map(intercept_lines)
        .unwrap_or_default();

    let Some(deal) = app.selected_deal() else {
        lines.push(Line::raw("No target selected"));
        f.render_widget(Paragraph::new(lines).block(block), area);
        return;
    };

    let key = KEY_STYLE;
    lines.push(Line::from(Span::styled(
        sanitize(&deal.label).into_owned(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(vec![
        Span::styled("ID     ", key),
        Span::raw(sanitize(&deal.id.to_string()).into_owned()),
    ]));
    if let Some(terms) = terms(deal) {
        lines.push(Line::from(vec![
            Span::styled("TERMS  ", key),
            Span::styled(sanitize(&terms).into_owned(), Style::default().fg(Color::Yellow)),
        ]));
    }
    for field in ["client", "difficulty", "status"] {
        if let Some(value) = deal.detail_text(field) {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<7}", field.to_uppercase()), key),
                Span::raw(sanitize(&value).into_owned()),
            ]));
        }
    }
    lines.push(Line::from(vec![
        Span::styled("LINK   ", key),
        Span::raw(sanitize(deal.link_or(&app.promo_url)).into_owned()),
    ]));
    if let Some(summary) = &deal.summary {
        lines.push(Line::raw(""));
        lines.push(Line::raw(sanitize(summary).into_owned()));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
