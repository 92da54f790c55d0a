//! Country detail screen rendering
//!
//! Shows the display facts for one country and its destination photo links.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, DetailView};

fn fact_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<15}", label), Style::default().fg(Color::Yellow)),
        Span::raw(value.to_string()),
    ])
}

fn detail_lines(view: &DetailView) -> Vec<Line<'static>> {
    let d = &view.details;
    let mut lines = vec![
        fact_line("Official name", &d.official_name),
        fact_line("Capital", &d.capital),
        fact_line("Region", &d.region),
        fact_line("Area", &d.area),
        fact_line("Population", &d.population),
        fact_line("Languages", &d.languages),
        fact_line("Currencies", &d.currencies),
        fact_line("Timezones", &d.timezones),
        Line::from(""),
        Line::from(Span::styled(
            "Photos",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    match &view.photos {
        None => lines.push(Line::from(Span::styled(
            "  Loading destination photos...",
            Style::default().fg(Color::DarkGray),
        ))),
        Some(photos) if photos.is_empty() => lines.push(Line::from(Span::styled(
            "  No photos available",
            Style::default().fg(Color::DarkGray),
        ))),
        Some(photos) => {
            for photo in photos {
                let url = photo
                    .urls
                    .small
                    .clone()
                    .or_else(|| photo.urls.regular.clone())
                    .unwrap_or_default();
                lines.push(Line::from(vec![
                    Span::raw(format!("  {}  ", photo.caption(&d.name))),
                    Span::styled(url, Style::default().fg(Color::Cyan)),
                ]));
            }
            lines.push(Line::from(Span::styled(
                "  Photos from Unsplash",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines
}

/// Renders the detail view for `app.detail`
pub fn render(frame: &mut Frame, app: &App) {
    let Some(view) = app.detail.as_ref() else {
        return;
    };
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let block = Block::default()
        .title(format!(" {} {} ", view.details.flag, view.details.name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(detail_lines(view))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll_offset, 0));
    frame.render_widget(paragraph, chunks[0]);

    render_help(frame, chunks[1]);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = Line::from(vec![
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Scroll  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" Back  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ]);
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
