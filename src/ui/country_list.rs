//! Country list screen rendering
//!
//! Renders the explorer's filtered country list with the active region and
//! search, a selection cursor, and a footer with key hints and data freshness.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::Country;

/// Color for a population size (bigger = warmer)
fn population_color(population: u64) -> Color {
    if population >= 100_000_000 {
        Color::Red
    } else if population >= 10_000_000 {
        Color::Yellow
    } else if population >= 1_000_000 {
        Color::Green
    } else {
        Color::Cyan
    }
}

/// "67.4M", "850K" or "12K"
fn short_population(population: u64) -> String {
    if population >= 1_000_000 {
        format!("{:.1}M", population as f64 / 1_000_000.0)
    } else {
        format!("{}K", population / 1_000)
    }
}

/// Renders the country list view
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `app` - The application state containing the explorer and selection
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Filter header
            Constraint::Min(3),    // Country list
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_help(frame, chunks[2], app);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let filter = app.explorer.filter();
    let region = filter.region.map(|r| r.as_str()).unwrap_or("All regions");

    let search_style = if app.search_active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if app.search_active { "_" } else { "" };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                "TRIPBUDGET",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("Region: {}", region),
                Style::default().fg(Color::White),
            ),
            Span::raw("  "),
            Span::styled(format!("Search: {}{}", filter.search, cursor), search_style),
        ]),
        Line::from(Span::styled(
            "─".repeat((area.width as usize).saturating_sub(2)),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

fn country_line(country: &Country, is_selected: bool) -> Line<'static> {
    let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸ or space

    let name_style = if is_selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let capital = country.capital.first().cloned().unwrap_or_default();

    Line::from(vec![
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
        Span::raw(format!("{} ", country.flag())),
        Span::styled(format!("{:<28}", country.name.common), name_style),
        Span::styled(format!("{:<10}", country.region), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{:>7}", short_population(country.population)),
            Style::default().fg(population_color(country.population)),
        ),
        Span::raw("  "),
        Span::styled(capital, Style::default().fg(Color::DarkGray)),
    ])
}

/// Renders the list, scrolled so the selection stays visible
fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let countries = app.explorer.countries();
    let visible_rows = area.height.saturating_sub(2) as usize;
    let offset = if visible_rows > 0 && app.selected_index >= visible_rows {
        app.selected_index + 1 - visible_rows
    } else {
        0
    };

    let lines: Vec<Line> = if countries.is_empty() {
        vec![Line::from(Span::styled(
            "  No countries match the current filter",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        countries
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible_rows.max(1))
            .map(|(index, country)| country_line(country, index == app.selected_index))
            .collect()
    };

    let block = Block::default()
        .title(format!(" Destinations ({}) ", countries.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the help text at the bottom of the screen with data freshness
fn render_help(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(message) = &app.status_message {
        let paragraph = Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, area);
        return;
    }

    let mut help_spans = vec![
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Navigate  "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Details  "),
        Span::styled("/", Style::default().fg(Color::Yellow)),
        Span::raw(" Search  "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Region  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Refresh  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ];

    if let Some(last_refresh) = app.last_refresh {
        let elapsed = Local::now() - last_refresh;
        let mins_ago = elapsed.num_minutes();
        let freshness_text = if mins_ago < 1 {
            " │ Data: just now".to_string()
        } else if mins_ago < 60 {
            format!(" │ Data: {}m ago", mins_ago)
        } else {
            format!(" │ Data: {}h ago", elapsed.num_hours())
        };
        help_spans.push(Span::styled(
            freshness_text,
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph = Paragraph::new(Line::from(help_spans)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::loaded_app;
    use mockito::Server;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_all_countries_are_rendered() {
        let mut server = Server::new_async().await;
        let app = loaded_app(&mut server).await;

        let content = buffer_text(&app, 100, 24);

        assert!(content.contains("France"));
        assert!(content.contains("Japan"));
        assert!(content.contains("Kenya"));
        assert!(content.contains("Destinations (3)"));
        assert!(content.contains("All regions"));
    }

    #[tokio::test]
    async fn test_selected_item_has_cursor() {
        let mut server = Server::new_async().await;
        let app = loaded_app(&mut server).await;

        let content = buffer_text(&app, 100, 24);

        assert!(content.contains("▸"), "Selected row should carry the cursor");
    }

    #[tokio::test]
    async fn test_status_message_replaces_help() {
        let mut server = Server::new_async().await;
        let mut app = loaded_app(&mut server).await;
        app.status_message = Some("Failed to load countries: timeout".to_string());

        let content = buffer_text(&app, 100, 24);

        assert!(content.contains("Failed to load countries"));
        assert!(!content.contains("Navigate"));
    }

    #[tokio::test]
    async fn test_help_text_is_rendered() {
        let mut server = Server::new_async().await;
        let app = loaded_app(&mut server).await;

        let content = buffer_text(&app, 120, 24);

        assert!(content.contains("Navigate"));
        assert!(content.contains("Region"));
        assert!(content.contains("just now"));
    }

    #[test]
    fn test_short_population() {
        assert_eq!(short_population(67_391_582), "67.4M");
        assert_eq!(short_population(850_000), "850K");
        assert_eq!(population_color(1_400_000_000), Color::Red);
        assert_eq!(population_color(5_000), Color::Cyan);
    }
}
