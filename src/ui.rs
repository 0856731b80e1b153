//! Terminal renderer. Paints display-ready records from the render
//! pipeline; no payload access and no business logic here.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, DisplayState, Mode};
use crate::render::{self, Dashboard};

const SPINNERS: [&str; 4] = ["◐", "◓", "◑", "◒"];

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn value_style() -> Style {
    Style::default().fg(Color::Green)
}

pub fn draw(f: &mut Frame, app: &App, spinner: u32) {
    let dashboard = render::project(&app.session, app.selected_day, Local::now().naive_local());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_search_bar(f, rows[0], app, spinner);

    match app.display {
        DisplayState::NoResults => draw_notice(
            f,
            rows[1],
            "No search result found!",
            "Try searching for another place.",
        ),
        DisplayState::Error => draw_notice(
            f,
            rows[1],
            "Something went wrong.",
            "Press r to retry.",
        ),
        DisplayState::Content | DisplayState::Loading => {
            draw_content(f, rows[1], &dashboard);
        }
    }

    draw_help_bar(f, rows[2], app.mode);
    draw_suggestions(f, rows[0], app);
}

fn draw_search_bar(f: &mut Frame, area: Rect, app: &App, spinner: u32) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(24)])
        .split(area);

    let title = if app.display == DisplayState::Loading {
        format!("Search {}", SPINNERS[(spinner as usize / 2) % SPINNERS.len()])
    } else {
        "Search".to_string()
    };
    let query = if app.mode == Mode::Search {
        Line::from(vec![
            Span::raw(app.query.clone()),
            Span::styled("▌", Style::default().fg(Color::Yellow)),
        ])
    } else {
        Line::from(Span::raw(app.query.clone()))
    };
    f.render_widget(Paragraph::new(query).block(panel_block(&title)), columns[0]);

    let units = app.session.units;
    let segments = Line::from(vec![
        Span::styled(units.temperature.label(), value_style()),
        Span::raw(" · "),
        Span::styled(units.wind.label(), value_style()),
        Span::raw(" · "),
        Span::styled(units.precipitation.label(), value_style()),
    ]);
    f.render_widget(
        Paragraph::new(segments)
            .alignment(Alignment::Center)
            .block(panel_block("Units")),
        columns[1],
    );
}

fn draw_content(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Min(4),
        ])
        .split(area);

    draw_current(f, rows[0], dashboard);
    draw_info_cards(f, rows[1], dashboard);
    draw_daily(f, rows[2], dashboard);
    draw_hourly(f, rows[3], dashboard);
}

fn draw_current(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let current = &dashboard.current;
    let lines = vec![
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                current.location.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(format!(" {}", current.date)),
        Line::from(""),
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                format!("{} {}", current.icon.symbol(), current.temperature),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(current.icon.label()),
        ]),
    ];
    f.render_widget(
        Paragraph::new(lines).block(panel_block("Current Conditions")),
        area,
    );
}

fn draw_info_cards(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let current = &dashboard.current;
    let cards = [
        ("Feels Like", &current.feels_like),
        ("Humidity", &current.humidity),
        ("Wind", &current.wind),
        ("Precipitation", &current.precipitation),
    ];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area);
    for ((title, value), column) in cards.iter().zip(columns.iter()) {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled((*value).clone(), value_style())))
                .alignment(Alignment::Center)
                .block(panel_block(title)),
            *column,
        );
    }
}

fn draw_daily(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let block = panel_block("Daily Forecast");
    let inner = block.inner(area);
    f.render_widget(block, area);
    if dashboard.daily.is_empty() {
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Ratio(1, dashboard.daily.len() as u32);
            dashboard.daily.len()
        ])
        .split(inner);
    for (entry, column) in dashboard.daily.iter().zip(columns.iter()) {
        let lines = vec![
            Line::from(entry.day.clone()),
            Line::from(entry.icon.symbol()),
            Line::from(vec![
                Span::styled(entry.high.clone(), value_style()),
                Span::raw(" "),
                Span::styled(entry.low.clone(), Style::default().fg(Color::DarkGray)),
            ]),
        ];
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), *column);
    }
}

fn draw_hourly(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let block = panel_block("Hourly Forecast");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    // Day picker: one label per distinct calendar day, selection highlighted.
    let mut picker = vec![Span::raw(" ")];
    for (i, label) in dashboard.day_picker.iter().enumerate() {
        if i > 0 {
            picker.push(Span::raw("  "));
        }
        let style = if i == dashboard.selected_day {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        picker.push(Span::styled(label.clone(), style));
    }
    f.render_widget(Paragraph::new(Line::from(picker)), rows[0]);

    let items: Vec<ListItem> = dashboard
        .hourly
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {}  ", entry.icon.symbol())),
                Span::raw(format!("{:<6}", entry.time)),
                Span::styled(entry.temperature.clone(), value_style()),
            ]))
        })
        .collect();
    f.render_widget(List::new(items), rows[1]);
}

fn draw_notice(f: &mut Frame, area: Rect, headline: &str, hint: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            headline.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(hint.to_string()),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(panel_block("Weather")),
        area,
    );
}

fn draw_help_bar(f: &mut Frame, area: Rect, mode: Mode) {
    let text = match mode {
        Mode::Search => " type to search · ↑/↓ pick suggestion · Enter go · Esc cancel",
        Mode::Browse => " / search · t temp · w wind · p precip · d day · r retry · q quit",
    };
    f.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn draw_suggestions(f: &mut Frame, search_area: Rect, app: &App) {
    if app.mode != Mode::Search || app.suggestions.is_empty() {
        return;
    }
    let height = (app.suggestions.len() as u16).saturating_add(2);
    let overlay = Rect::new(
        search_area.x + 1,
        search_area.y + search_area.height,
        search_area.width.saturating_sub(2).min(48),
        height,
    )
    .intersection(f.area());
    if overlay.height < 3 {
        return;
    }

    let items: Vec<ListItem> = app
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let style = if app.suggestion_cursor == Some(i) {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(candidate.display_label(), style))
        })
        .collect();
    f.render_widget(Clear, overlay);
    f.render_widget(
        List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        overlay,
    );
}
