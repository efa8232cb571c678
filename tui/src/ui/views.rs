use crate::app::{App, AuthMode};
use chrono::Datelike;
use climatica_core::models::{FrostRisk, HeatRisk};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
    },
    Frame,
};

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

// =========================
// Login / register
// =========================

pub fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.auth;
    let (title, switch_hint) = match form.mode {
        AuthMode::Login => (" Climatica · Log in ", "Ctrl+R: create an account"),
        AuthMode::Register => (" Climatica · Register ", "Ctrl+R: back to log in"),
    };

    let mut lines = vec![Line::from("")];
    for (i, label) in form.labels().iter().enumerate() {
        let value = &form.values[i];
        let shown = if form.is_secret(i) {
            "•".repeat(value.chars().count())
        } else {
            value.clone()
        };
        let focused = i == form.focus;
        let cursor = if focused { "▊" } else { "" };
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(format!(" {}", label), label_style)));
        lines.push(Line::from(format!("   {}{}", shown, cursor)));
        lines.push(Line::from(""));
    }

    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!(" Enter: submit · Tab: next field · {} · Esc: quit", switch_hint),
        Style::default().fg(Color::DarkGray),
    )));

    let popup = centered(area, 64, lines.len() as u16 + 2);
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

// =========================
// Map
// =========================

pub fn render_map_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_location_bar(frame, app, rows[0]);

    let map_area = if app.map.panel_open {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(36)])
            .split(rows[1]);
        render_favorites_panel(frame, app, cols[1]);
        cols[0]
    } else {
        rows[1]
    };

    render_world_map(frame, app, map_area);
    app.map.canvas_area = Some(map_area);
}

fn render_location_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.map.search_open {
        Line::from(vec![
            Span::styled(" Search: ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{}▊", app.map.search_query)),
        ])
    } else {
        let address = app.map.address.display_name();
        let place = if address.is_empty() {
            Span::styled("unknown place (g to look up)", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(address, Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        };
        Line::from(vec![
            Span::styled(
                format!(" ⌖ {} ", app.map.selected),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("· "),
            place,
        ])
    };
    let bar = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Location "));
    frame.render_widget(bar, area);
}

fn render_world_map(frame: &mut Frame, app: &App, area: Rect) {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let (x_bounds, y_bounds) = app.map_bounds(inner);

    let favorites: Vec<(f64, f64, String)> = app
        .favorites
        .list()
        .iter()
        .map(|f| (f.lng, f.lat, f.name.clone()))
        .collect();
    let selected = (app.map.selected.lng, app.map.selected.lat);
    let title = format!(" World · span {:.1}° ", app.map.span);

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::Green,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for (lng, lat, name) in &favorites {
                ctx.print(
                    *lng,
                    *lat,
                    Span::styled(format!("★ {}", name), Style::default().fg(Color::Yellow)),
                );
            }
            ctx.draw(&Points {
                coords: &[selected],
                color: Color::Red,
            });
            ctx.print(selected.0, selected.1, Span::styled("◉", Style::default().fg(Color::Red)));
        });
    frame.render_widget(canvas, area);
}

fn render_favorites_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Favorites ");

    if app.favorites.is_empty() {
        let empty = Paragraph::new("No favorites yet. Press 'a' to save the marker.")
            .block(block)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .favorites
        .list()
        .iter()
        .map(|f| {
            let name = if app.map.editing == Some(f.id) {
                Span::styled(
                    format!("{}▊", app.map.edit_buffer),
                    Style::default().fg(Color::Yellow),
                )
            } else {
                Span::raw(f.name.clone())
            };
            ListItem::new(vec![
                Line::from(vec![Span::raw("★ "), name]),
                Line::from(Span::styled(
                    format!("  {:.4}, {:.4}", f.lat, f.lng),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    let mut state = ListState::default();
    state.select(Some(app.map.panel_index));
    frame.render_stateful_widget(list, area, &mut state);
}

// =========================
// Dashboard
// =========================

fn frost_color(risk: FrostRisk) -> Color {
    match risk {
        FrostRisk::Low => Color::Green,
        FrostRisk::Medium => Color::Yellow,
        FrostRisk::High => Color::LightBlue,
    }
}

fn heat_color(risk: HeatRisk) -> Color {
    match risk {
        HeatRisk::Low => Color::Green,
        HeatRisk::Moderate => Color::Yellow,
        HeatRisk::High => Color::LightRed,
        HeatRisk::Extreme => Color::Red,
    }
}

fn card<'a>(title: &'a str, value: String, color: Color) -> Paragraph<'a> {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(title))
}

pub fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let Some(location) = app.dashboard_location() else {
        let empty = Paragraph::new(
            "No saved locations yet.\nOpen the map (1), pick a point and press 'a' to add it.",
        )
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(" Dashboard "));
        frame.render_widget(empty, area);
        return;
    };

    let alert = app.current_alert();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(if alert.is_some() { 3 } else { 0 }),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(area);

    let position = app
        .favorites
        .list()
        .iter()
        .position(|f| f.id == location.id)
        .map(|i| i + 1)
        .unwrap_or(1);
    let selector = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", location.name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("({}/{}) ", position, app.favorites.len()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(format!("· from {}", app.dashboard.date.format("%a %d %b %Y"))),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Location "));
    frame.render_widget(selector, rows[0]);

    if let Some(alert) = alert {
        let banner = Paragraph::new(format!(
            " {}: {:.1}°C at {}",
            alert.label(),
            app.dashboard.conditions.temperature_c,
            location.name
        ))
        .style(Style::default().fg(Color::White).bg(Color::Red))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(banner, rows[1]);
    }

    let c = &app.dashboard.conditions;
    let three = [
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ];
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(three)
        .split(rows[2]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(three)
        .split(rows[3]);

    frame.render_widget(card(" Temperature ", format!("{:.1} °C", c.temperature_c), Color::LightYellow), top[0]);
    frame.render_widget(card(" Wind ", format!("{:.0} km/h", c.wind_kmh), Color::White), top[1]);
    frame.render_widget(card(" Humidity ", format!("{} %", c.humidity_pct), Color::LightBlue), top[2]);
    frame.render_widget(card(" Rain ", format!("{} %", c.rain_chance), Color::Blue), bottom[0]);
    frame.render_widget(card(" Frost risk ", c.frost_risk.to_string(), frost_color(c.frost_risk)), bottom[1]);
    frame.render_widget(card(" Heat risk ", c.heat_risk.to_string(), heat_color(c.heat_risk)), bottom[2]);

    render_forecast(frame, app, rows[4]);
}

fn render_forecast(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Forecast ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let days = &app.dashboard.forecast;
    if days.is_empty() {
        return;
    }
    let constraints: Vec<Constraint> = days
        .iter()
        .map(|_| Constraint::Ratio(1, days.len() as u32))
        .collect();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(inner);

    for (day, col) in days.iter().zip(cols.iter()) {
        let lines = vec![
            Line::from(Span::styled(
                format!("{} {}", day.date.weekday(), day.date.format("%d/%m")),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("☂ {}%", day.rain_chance)),
            Line::from(Span::styled(
                format!("❄ {}", day.frost_risk),
                Style::default().fg(frost_color(day.frost_risk)),
            )),
            Line::from(Span::styled(
                format!("☀ {}", day.heat_risk),
                Style::default().fg(heat_color(day.heat_risk)),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), *col);
    }
}

// =========================
// Settings
// =========================

pub fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let items: Vec<ListItem> = App::NOTIFICATION_CHANNELS
        .iter()
        .enumerate()
        .map(|(i, channel)| {
            let mark = if app.notification_enabled(i) { "[x]" } else { "[ ]" };
            ListItem::new(format!(" {} {} notifications", mark, channel))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Notifications "))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    let mut state = ListState::default();
    state.select(Some(app.settings.index));
    frame.render_stateful_widget(list, rows[0], &mut state);

    let alerts = &app.config.alerts;
    let info = vec![
        Line::from(format!(" Saved favorites: {}", app.favorites.len())),
        Line::from(format!(" Frost alert at or below {:.1} °C", alerts.frost_threshold_c)),
        Line::from(format!(" Heat alert at or above {:.1} °C", alerts.heat_threshold_c)),
        Line::from(format!(
            " Geocoding: {}",
            if app.config.geocoder.enabled {
                app.config.geocoder.base_url.as_str()
            } else {
                "disabled"
            }
        )),
        Line::from(""),
        Line::from(Span::styled(
            " Notification choices last for this session only.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let panel = Paragraph::new(info)
        .block(Block::default().borders(Borders::ALL).title(" Preferences "))
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, rows[1]);
}
