use crate::app::{App, MenuTarget, View};
use climatica_core::notice::NoticeKind;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the header with title and key hints
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" ☀ Climatica · {} ", app.view.label());

    let key_hints = match app.view {
        View::Map if app.map.search_open => " [Enter:Search] [Esc:Cancel] [Type a place] ",
        View::Map if app.map.editing.is_some() => " [Enter:Save] [Esc:Cancel] [Typing...] ",
        View::Map if app.map.panel_open => {
            " [↑/↓:Select] [Enter:Center] [e:Rename] [d:Delete] [Esc:Close] "
        }
        View::Map => {
            " [Arrows:Move] [+/-:Zoom] [g:Locate] [/:Search] [a:Add favorite] [f:Favorites] "
        }
        View::Dashboard => " [↑/↓:Location] [←/→:Date] [t:Today] [r:Refresh] ",
        View::Settings => " [↑/↓:Select] [Space:Toggle] ",
        View::Login => "",
    };

    let header_spans = vec![
        Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(key_hints, Style::default().fg(Color::DarkGray)),
    ];

    let header = Paragraph::new(Line::from(header_spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    frame.render_widget(header, area);
}

/// Render the navigation sidebar and record its clickable rows
pub fn render_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    let full = !app.sidebar_collapsed;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(if full { " Climatica " } else { "" });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let row = |y: u16| Rect {
        x: inner.x,
        y,
        width: inner.width,
        height: 1,
    };

    for (i, view) in View::MENU.iter().enumerate() {
        let y = inner.y + (i as u16) * 2;
        if y >= inner.y + inner.height {
            break;
        }
        let text = if full {
            format!(" {} {}", view.icon(), view.label())
        } else {
            format!(" {}", view.icon())
        };
        let style = if *view == app.view {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let rect = row(y);
        frame.render_widget(Paragraph::new(text).style(style), rect);
        app.menu_hit_areas.push((rect, MenuTarget::Open(*view)));
    }

    // Logout pinned to the bottom
    if inner.height > 0 {
        let rect = row(inner.y + inner.height - 1);
        let text = if full { " ⏻ Logout" } else { " ⏻" };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::Red)),
            rect,
        );
        app.menu_hit_areas.push((rect, MenuTarget::Logout));
    }
}

pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let pending = if app.favorites.is_dirty() {
        " | Unsaved changes [Ctrl+S: Retry]"
    } else {
        ""
    };
    let status_text = format!(
        " Favorites: {}{} | [1-3: Views] [Ctrl+B: Sidebar] [Ctrl+L: Logout] [h: Help] ",
        app.favorites.len(),
        pending
    );

    let style = if app.favorites.is_dirty() {
        Style::default().bg(Color::Red).fg(Color::White)
    } else {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    };
    let status_bar = Paragraph::new(status_text)
        .style(style)
        .alignment(Alignment::Center);

    frame.render_widget(status_bar, area);
}

/// Render the current notice in the top-right corner
pub fn render_toast(frame: &mut Frame, app: &App, area: Rect) {
    let Some(toast) = &app.toast else {
        return;
    };
    let color = match toast.notice.kind {
        NoticeKind::Info => Color::Green,
        NoticeKind::Destructive => Color::Yellow,
        NoticeKind::Failure => Color::Red,
    };

    let width = 48.min(area.width);
    let height = 5.min(area.height);
    let popup_area = Rect::new(area.x + area.width - width, area.y, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", toast.notice.title))
        .style(Style::default().fg(color));
    let paragraph = Paragraph::new(toast.notice.description.as_str())
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

/// Render the help screen overlay
pub fn render_help_screen(frame: &mut Frame, _app: &App, size: Rect) {
    let help_text = vec![
        Line::from(""),
        section("Navigation"),
        Line::from("1 / 2 / 3    Map / Dashboard / Settings"),
        Line::from("Tab          Next view"),
        Line::from("Ctrl+B       Toggle sidebar"),
        Line::from("Ctrl+L       Log out"),
        Line::from(""),
        section("Map"),
        Line::from("Arrows       Move the marker (Shift: fine)"),
        Line::from("Click        Pick a point"),
        Line::from("+ / -        Zoom in / out"),
        Line::from("g            Look up the address"),
        Line::from("/            Search a place"),
        Line::from("a            Add marker to favorites"),
        Line::from("f            Favorites panel"),
        Line::from(""),
        section("Favorites panel"),
        Line::from("Enter        Center on favorite"),
        Line::from("e            Rename"),
        Line::from("d / Delete   Remove"),
        Line::from("Ctrl+S       Retry a failed save"),
        Line::from(""),
        section("Dashboard"),
        Line::from("↑/↓          Change location"),
        Line::from("←/→          Change date"),
        Line::from("t / r        Today / regenerate"),
        Line::from(""),
        Line::from(Span::styled(
            "Press 'h' or 'Esc' to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup_width = 60.min(size.width);
    let popup_height = (help_text.len() as u16 + 2).min(size.height);
    let x = (size.width.saturating_sub(popup_width)) / 2;
    let y = (size.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    let block = Block::default()
        .title(" Help - Keyboard Shortcuts ")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(popup_area);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let paragraph = Paragraph::new(help_text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, inner);
}
