use anyhow::Result;
use crossterm::event::{
    self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Position;
use std::time::Duration;

use crate::app::{App, View};

/// Terminal events
#[derive(Debug, Clone, Copy)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Terminal tick event
    Tick,
    /// Mouse event
    Mouse(MouseEvent),
    /// Terminal resized to (columns, rows)
    Resize(u16, u16),
}

/// Event handler for the terminal
pub struct EventHandler {
    /// Tick rate in milliseconds
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CEvent::Key(key) => return Ok(Event::Key(key)),
                CEvent::Mouse(m) => return Ok(Event::Mouse(m)),
                CEvent::Resize(w, h) => return Ok(Event::Resize(w, h)),
                _ => {}
            }
        }
        Ok(Event::Tick)
    }
}

/// Plain characters, plus AltGr combinations (CONTROL+ALT)
fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                || key.modifiers.contains(KeyModifiers::ALT) =>
        {
            Some(c)
        }
        _ => None,
    }
}

/// Handle key events for the application
pub fn handle_key_event(key: KeyEvent, app: &mut App) {
    // On Windows, crossterm reports both key press and release events.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    if app.view == View::Login {
        handle_login_input(key, app);
        return;
    }

    // Help screen takes precedence
    if app.help_open {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('?')) {
            app.close_help();
        }
        return;
    }

    // Text inputs on the map view swallow everything
    if app.map.search_open {
        match key.code {
            KeyCode::Esc => app.close_search(),
            KeyCode::Enter => app.submit_search(),
            KeyCode::Backspace => app.backspace_search_query(),
            _ => {
                if let Some(c) = typed_char(&key) {
                    app.update_search_query(c);
                }
            }
        }
        return;
    }
    if app.map.editing.is_some() {
        match key.code {
            KeyCode::Esc => app.cancel_edit(),
            KeyCode::Enter => app.commit_edit(),
            KeyCode::Backspace => app.edit_backspace(),
            _ => {
                if let Some(c) = typed_char(&key) {
                    app.edit_input(c);
                }
            }
        }
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('b') => app.toggle_sidebar(),
            KeyCode::Char('l') => app.logout(),
            KeyCode::Char('s') => app.retry_save(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.quit();
            return;
        }
        KeyCode::Char('h') | KeyCode::Char('?') => {
            app.open_help();
            return;
        }
        KeyCode::Tab => {
            app.next_view();
            return;
        }
        KeyCode::Char('1') => {
            app.navigate(View::Map);
            return;
        }
        KeyCode::Char('2') => {
            app.navigate(View::Dashboard);
            return;
        }
        KeyCode::Char('3') => {
            app.navigate(View::Settings);
            return;
        }
        _ => {}
    }

    match app.view {
        View::Map => handle_map_input(key, app),
        View::Dashboard => handle_dashboard_input(key, app),
        View::Settings => handle_settings_input(key, app),
        View::Login => {}
    }
}

fn handle_login_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::Enter => app.auth_submit(),
        KeyCode::Tab | KeyCode::Down => app.auth_next_field(),
        KeyCode::BackTab | KeyCode::Up => app.auth_prev_field(),
        KeyCode::Backspace => app.auth_backspace(),
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.auth_toggle_mode()
        }
        _ => {
            if let Some(c) = typed_char(&key) {
                app.auth_input(c);
            }
        }
    }
}

fn handle_map_input(key: KeyEvent, app: &mut App) {
    if app.map.panel_open {
        match key.code {
            KeyCode::Esc | KeyCode::Char('f') => app.toggle_favorites_panel(),
            KeyCode::Up | KeyCode::Char('k') => app.panel_up(),
            KeyCode::Down | KeyCode::Char('j') => app.panel_down(),
            KeyCode::Enter => app.panel_activate(),
            KeyCode::Char('e') => app.start_edit_favorite(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_favorite(),
            _ => {}
        }
        return;
    }

    let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
        app.config.map.fine_step_degrees
    } else {
        app.config.map.step_degrees
    };
    match key.code {
        KeyCode::Up => app.move_selection(step, 0.0),
        KeyCode::Down => app.move_selection(-step, 0.0),
        KeyCode::Left => app.move_selection(0.0, -step),
        KeyCode::Right => app.move_selection(0.0, step),
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') => app.zoom_out(),
        KeyCode::Char('g') => app.geocode_selection(),
        KeyCode::Char('/') => app.open_search(),
        KeyCode::Char('a') => app.add_selection_to_favorites(),
        KeyCode::Char('f') => app.toggle_favorites_panel(),
        _ => {}
    }
}

fn handle_dashboard_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_prev_location(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_location(),
        KeyCode::Left => app.shift_date(-1),
        KeyCode::Right => app.shift_date(1),
        KeyCode::Char('t') => app.goto_today(),
        KeyCode::Char('r') => app.refresh_forecast(),
        _ => {}
    }
}

fn handle_settings_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.settings_up(),
        KeyCode::Down | KeyCode::Char('j') => app.settings_down(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected_notification(),
        _ => {}
    }
}

/// Handle mouse events: sidebar rows, map clicks and panel scrolling
pub fn handle_mouse_event(mouse: MouseEvent, app: &mut App) {
    match mouse.kind {
        MouseEventKind::Down(_) => {
            let pos = Position::new(mouse.column, mouse.row);
            let hit = app
                .menu_hit_areas
                .iter()
                .find(|(rect, _)| rect.contains(pos))
                .map(|(_, target)| *target);
            if let Some(target) = hit {
                app.activate_menu(target);
                return;
            }

            if app.view == View::Map && !app.map.search_open && app.map.editing.is_none() {
                app.click_map(mouse.column, mouse.row);
            }
        }
        MouseEventKind::ScrollUp => match app.view {
            View::Map if app.map.panel_open => app.panel_up(),
            View::Map => app.zoom_in(),
            View::Settings => app.settings_up(),
            _ => {}
        },
        MouseEventKind::ScrollDown => match app.view {
            View::Map if app.map.panel_open => app.panel_down(),
            View::Map => app.zoom_out(),
            View::Settings => app.settings_down(),
            _ => {}
        },
        _ => {}
    }
}
