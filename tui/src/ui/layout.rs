use crate::app::{App, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use super::{
    render_dashboard, render_header, render_help_screen, render_login, render_map_view,
    render_settings, render_sidebar, render_status_bar, render_toast,
};

/// Render the complete UI
pub fn render(frame: &mut Frame, app: &mut App) {
    app.menu_hit_areas.clear();
    app.map.canvas_area = None;
    let size = frame.size();

    if app.view == View::Login {
        render_login(frame, app, size);
    } else {
        // Sidebar on the left, everything else on the right
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(app.sidebar_width()),
                Constraint::Min(0),
            ])
            .split(size);

        if columns[0].width > 0 {
            render_sidebar(frame, app, columns[0]);
        }

        // Header, content, status bar
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(columns[1]);

        render_header(frame, app, chunks[0]);
        render_content(frame, app, chunks[1]);
        render_status_bar(frame, app, chunks[2]);

        if app.help_open {
            render_help_screen(frame, app, size);
        }
    }

    // Toasts sit on top of everything, login included
    if app.toast.is_some() {
        render_toast(frame, app, size);
    }
}

fn render_content(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.view {
        View::Map => render_map_view(frame, app, area),
        View::Dashboard => render_dashboard(frame, app, area),
        View::Settings => render_settings(frame, app, area),
        View::Login => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use climatica_core::geocode::OfflineGeocoder;
    use climatica_core::storage::{MemoryStorage, AUTH_KEY, FAVORITES_KEY};
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        let favorites = MemoryStorage::new().with_item(
            FAVORITES_KEY,
            r#"[{"id":1,"nombre":"Punta Arenas, Magallanes, Chile","lat":-53.16,"lng":-70.91}]"#,
        );
        App::with_storage(
            Config::default(),
            Box::new(favorites),
            Box::new(MemoryStorage::new().with_item(AUTH_KEY, "true")),
            Box::new(OfflineGeocoder),
        )
        .unwrap()
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_every_view_renders() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        for view in View::MENU {
            app.navigate(view);
            terminal.draw(|f| render(f, &mut app)).unwrap();
        }
        assert_eq!(app.menu_hit_areas.len(), View::MENU.len() + 1);
    }

    #[test]
    fn test_dashboard_shows_first_favorite() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        assert!(buffer_text(&terminal).contains("Punta Arenas"));
    }

    #[test]
    fn test_map_records_canvas_area() {
        let mut app = app();
        app.navigate(View::Map);
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        assert!(app.map.canvas_area.is_some());
    }

    #[test]
    fn test_compact_layout_hides_sidebar() {
        let mut app = app();
        app.on_resize(60);
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        assert!(app.menu_hit_areas.is_empty());
    }

    #[test]
    fn test_login_screen_renders_when_logged_out() {
        let mut app = App::with_storage(
            Config::default(),
            Box::new(MemoryStorage::new()),
            Box::new(MemoryStorage::new()),
            Box::new(OfflineGeocoder),
        )
        .unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        assert!(buffer_text(&terminal).contains("Email"));
    }
}
