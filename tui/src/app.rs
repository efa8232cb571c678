use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use climatica_core::{
    forecast::{simulate_forecast, WeatherAlert},
    geocode::Geocoder,
    models::{favorite_name, AddressComponents, CurrentConditions, Favorite, ForecastDay, GeoPoint},
    notice::Notice,
    storage::{FavoriteStore, LocalStorage, Session, SqliteStorage},
};
use ratatui::layout::Rect;
use std::path::Path;
use std::time::{Duration as StdDuration, Instant};

use crate::config::{Config, NotificationConfig};

pub type Storage = Box<dyn LocalStorage>;

/// Screens reachable from the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Map,
    Dashboard,
    Settings,
}

impl View {
    pub const MENU: [View; 3] = [View::Map, View::Dashboard, View::Settings];

    pub fn label(&self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Map => "Map",
            View::Dashboard => "Dashboard",
            View::Settings => "Settings",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            View::Login => "⚿",
            View::Map => "◎",
            View::Dashboard => "▦",
            View::Settings => "⚙",
        }
    }
}

/// What a click on a sidebar row does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Open(View),
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// Login / register form. Any non-empty input is accepted.
#[derive(Debug, Clone)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub values: Vec<String>,
    pub focus: usize,
    pub error: Option<String>,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        let count = Self::labels_for(mode).len();
        Self {
            mode,
            values: vec![String::new(); count],
            focus: 0,
            error: None,
        }
    }

    fn labels_for(mode: AuthMode) -> &'static [&'static str] {
        match mode {
            AuthMode::Login => &["Email", "Password"],
            AuthMode::Register => &["Full name", "Email", "Password", "Confirm password"],
        }
    }

    pub fn labels(&self) -> &'static [&'static str] {
        Self::labels_for(self.mode)
    }

    pub fn is_secret(&self, index: usize) -> bool {
        self.labels()
            .get(index)
            .map(|l| l.contains("assword"))
            .unwrap_or(false)
    }

    fn email(&self) -> &str {
        let index = match self.mode {
            AuthMode::Login => 0,
            AuthMode::Register => 1,
        };
        &self.values[index]
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(i) = self.values.iter().position(|v| v.trim().is_empty()) {
            return Err(format!("{} is required", self.labels()[i]));
        }
        if self.mode == AuthMode::Register && self.values[2] != self.values[3] {
            return Err("Passwords do not match".to_string());
        }
        Ok(())
    }
}

pub struct MapState {
    pub selected: GeoPoint,
    pub center: GeoPoint,
    /// Latitude degrees visible on screen
    pub span: f64,
    pub address: AddressComponents,
    pub search_open: bool,
    pub search_query: String,
    pub panel_open: bool,
    pub panel_index: usize,
    pub editing: Option<i64>,
    pub edit_buffer: String,
    /// Where the map canvas was last drawn, for mouse hit-testing
    pub canvas_area: Option<Rect>,
}

pub struct DashboardState {
    pub location_id: Option<i64>,
    pub date: NaiveDate,
    pub forecast: Vec<ForecastDay>,
    pub conditions: CurrentConditions,
}

pub struct SettingsState {
    pub notifications: NotificationConfig,
    pub index: usize,
}

pub struct Toast {
    pub notice: Notice,
    pub shown_at: Instant,
}

/// Application state
pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub view: View,
    pub favorites: FavoriteStore<Storage>,
    session: Session<Storage>,
    geocoder: Box<dyn Geocoder>,
    pub sidebar_collapsed: bool,
    pub compact: bool,
    pub help_open: bool,
    pub auth: AuthForm,
    pub map: MapState,
    pub dashboard: DashboardState,
    pub settings: SettingsState,
    pub toast: Option<Toast>,
    pub menu_hit_areas: Vec<(Rect, MenuTarget)>,
}

const MIN_SPAN: f64 = 0.5;
const MAX_SPAN: f64 = 180.0;

impl App {
    /// Create an App backed by the SQLite storage file at `db_path`
    pub fn new(db_path: &Path, config: Config, geocoder: Box<dyn Geocoder>) -> Result<Self> {
        let favorites: Storage = Box::new(SqliteStorage::open(db_path)?);
        let session: Storage = Box::new(SqliteStorage::open(db_path)?);
        Self::with_storage(config, favorites, session, geocoder)
    }

    /// Create an App over arbitrary storage backends
    pub fn with_storage(
        config: Config,
        favorites_storage: Storage,
        session_storage: Storage,
        geocoder: Box<dyn Geocoder>,
    ) -> Result<Self> {
        let favorites = FavoriteStore::load(favorites_storage)?;
        let session = Session::new(session_storage);
        let authenticated = session.is_authenticated()?;

        let start = GeoPoint::new(config.map.default_lat, config.map.default_lng).unwrap_or_default();
        let today = Local::now().date_naive();
        let span = config.map.initial_span_degrees.clamp(MIN_SPAN, MAX_SPAN);
        let notifications = config.notifications.clone();

        let mut app = Self {
            should_quit: false,
            config,
            view: if authenticated { View::Dashboard } else { View::Login },
            favorites,
            session,
            geocoder,
            sidebar_collapsed: false,
            compact: false,
            help_open: false,
            auth: AuthForm::new(AuthMode::Login),
            map: MapState {
                selected: start,
                center: start,
                span,
                address: AddressComponents::default(),
                search_open: false,
                search_query: String::new(),
                panel_open: false,
                panel_index: 0,
                editing: None,
                edit_buffer: String::new(),
                canvas_area: None,
            },
            dashboard: DashboardState {
                location_id: None,
                date: today,
                forecast: Vec::new(),
                conditions: CurrentConditions::placeholder(),
            },
            settings: SettingsState {
                notifications,
                index: 0,
            },
            toast: None,
            menu_hit_areas: Vec::new(),
        };
        app.dashboard.location_id = app.favorites.first().map(|f| f.id);
        app.refresh_forecast();
        Ok(app)
    }

    /// Periodic housekeeping: expire the toast
    pub fn tick(&mut self) {
        let ttl = StdDuration::from_millis(self.config.layout.toast_duration_ms);
        if self.toast.as_ref().is_some_and(|t| t.shown_at.elapsed() >= ttl) {
            self.toast = None;
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn show_notice(&mut self, notice: Notice) {
        self.toast = Some(Toast {
            notice,
            shown_at: Instant::now(),
        });
    }

    pub fn is_authenticated(&self) -> bool {
        self.view != View::Login
    }

    /// Switch screens; ignored while logged out
    pub fn navigate(&mut self, view: View) {
        if !self.is_authenticated() || view == View::Login {
            return;
        }
        self.view = view;
        self.help_open = false;
        if view == View::Dashboard {
            self.sync_dashboard_location();
        }
    }

    pub fn next_view(&mut self) {
        let pos = View::MENU.iter().position(|v| *v == self.view).unwrap_or(0);
        self.navigate(View::MENU[(pos + 1) % View::MENU.len()]);
    }

    pub fn activate_menu(&mut self, target: MenuTarget) {
        match target {
            MenuTarget::Open(view) => self.navigate(view),
            MenuTarget::Logout => self.logout(),
        }
    }

    pub fn open_help(&mut self) {
        self.help_open = true;
    }

    pub fn close_help(&mut self) {
        self.help_open = false;
    }

    // =========================
    // Sidebar
    // =========================

    /// Recompute compact mode for a new terminal width
    pub fn on_resize(&mut self, width: u16) {
        let compact = width < self.config.layout.compact_breakpoint;
        if compact && !self.compact {
            self.sidebar_collapsed = true;
        }
        self.compact = compact;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    /// Sidebar columns: hidden in compact mode unless opened, icons-only
    /// when collapsed
    pub fn sidebar_width(&self) -> u16 {
        match (self.compact, self.sidebar_collapsed) {
            (true, true) => 0,
            (false, true) => 6,
            _ => 26,
        }
    }

    // =========================
    // Session
    // =========================

    pub fn auth_input(&mut self, ch: char) {
        let focus = self.auth.focus;
        self.auth.values[focus].push(ch);
        self.auth.error = None;
    }

    pub fn auth_backspace(&mut self) {
        let focus = self.auth.focus;
        self.auth.values[focus].pop();
    }

    pub fn auth_next_field(&mut self) {
        self.auth.focus = (self.auth.focus + 1) % self.auth.values.len();
    }

    pub fn auth_prev_field(&mut self) {
        let len = self.auth.values.len();
        self.auth.focus = (self.auth.focus + len - 1) % len;
    }

    pub fn auth_toggle_mode(&mut self) {
        let mode = match self.auth.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.auth = AuthForm::new(mode);
    }

    /// Submit the login/register form. Sets the session flag and opens the
    /// dashboard.
    pub fn auth_submit(&mut self) {
        if let Err(message) = self.auth.validate() {
            self.auth.error = Some(message);
            return;
        }
        let email = self.auth.email().trim().to_string();
        match self.session.login(&email) {
            Ok(()) => {
                self.auth = AuthForm::new(AuthMode::Login);
                self.view = View::Dashboard;
                self.sync_dashboard_location();
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                self.auth.error = Some(e.to_string());
            }
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            tracing::warn!(error = %e, "logout failed");
            self.show_notice(Notice::failure("log out", &e));
            return;
        }
        self.view = View::Login;
        self.help_open = false;
        self.map.panel_open = false;
        self.map.editing = None;
        self.map.search_open = false;
        self.auth = AuthForm::new(AuthMode::Login);
    }

    // =========================
    // Map: selection and geocoding
    // =========================

    pub fn move_selection(&mut self, d_lat: f64, d_lng: f64) {
        self.map.selected = self.map.selected.offset(d_lat, d_lng);
        self.map.center = self.map.selected;
        self.map.address = AddressComponents::default();
    }

    pub fn zoom_in(&mut self) {
        self.map.span = (self.map.span / 2.0).max(MIN_SPAN);
    }

    pub fn zoom_out(&mut self) {
        self.map.span = (self.map.span * 2.0).min(MAX_SPAN);
    }

    /// Select a point and name it through the geocoder
    pub fn select_point(&mut self, point: GeoPoint) {
        self.map.selected = point;
        self.geocode_selection();
    }

    /// Reverse-geocode the current selection into address components
    pub fn geocode_selection(&mut self) {
        match self.geocoder.reverse(self.map.selected) {
            Ok(address) => self.map.address = address,
            Err(e) => {
                tracing::warn!(error = %e, "reverse geocoding failed");
                self.map.address = AddressComponents::default();
                self.show_notice(Notice::failure("resolve the address", &e));
            }
        }
    }

    /// Visible longitude and latitude ranges for a canvas drawn in `area`
    pub fn map_bounds(&self, area: Rect) -> ([f64; 2], [f64; 2]) {
        let w = area.width.max(1) as f64;
        let h = area.height.max(1) as f64;
        let lat_span = self.map.span;
        // Terminal cells are roughly twice as tall as they are wide
        let lng_span = (lat_span * (w / h) / 2.0).min(360.0);
        let c = self.map.center;
        (
            [c.lng - lng_span / 2.0, c.lng + lng_span / 2.0],
            [c.lat - lat_span / 2.0, c.lat + lat_span / 2.0],
        )
    }

    /// Map a terminal cell inside the last drawn canvas to coordinates
    pub fn point_at(&self, column: u16, row: u16) -> Option<GeoPoint> {
        let area = self.map.canvas_area?;
        let inner = Rect {
            x: area.x + 1,
            y: area.y + 1,
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(2),
        };
        let inside = column >= inner.x
            && column < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height;
        if !inside {
            return None;
        }
        let ([x0, x1], [y0, y1]) = self.map_bounds(inner);
        let fx = ((column - inner.x) as f64 + 0.5) / inner.width as f64;
        let fy = ((row - inner.y) as f64 + 0.5) / inner.height as f64;
        let origin = GeoPoint { lat: 0.0, lng: 0.0 };
        Some(origin.offset(y1 - fy * (y1 - y0), x0 + fx * (x1 - x0)))
    }

    pub fn click_map(&mut self, column: u16, row: u16) -> bool {
        match self.point_at(column, row) {
            Some(point) => {
                self.select_point(point);
                true
            }
            None => false,
        }
    }

    // =========================
    // Map: place search
    // =========================

    pub fn open_search(&mut self) {
        self.map.search_open = true;
        self.map.search_query.clear();
    }

    pub fn close_search(&mut self) {
        self.map.search_open = false;
        self.map.search_query.clear();
    }

    pub fn update_search_query(&mut self, ch: char) {
        self.map.search_query.push(ch);
    }

    pub fn backspace_search_query(&mut self) {
        self.map.search_query.pop();
    }

    /// Look up the typed place and center the map on it
    pub fn submit_search(&mut self) {
        let query = self.map.search_query.trim().to_string();
        if query.is_empty() {
            self.close_search();
            return;
        }
        match self.geocoder.search(&query) {
            Ok(Some(place)) => {
                self.map.selected = place.point;
                self.map.center = place.point;
                self.map.address = place.address;
                self.close_search();
            }
            Ok(None) => self.show_notice(Notice::place_not_found(&query)),
            Err(e) => {
                tracing::warn!(error = %e, query = %query, "place search failed");
                self.show_notice(Notice::failure("search places", &e));
            }
        }
    }

    // =========================
    // Favorites
    // =========================

    /// Save the selected point as a favorite
    pub fn add_selection_to_favorites(&mut self) {
        let point = self.map.selected;
        let name = favorite_name(&self.map.address, point);
        match self.favorites.add(&name, point.lat, point.lng) {
            Ok(favorite) => self.show_notice(Notice::favorite_added(&favorite)),
            Err(e) => self.show_notice(Notice::failure("save the favorite", &e)),
        }
        self.sync_dashboard_location();
    }

    pub fn toggle_favorites_panel(&mut self) {
        self.map.panel_open = !self.map.panel_open;
        self.map.editing = None;
        self.clamp_panel_index();
    }

    pub fn panel_up(&mut self) {
        if self.map.panel_index > 0 {
            self.map.panel_index -= 1;
        }
    }

    pub fn panel_down(&mut self) {
        if self.map.panel_index + 1 < self.favorites.len() {
            self.map.panel_index += 1;
        }
    }

    pub fn panel_selected(&self) -> Option<&Favorite> {
        self.favorites.list().get(self.map.panel_index)
    }

    /// Center the map on the highlighted favorite
    pub fn panel_activate(&mut self) {
        let Some(favorite) = self.panel_selected() else {
            return;
        };
        let name = favorite.name.clone();
        if let Some(point) = favorite.point() {
            self.map.selected = point;
            self.map.center = point;
            self.map.address = AddressComponents::default();
            tracing::debug!(name = %name, "centered on favorite");
        }
    }

    pub fn start_edit_favorite(&mut self) {
        if let Some(favorite) = self.panel_selected() {
            let (id, name) = (favorite.id, favorite.name.clone());
            self.map.editing = Some(id);
            self.map.edit_buffer = name;
        }
    }

    pub fn edit_input(&mut self, ch: char) {
        self.map.edit_buffer.push(ch);
    }

    pub fn edit_backspace(&mut self) {
        self.map.edit_buffer.pop();
    }

    pub fn cancel_edit(&mut self) {
        self.map.editing = None;
        self.map.edit_buffer.clear();
    }

    /// Save the inline rename
    pub fn commit_edit(&mut self) {
        let Some(id) = self.map.editing else {
            return;
        };
        let name = self.map.edit_buffer.clone();
        match self.favorites.rename(id, &name) {
            Ok(_) => self.show_notice(Notice::favorite_renamed()),
            Err(e) => self.show_notice(Notice::failure("rename the favorite", &e)),
        }
        self.cancel_edit();
    }

    pub fn delete_selected_favorite(&mut self) {
        let Some(id) = self.panel_selected().map(|f| f.id) else {
            return;
        };
        match self.favorites.remove(id) {
            Ok(_) => self.show_notice(Notice::favorite_removed()),
            Err(e) => self.show_notice(Notice::failure("remove the favorite", &e)),
        }
        self.clamp_panel_index();
        self.sync_dashboard_location();
    }

    /// Retry writing favorites after a storage failure
    pub fn retry_save(&mut self) {
        if !self.favorites.is_dirty() {
            return;
        }
        match self.favorites.flush() {
            Ok(()) => self.show_notice(Notice::favorites_saved()),
            Err(e) => self.show_notice(Notice::failure("save favorites", &e)),
        }
    }

    fn clamp_panel_index(&mut self) {
        let len = self.favorites.len();
        if self.map.panel_index >= len {
            self.map.panel_index = len.saturating_sub(1);
        }
    }

    // =========================
    // Dashboard
    // =========================

    /// Location shown on the dashboard: the chosen favorite, else the first
    pub fn dashboard_location(&self) -> Option<&Favorite> {
        self.dashboard
            .location_id
            .and_then(|id| self.favorites.get(id))
            .or_else(|| self.favorites.first())
    }

    fn sync_dashboard_location(&mut self) {
        self.dashboard.location_id = self.dashboard_location().map(|f| f.id);
    }

    pub fn select_next_location(&mut self) {
        self.step_location(1);
    }

    pub fn select_prev_location(&mut self) {
        self.step_location(-1);
    }

    fn step_location(&mut self, delta: isize) {
        let list = self.favorites.list();
        if list.is_empty() {
            return;
        }
        let current = self
            .dashboard_location()
            .and_then(|cur| list.iter().position(|f| f.id == cur.id))
            .unwrap_or(0) as isize;
        let len = list.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.dashboard.location_id = Some(list[next].id);
    }

    /// Move the forecast start date and regenerate it
    pub fn shift_date(&mut self, days: i64) {
        self.dashboard.date += Duration::days(days);
        self.refresh_forecast();
    }

    pub fn goto_today(&mut self) {
        self.dashboard.date = Local::now().date_naive();
        self.refresh_forecast();
    }

    pub fn refresh_forecast(&mut self) {
        self.dashboard.forecast = simulate_forecast(self.dashboard.date, &mut rand::rng());
    }

    pub fn current_alert(&self) -> Option<WeatherAlert> {
        self.config
            .alerts
            .thresholds()
            .evaluate(self.dashboard.conditions.temperature_c)
    }

    // =========================
    // Settings
    // =========================

    pub const NOTIFICATION_CHANNELS: [&'static str; 3] = ["Email", "SMS", "Push"];

    pub fn settings_up(&mut self) {
        if self.settings.index > 0 {
            self.settings.index -= 1;
        }
    }

    pub fn settings_down(&mut self) {
        if self.settings.index + 1 < Self::NOTIFICATION_CHANNELS.len() {
            self.settings.index += 1;
        }
    }

    pub fn notification_enabled(&self, index: usize) -> bool {
        let n = &self.settings.notifications;
        match index {
            0 => n.email,
            1 => n.sms,
            _ => n.push,
        }
    }

    /// Flip the highlighted notification channel (not persisted)
    pub fn toggle_selected_notification(&mut self) {
        let n = &mut self.settings.notifications;
        match self.settings.index {
            0 => n.email = !n.email,
            1 => n.sms = !n.sms,
            _ => n.push = !n.push,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climatica_core::models::Place;
    use climatica_core::notice::NoticeKind;
    use climatica_core::storage::{MemoryStorage, AUTH_KEY, FAVORITES_KEY};

    struct FakeGeocoder;

    impl Geocoder for FakeGeocoder {
        fn reverse(&self, _point: GeoPoint) -> climatica_core::Result<AddressComponents> {
            Ok(AddressComponents::new("Santiago", "RM", "Chile"))
        }

        fn search(&self, query: &str) -> climatica_core::Result<Option<Place>> {
            if query == "Valdivia" {
                Ok(Some(Place {
                    point: GeoPoint::new(-39.8142, -73.2459).unwrap(),
                    address: AddressComponents::new("Valdivia", "Los Ríos", "Chile"),
                }))
            } else {
                Ok(None)
            }
        }
    }

    fn app_with(favorites: MemoryStorage, logged_in: bool) -> App {
        let session = if logged_in {
            MemoryStorage::new().with_item(AUTH_KEY, "true")
        } else {
            MemoryStorage::new()
        };
        App::with_storage(
            Config::default(),
            Box::new(favorites),
            Box::new(session),
            Box::new(FakeGeocoder),
        )
        .unwrap()
    }

    fn logged_in_app() -> App {
        app_with(MemoryStorage::new(), true)
    }

    #[test]
    fn test_starts_on_login_when_logged_out() {
        let mut app = app_with(MemoryStorage::new(), false);
        assert_eq!(app.view, View::Login);

        // Navigation is blocked until login
        app.navigate(View::Map);
        assert_eq!(app.view, View::Login);
    }

    #[test]
    fn test_login_requires_fields_then_opens_dashboard() {
        let mut app = app_with(MemoryStorage::new(), false);
        app.auth_submit();
        assert_eq!(app.auth.error.as_deref(), Some("Email is required"));

        for c in "usuario@gmail.com".chars() {
            app.auth_input(c);
        }
        app.auth_next_field();
        for c in "secret".chars() {
            app.auth_input(c);
        }
        app.auth_submit();
        assert_eq!(app.view, View::Dashboard);
        assert!(app.session.is_authenticated().unwrap());
    }

    #[test]
    fn test_register_checks_password_confirmation() {
        let mut app = app_with(MemoryStorage::new(), false);
        app.auth_toggle_mode();
        app.auth.values = vec!["Ana".into(), "ana@example.com".into(), "a".into(), "b".into()];
        app.auth_submit();
        assert_eq!(app.auth.error.as_deref(), Some("Passwords do not match"));
        assert_eq!(app.view, View::Login);
    }

    #[test]
    fn test_logout_returns_to_login() {
        let mut app = logged_in_app();
        assert_eq!(app.view, View::Dashboard);
        app.activate_menu(MenuTarget::Logout);
        assert_eq!(app.view, View::Login);
        assert!(!app.session.is_authenticated().unwrap());
    }

    #[test]
    fn test_add_selection_uses_geocoded_name() {
        let mut app = logged_in_app();
        app.navigate(View::Map);
        app.select_point(GeoPoint::new(-33.45, -70.66).unwrap());
        app.add_selection_to_favorites();

        let fav = &app.favorites.list()[0];
        assert_eq!(fav.name, "Santiago, RM, Chile");
        assert_eq!(fav.lat, -33.45);
        let toast = app.toast.as_ref().unwrap();
        assert_eq!(toast.notice.title, "Favorite added");
        assert_eq!(app.dashboard_location().map(|f| f.id), Some(fav.id));
    }

    #[test]
    fn test_add_without_address_uses_coordinates() {
        let mut app = logged_in_app();
        app.move_selection(1.0, 0.0);
        app.add_selection_to_favorites();
        assert_eq!(app.favorites.list()[0].name, "-32.4569, -70.6483");
    }

    #[test]
    fn test_failed_save_shows_failure_but_keeps_favorite() {
        let mut app = app_with(MemoryStorage::with_quota(4), true);
        app.add_selection_to_favorites();

        assert_eq!(app.favorites.len(), 1);
        assert!(app.favorites.is_dirty());
        assert_eq!(app.toast.as_ref().unwrap().notice.kind, NoticeKind::Failure);
    }

    #[test]
    fn test_search_centers_on_place() {
        let mut app = logged_in_app();
        app.open_search();
        for c in "Valdivia".chars() {
            app.update_search_query(c);
        }
        app.submit_search();
        assert!(!app.map.search_open);
        assert_eq!(app.map.center, GeoPoint::new(-39.8142, -73.2459).unwrap());
        assert_eq!(app.map.address.locality, "Valdivia");
    }

    #[test]
    fn test_search_without_results_keeps_box_open() {
        let mut app = logged_in_app();
        app.open_search();
        app.update_search_query('x');
        app.submit_search();
        assert!(app.map.search_open);
        assert!(app.toast.is_some());
    }

    #[test]
    fn test_rename_and_delete_from_panel() {
        let seeded = MemoryStorage::new().with_item(
            FAVORITES_KEY,
            r#"[{"id":1,"nombre":"Uno","lat":1,"lng":1},{"id":2,"nombre":"Dos","lat":2,"lng":2}]"#,
        );
        let mut app = app_with(seeded, true);
        app.toggle_favorites_panel();
        app.panel_down();
        app.start_edit_favorite();
        assert_eq!(app.map.edit_buffer, "Dos");

        app.map.edit_buffer.clear();
        for c in "Casa".chars() {
            app.edit_input(c);
        }
        app.commit_edit();
        assert_eq!(app.favorites.get(2).unwrap().name, "Casa");
        assert!(app.map.editing.is_none());

        app.delete_selected_favorite();
        let ids: Vec<i64> = app.favorites.list().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(app.map.panel_index, 0);
    }

    #[test]
    fn test_dashboard_falls_back_to_first_after_removal() {
        let seeded = MemoryStorage::new().with_item(
            FAVORITES_KEY,
            r#"[{"id":1,"nombre":"Uno","lat":1,"lng":1},{"id":2,"nombre":"Dos","lat":2,"lng":2}]"#,
        );
        let mut app = app_with(seeded, true);
        assert_eq!(app.dashboard_location().unwrap().id, 1);

        app.select_next_location();
        assert_eq!(app.dashboard_location().unwrap().id, 2);
        app.select_next_location();
        assert_eq!(app.dashboard_location().unwrap().id, 1);
        app.select_prev_location();
        assert_eq!(app.dashboard_location().unwrap().id, 2);

        app.favorites.remove(2).unwrap();
        assert_eq!(app.dashboard_location().unwrap().id, 1);
    }

    #[test]
    fn test_shift_date_regenerates_forecast() {
        let mut app = logged_in_app();
        let start = app.dashboard.date;
        app.shift_date(3);
        assert_eq!(app.dashboard.forecast.len(), 5);
        assert_eq!(app.dashboard.forecast[0].date, start + Duration::days(3));
    }

    #[test]
    fn test_compact_mode_hides_sidebar() {
        let mut app = logged_in_app();
        app.on_resize(160);
        assert_eq!(app.sidebar_width(), 26);
        app.toggle_sidebar();
        assert_eq!(app.sidebar_width(), 6);
        app.toggle_sidebar();

        app.on_resize(80);
        assert!(app.compact);
        assert_eq!(app.sidebar_width(), 0);
        app.toggle_sidebar();
        assert_eq!(app.sidebar_width(), 26);
    }

    #[test]
    fn test_point_at_maps_canvas_center() {
        let mut app = logged_in_app();
        app.map.canvas_area = Some(Rect::new(10, 5, 42, 22));
        // Inner area is 40x20 starting at (11, 6); its center cell
        let point = app.point_at(31, 16).unwrap();
        assert!((point.lat - app.map.center.lat).abs() < 1.0);
        assert!((point.lng - app.map.center.lng).abs() < 1.0);

        assert!(app.point_at(10, 5).is_none());
    }

    #[test]
    fn test_zoom_limits() {
        let mut app = logged_in_app();
        for _ in 0..20 {
            app.zoom_out();
        }
        assert_eq!(app.map.span, MAX_SPAN);
        for _ in 0..20 {
            app.zoom_in();
        }
        assert_eq!(app.map.span, MIN_SPAN);
    }

    #[test]
    fn test_toast_expires_on_tick() {
        let mut app = logged_in_app();
        app.config.layout.toast_duration_ms = 0;
        app.show_notice(Notice::favorite_removed());
        app.tick();
        assert!(app.toast.is_none());
    }

    #[test]
    fn test_notification_toggle() {
        let mut app = logged_in_app();
        app.settings_down();
        assert!(!app.notification_enabled(1));
        app.toggle_selected_notification();
        assert!(app.notification_enabled(1));
    }
}
