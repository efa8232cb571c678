mod layout;
mod views;
mod widgets;

pub use layout::render;
pub use views::{render_dashboard, render_login, render_map_view, render_settings};
pub use widgets::{
    render_header,
    render_help_screen,
    render_sidebar,
    render_status_bar,
    render_toast,
};
