//! Terminal front end: login, world map with favorites, dashboard and
//! settings views.

pub mod app;
pub mod config;
pub mod event;
pub mod ui;

pub use crate::app::{App, View};
pub use crate::config::{load_config, Config};
pub use crate::event::{Event, EventHandler};
