//! Core library for the climatica weather dashboard.
//!
//! Holds the favorites store and its local storage port, the placeholder
//! session flag, geocoding, and the simulated forecast. Front-ends live in
//! the `climatica-tui` and `climatica-cli` crates.

pub mod error;
pub mod forecast;
pub mod geocode;
pub mod models;
pub mod notice;
pub mod storage;

pub use error::{Error, Result};
