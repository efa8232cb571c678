//! Simulated forecast and alert thresholds.
//!
//! Every value here is a placeholder drawn from the injected random source.

use crate::models::{ForecastDay, FrostRisk, HeatRisk};
use chrono::{Duration, NaiveDate};
use rand::RngExt;
use serde::{Deserialize, Serialize};

pub const FORECAST_DAYS: usize = 5;

/// Forecast for `FORECAST_DAYS` consecutive days starting at `start`
pub fn simulate_forecast<R: RngExt + ?Sized>(start: NaiveDate, rng: &mut R) -> Vec<ForecastDay> {
    (0..FORECAST_DAYS)
        .map(|offset| ForecastDay {
            date: start + Duration::days(offset as i64),
            rain_chance: rng.random_range(0..100u8),
            frost_risk: FrostRisk::ALL[rng.random_range(0..FrostRisk::ALL.len())],
            heat_risk: HeatRisk::ALL[rng.random_range(0..HeatRisk::ALL.len())],
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherAlert {
    Frost,
    ExtremeHeat,
}

impl WeatherAlert {
    pub fn label(&self) -> &'static str {
        match self {
            WeatherAlert::Frost => "Frost alert",
            WeatherAlert::ExtremeHeat => "Extreme heat alert",
        }
    }
}

/// Temperatures (°C) at which alerts fire
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AlertThresholds {
    pub frost_c: f64,
    pub heat_c: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            frost_c: 0.0,
            heat_c: 35.0,
        }
    }
}

impl AlertThresholds {
    pub fn evaluate(&self, temperature_c: f64) -> Option<WeatherAlert> {
        if temperature_c <= self.frost_c {
            Some(WeatherAlert::Frost)
        } else if temperature_c >= self.heat_c {
            Some(WeatherAlert::ExtremeHeat)
        } else {
            None
        }
    }
}
