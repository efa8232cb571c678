use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FrostRisk {
    Low,
    Medium,
    High,
}

impl FrostRisk {
    pub const ALL: [FrostRisk; 3] = [FrostRisk::Low, FrostRisk::Medium, FrostRisk::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            FrostRisk::Low => "Low",
            FrostRisk::Medium => "Medium",
            FrostRisk::High => "High",
        }
    }
}

impl fmt::Display for FrostRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HeatRisk {
    Low,
    Moderate,
    High,
    Extreme,
}

impl HeatRisk {
    pub const ALL: [HeatRisk; 4] = [
        HeatRisk::Low,
        HeatRisk::Moderate,
        HeatRisk::High,
        HeatRisk::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeatRisk::Low => "Low",
            HeatRisk::Moderate => "Moderate",
            HeatRisk::High => "High",
            HeatRisk::Extreme => "Extreme",
        }
    }
}

impl fmt::Display for HeatRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day of the simulated forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// Percent, 0..=99
    pub rain_chance: u8,
    pub frost_risk: FrostRisk,
    pub heat_risk: HeatRisk,
}

/// Values shown on the dashboard condition cards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub wind_kmh: f64,
    pub humidity_pct: u8,
    pub rain_chance: u8,
    pub frost_risk: FrostRisk,
    pub heat_risk: HeatRisk,
}

impl CurrentConditions {
    /// Fixed placeholder readings; there is no live data source.
    pub fn placeholder() -> Self {
        Self {
            temperature_c: 20.0,
            wind_kmh: 10.0,
            humidity_pct: 65,
            rain_chance: 20,
            frost_risk: FrostRisk::Low,
            heat_risk: HeatRisk::Moderate,
        }
    }
}
