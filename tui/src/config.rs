use anyhow::{Context, Result};
use climatica_core::forecast::AlertThresholds;
use climatica_core::geocode::{Geocoder, NominatimGeocoder, OfflineGeocoder, DEFAULT_NOMINATIM_URL};
use climatica_core::models::DEFAULT_CENTER;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LayoutConfig {
    /// Terminals narrower than this hide the sidebar until toggled
    pub compact_breakpoint: u16,
    pub tick_rate_ms: u64,
    pub toast_duration_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            compact_breakpoint: 100,
            tick_rate_ms: 250,
            toast_duration_ms: 3000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub default_lat: f64,
    pub default_lng: f64,
    /// Degrees moved per arrow key press
    pub step_degrees: f64,
    /// Degrees moved per Shift+arrow
    pub fine_step_degrees: f64,
    /// Latitude span shown on screen at startup
    pub initial_span_degrees: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_lat: DEFAULT_CENTER.lat,
            default_lng: DEFAULT_CENTER.lng,
            step_degrees: 0.5,
            fine_step_degrees: 0.01,
            initial_span_degrees: 20.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AlertConfig {
    pub frost_threshold_c: f64,
    pub heat_threshold_c: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        let thresholds = AlertThresholds::default();
        Self {
            frost_threshold_c: thresholds.frost_c,
            heat_threshold_c: thresholds.heat_c,
        }
    }
}

impl AlertConfig {
    pub fn thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            frost_c: self.frost_threshold_c,
            heat_c: self.heat_threshold_c,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    pub email: bool,
    pub sms: bool,
    pub push: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email: true,
            sms: false,
            push: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_NOMINATIM_URL.to_string(),
            timeout_secs: 10,
            user_agent: None,
        }
    }
}

impl GeocoderConfig {
    /// The geocoder to use, or the offline one when disabled
    pub fn build(&self, offline: bool) -> Result<Box<dyn Geocoder>> {
        if offline || !self.enabled {
            tracing::info!("geocoding disabled; favorites are named by coordinates");
            return Ok(Box::new(OfflineGeocoder));
        }
        let geocoder = NominatimGeocoder::new(
            &self.base_url,
            Duration::from_secs(self.timeout_secs),
            self.user_agent.as_deref(),
        )
        .context("Failed to build geocoding client")?;
        Ok(Box::new(geocoder))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub map: MapConfig,
    pub alerts: AlertConfig,
    pub notifications: NotificationConfig,
    pub geocoder: GeocoderConfig,
}

/// Load the config file, writing the defaults first if it does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        let toml = toml::to_string(&config).context("Failed to serialize default config")?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote default config");
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}
