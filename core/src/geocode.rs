//! Reverse geocoding and place search.
//!
//! The map view only needs two capabilities: naming a point and finding a
//! point by name. `NominatimGeocoder` talks to an OpenStreetMap Nominatim
//! instance; `OfflineGeocoder` answers with nothing, so callers fall back to
//! coordinate names.

use crate::models::{AddressComponents, GeoPoint, Place};
use crate::{Error, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_USER_AGENT: &str = concat!("climatica/", env!("CARGO_PKG_VERSION"));

/// Resolves points to address components and queries to places
pub trait Geocoder {
    /// Address components for `point`; empty components when nothing is known
    fn reverse(&self, point: GeoPoint) -> Result<AddressComponents>;

    /// Best match for a free-text query
    fn search(&self, query: &str) -> Result<Option<Place>>;
}

/// Geocoder that never resolves anything
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

impl Geocoder for OfflineGeocoder {
    fn reverse(&self, _point: GeoPoint) -> Result<AddressComponents> {
        Ok(AddressComponents::default())
    }

    fn search(&self, _query: &str) -> Result<Option<Place>> {
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<NominatimAddress>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl From<NominatimAddress> for AddressComponents {
    fn from(addr: NominatimAddress) -> Self {
        let locality = addr
            .city
            .or(addr.town)
            .or(addr.village)
            .or(addr.municipality)
            .unwrap_or_default();
        AddressComponents {
            country: addr.country.unwrap_or_default(),
            region: addr.state.unwrap_or_default(),
            locality,
        }
    }
}

/// Blocking Nominatim client
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, timeout: Duration, user_agent: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Geocoding(format!("{} returned status {}", url, status)));
        }
        Ok(response.text()?)
    }
}

impl Geocoder for NominatimGeocoder {
    fn reverse(&self, point: GeoPoint) -> Result<AddressComponents> {
        tracing::debug!(lat = point.lat, lng = point.lng, "reverse geocoding");
        let body = self.get_json(
            "reverse",
            &[
                ("lat", point.lat.to_string()),
                ("lon", point.lng.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", "10".to_string()),
            ],
        )?;
        let address = parse_reverse(&body)?;
        tracing::info!(name = %address.display_name(), "reverse geocoded");
        Ok(address)
    }

    fn search(&self, query: &str) -> Result<Option<Place>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        tracing::debug!(query, "searching place");
        let body = self.get_json(
            "search",
            &[
                ("q", query.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("limit", "1".to_string()),
            ],
        )?;
        parse_search(&body)
    }
}

/// Parse a `/reverse` body. An `error` payload (e.g. open ocean) yields
/// empty components.
fn parse_reverse(body: &str) -> Result<AddressComponents> {
    let response: ReverseResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        tracing::debug!(error = %error, "reverse geocoding found nothing");
        return Ok(AddressComponents::default());
    }
    Ok(response.address.map(AddressComponents::from).unwrap_or_default())
}

/// Parse a `/search` body, keeping the first hit
fn parse_search(body: &str) -> Result<Option<Place>> {
    let hits: Vec<SearchHit> = serde_json::from_str(body)?;
    let Some(hit) = hits.into_iter().next() else {
        return Ok(None);
    };

    let lat = hit
        .lat
        .parse::<f64>()
        .map_err(|_| Error::Geocoding(format!("invalid latitude '{}'", hit.lat)))?;
    let lng = hit
        .lon
        .parse::<f64>()
        .map_err(|_| Error::Geocoding(format!("invalid longitude '{}'", hit.lon)))?;

    Ok(Some(Place {
        point: GeoPoint::new(lat, lng)?,
        address: hit.address.map(AddressComponents::from).unwrap_or_default(),
    }))
}
