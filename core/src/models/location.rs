use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Santiago, Chile
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: -33.4569,
    lng: -70.6483,
};

/// A coordinate pair within the valid latitude/longitude ranges
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point, rejecting out-of-range or non-finite coordinates
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidInput(format!(
                "Latitude must be within [-90, 90], got {}",
                lat
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(Error::InvalidInput(format!(
                "Longitude must be within [-180, 180], got {}",
                lng
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Move the point by the given deltas.
    ///
    /// Latitude is clamped at the poles, longitude wraps around the
    /// antimeridian.
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        let lat = (self.lat + d_lat).clamp(-90.0, 90.0);
        let mut lng = self.lng + d_lng;
        if lng > 180.0 {
            lng -= 360.0;
        } else if lng < -180.0 {
            lng += 360.0;
        }
        Self { lat, lng }
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        DEFAULT_CENTER
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Address components returned by reverse geocoding
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressComponents {
    pub country: String,
    pub region: String,
    pub locality: String,
}

impl AddressComponents {
    pub fn new(
        locality: impl Into<String>,
        region: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            region: region.into(),
            locality: locality.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.country.is_empty() && self.region.is_empty() && self.locality.is_empty()
    }

    /// "locality, region, country", skipping empty parts
    pub fn display_name(&self) -> String {
        [&self.locality, &self.region, &self.country]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A search hit: where it is and what it is called
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub point: GeoPoint,
    pub address: AddressComponents,
}

/// Name for a new favorite at `point`, falling back to the coordinates when
/// geocoding produced nothing usable.
pub fn favorite_name(address: &AddressComponents, point: GeoPoint) -> String {
    let name = address.display_name();
    if name.is_empty() {
        point.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_validation() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
        assert!(GeoPoint::new(90.5, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -180.1).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_offset_clamps_and_wraps() {
        let p = GeoPoint::new(89.5, 179.5).unwrap().offset(1.0, 1.0);
        assert_eq!(p.lat, 90.0);
        assert!((p.lng - -179.5).abs() < 1e-9);

        let q = GeoPoint::new(-89.0, -179.0).unwrap().offset(-5.0, -2.0);
        assert_eq!(q.lat, -90.0);
        assert!((q.lng - 179.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_uses_four_decimals() {
        assert_eq!(DEFAULT_CENTER.to_string(), "-33.4569, -70.6483");
    }

    #[test]
    fn test_display_name_skips_empty_parts() {
        let full = AddressComponents::new("Santiago", "Región Metropolitana", "Chile");
        assert_eq!(full.display_name(), "Santiago, Región Metropolitana, Chile");

        let partial = AddressComponents::new("", "Magallanes", "Chile");
        assert_eq!(partial.display_name(), "Magallanes, Chile");
    }

    #[test]
    fn test_favorite_name_falls_back_to_coordinates() {
        let point = GeoPoint::new(-54.8, -68.3).unwrap();
        assert_eq!(favorite_name(&AddressComponents::default(), point), "-54.8000, -68.3000");

        let address = AddressComponents::new("Ushuaia", "Tierra del Fuego", "Argentina");
        assert_eq!(favorite_name(&address, point), "Ushuaia, Tierra del Fuego, Argentina");
    }
}
