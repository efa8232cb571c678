use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// A saved location.
///
/// Serialized with the field names of the `favoritos` storage key, so the
/// display name travels as `nombre`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Favorite {
    /// Create a new favorite
    pub fn new(id: i64, name: String, point: GeoPoint) -> Self {
        Self {
            id,
            name,
            lat: point.lat,
            lng: point.lng,
        }
    }

    /// Coordinates of this favorite, if they are within the valid ranges
    pub fn point(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.lat, self.lng).ok()
    }
}
