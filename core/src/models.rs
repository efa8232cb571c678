mod favorite;
mod forecast_day;
mod location;

pub use favorite::Favorite;
pub use forecast_day::{CurrentConditions, ForecastDay, FrostRisk, HeatRisk};
pub use location::{favorite_name, AddressComponents, GeoPoint, Place, DEFAULT_CENTER};

use chrono::{DateTime, Utc};

/// Convert Unix timestamp (milliseconds) to DateTime<Utc>
pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// Current time as Unix milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
