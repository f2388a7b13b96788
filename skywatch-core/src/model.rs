use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where to look up the weather: a place name triple or a coordinate pair.
///
/// Place fields are forwarded to the service verbatim, without trimming
/// or case folding; empty strings are allowed. Coordinates are not
/// range-checked. The service decides what is a valid location.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Named {
        city: String,
        state: String,
        country: String,
    },
    Coordinates {
        latitude: f64,
        longitude: f64,
    },
}

impl LocationQuery {
    pub fn named(
        city: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        LocationQuery::Named {
            city: city.into(),
            state: state.into(),
            country: country.into(),
        }
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        LocationQuery::Coordinates {
            latitude,
            longitude,
        }
    }
}

/// One weather condition reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
    /// Short pictogram code, e.g. `01d`; resolved to bytes by the icon cache.
    pub icon_id: String,
}

/// Decoded current-weather answer. Only ever built from a response that
/// parsed cleanly; a malformed body yields an error, never a partial report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature_c: f64,
    /// May be empty; callers usually display the first entry.
    pub conditions: Vec<Condition>,
    pub location_name: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherReport {
    /// First reported condition, if the service sent any.
    pub fn primary(&self) -> Option<&Condition> {
        self.conditions.first()
    }

    /// Temperature in Fahrenheit, `F = C * 9/5 + 32`.
    pub fn temperature_f(&self) -> f64 {
        self.temperature_c * 9.0 / 5.0 + 32.0
    }
}
