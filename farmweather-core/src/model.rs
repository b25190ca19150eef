use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when the weather service does not name the place.
pub const FALLBACK_LOCATION_NAME: &str = "Your Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
pub struct InvalidCoordinates;

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinates> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinates);
        }

        Ok(Self { latitude, longitude })
    }
}

/// Whether the sun is up at a given instant, if that can be known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Daylight {
    Day,
    Night,
    /// Sunrise or sunset was not reported.
    Unknown,
}

/// Primary condition category, parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Clear,
    Rain,
    Drizzle,
    Clouds,
    Snow,
    Other,
}

impl Condition {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "clear" => Condition::Clear,
            "rain" => Condition::Rain,
            "drizzle" => Condition::Drizzle,
            "clouds" => Condition::Clouds,
            "snow" => Condition::Snow,
            _ => Condition::Other,
        }
    }

    pub fn is_wet(&self) -> bool {
        matches!(self, Condition::Rain | Condition::Drizzle)
    }
}

/// A single current-weather reading.
///
/// Every field the upstream service may omit is optional; the advisor
/// decides what a missing value means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub condition_main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub temperature_celsius: Option<f64>,
    /// Epoch seconds.
    pub sunrise: Option<i64>,
    /// Epoch seconds.
    pub sunset: Option<i64>,
    pub location_name: Option<String>,
}

impl WeatherObservation {
    pub fn condition(&self) -> Condition {
        self.condition_main
            .as_deref()
            .map(Condition::parse)
            .unwrap_or(Condition::Other)
    }

    /// `Day` when `now` lies within `[sunrise, sunset]`, both ends inclusive.
    pub fn daylight(&self, now: DateTime<Utc>) -> Daylight {
        match (self.sunrise, self.sunset) {
            (Some(sunrise), Some(sunset)) => {
                let now = now.timestamp();
                if sunrise <= now && now <= sunset {
                    Daylight::Day
                } else {
                    Daylight::Night
                }
            }
            _ => Daylight::Unknown,
        }
    }

    pub fn is_daytime(&self, now: DateTime<Utc>) -> bool {
        self.daylight(now) == Daylight::Day
    }

    pub fn display_name(&self) -> &str {
        self.location_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(FALLBACK_LOCATION_NAME)
    }
}
