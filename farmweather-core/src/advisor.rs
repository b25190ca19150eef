//! Maps a weather observation to a background color and a farming suggestion.
//!
//! Both selectors are total: missing data degrades to a default token.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::model::{Condition, Daylight, WeatherObservation};

/// Above this (strictly) the heat warning wins over any condition.
pub const HOT_THRESHOLD_C: f64 = 35.0;
/// Below this (strictly) the frost warning wins over any condition.
pub const COLD_THRESHOLD_C: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorToken {
    DefaultLight,
    GoldDay,
    MidnightBlue,
    SkyBlueDay,
    SlateNight,
    LightGrayDay,
    GrayOvercast,
    PaleBlue,
}

impl ColorToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorToken::DefaultLight => "default-light",
            ColorToken::GoldDay => "gold-day",
            ColorToken::MidnightBlue => "midnight-blue",
            ColorToken::SkyBlueDay => "sky-blue-day",
            ColorToken::SlateNight => "slate-night",
            ColorToken::LightGrayDay => "light-gray-day",
            ColorToken::GrayOvercast => "gray-overcast",
            ColorToken::PaleBlue => "pale-blue",
        }
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionToken {
    None,
    HotIrrigateShade,
    ColdFrostProtect,
    GoodPlantingHarvest,
    ExcessWaterDrainage,
    CheckSoilMoisture,
    MonitorCropsDefault,
}

impl SuggestionToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionToken::None => "none",
            SuggestionToken::HotIrrigateShade => "hot-irrigate-shade",
            SuggestionToken::ColdFrostProtect => "cold-frost-protect",
            SuggestionToken::GoodPlantingHarvest => "good-planting-harvest",
            SuggestionToken::ExcessWaterDrainage => "excess-water-drainage",
            SuggestionToken::CheckSoilMoisture => "check-soil-moisture",
            SuggestionToken::MonitorCropsDefault => "monitor-crops-default",
        }
    }
}

impl fmt::Display for SuggestionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both derived tokens for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Advice {
    pub color: ColorToken,
    pub suggestion: SuggestionToken,
}

pub fn advise(obs: Option<&WeatherObservation>, now: DateTime<Utc>) -> Advice {
    Advice {
        color: select_background_color(obs, now),
        suggestion: select_farming_suggestion(obs),
    }
}

/// Picks the card background for the observation at instant `now`.
///
/// Day/night-dependent conditions fall back to [`ColorToken::DefaultLight`]
/// when sunrise or sunset is unknown. Snow ignores daylight entirely.
pub fn select_background_color(obs: Option<&WeatherObservation>, now: DateTime<Utc>) -> ColorToken {
    let Some(obs) = obs else {
        return ColorToken::DefaultLight;
    };

    let by_daylight = |day: ColorToken, night: ColorToken| match obs.daylight(now) {
        Daylight::Day => day,
        Daylight::Night => night,
        Daylight::Unknown => ColorToken::DefaultLight,
    };

    match obs.condition() {
        Condition::Clear => by_daylight(ColorToken::GoldDay, ColorToken::MidnightBlue),
        Condition::Rain | Condition::Drizzle => {
            by_daylight(ColorToken::SkyBlueDay, ColorToken::SlateNight)
        }
        Condition::Clouds => by_daylight(ColorToken::LightGrayDay, ColorToken::GrayOvercast),
        Condition::Snow => ColorToken::PaleBlue,
        Condition::Other => ColorToken::DefaultLight,
    }
}

/// Picks farming advice. Temperature extremes take priority over the
/// condition; the thresholds themselves fall through to condition rules.
pub fn select_farming_suggestion(obs: Option<&WeatherObservation>) -> SuggestionToken {
    let Some(obs) = obs else {
        return SuggestionToken::None;
    };

    if let Some(temp) = obs.temperature_celsius {
        if temp > HOT_THRESHOLD_C {
            return SuggestionToken::HotIrrigateShade;
        }
        if temp < COLD_THRESHOLD_C {
            return SuggestionToken::ColdFrostProtect;
        }
    }

    match obs.condition() {
        Condition::Clear => SuggestionToken::GoodPlantingHarvest,
        condition if condition.is_wet() => SuggestionToken::ExcessWaterDrainage,
        Condition::Clouds => SuggestionToken::CheckSoilMoisture,
        _ => SuggestionToken::MonitorCropsDefault,
    }
}
