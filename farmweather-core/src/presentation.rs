//! Token → presentation tables and the card view model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    advisor::{self, ColorToken, SuggestionToken},
    model::{Coordinates, WeatherObservation},
};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

pub fn color_hex(token: ColorToken) -> &'static str {
    match token {
        ColorToken::DefaultLight => "#f0f8ff",
        ColorToken::GoldDay => "#FFD700",
        ColorToken::MidnightBlue => "#2c3e50",
        ColorToken::SkyBlueDay => "#87CEFA",
        ColorToken::SlateNight => "#34495e",
        ColorToken::LightGrayDay => "#D3D3D3",
        ColorToken::GrayOvercast => "#7f8c8d",
        ColorToken::PaleBlue => "#ADD8E6",
    }
}

/// RGB triple for the token, parsed from [`color_hex`].
pub fn color_rgb(token: ColorToken) -> (u8, u8, u8) {
    let hex = &color_hex(token)[1..];
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
    (channel(0), channel(2), channel(4))
}

pub fn suggestion_text(token: SuggestionToken) -> &'static str {
    match token {
        SuggestionToken::None => "",
        SuggestionToken::HotIrrigateShade => {
            "🔥 High temperature: Ensure irrigation and provide shade for sensitive crops."
        }
        SuggestionToken::ColdFrostProtect => "❄ Cold weather: Protect crops from frost.",
        SuggestionToken::GoodPlantingHarvest => "🌞 Good day for planting or harvesting crops.",
        SuggestionToken::ExcessWaterDrainage => {
            "🌧 Protect crops from excess water and prepare drainage."
        }
        SuggestionToken::CheckSoilMoisture => "☁ Check soil moisture before irrigation.",
        SuggestionToken::MonitorCropsDefault => "🌱 Monitor your crops regularly for best results.",
    }
}

pub fn icon_url(icon: &str) -> Option<String> {
    let icon = icon.trim();
    if icon.is_empty() {
        return None;
    }
    Some(format!("{ICON_BASE_URL}/{icon}@4x.png"))
}

/// Everything a renderer needs to draw the weather card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherCard {
    pub location_name: String,
    pub latitude: String,
    pub longitude: String,
    pub icon_url: Option<String>,
    pub temperature_celsius: Option<f64>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub color: ColorToken,
    pub color_hex: &'static str,
    pub suggestion: SuggestionToken,
    pub suggestion_text: &'static str,
}

impl WeatherCard {
    pub fn build(obs: &WeatherObservation, coords: &Coordinates, now: DateTime<Utc>) -> Self {
        let advice = advisor::advise(Some(obs), now);

        Self {
            location_name: obs.display_name().to_string(),
            latitude: format!("{:.2}", coords.latitude),
            longitude: format!("{:.2}", coords.longitude),
            icon_url: obs.icon.as_deref().and_then(icon_url),
            temperature_celsius: obs.temperature_celsius,
            condition: obs.condition_main.clone(),
            description: obs.description.clone(),
            color: advice.color,
            color_hex: color_hex(advice.color),
            suggestion: advice.suggestion,
            suggestion_text: suggestion_text(advice.suggestion),
        }
    }
}
