use anyhow::Context;
use crossterm::style::{Color, Stylize};
use farmweather_core::{AppError, WeatherCard, presentation};
use unicode_width::UnicodeWidthStr;

/// Plain-text card, optionally painted with the advisor's background color.
pub fn card_text(card: &WeatherCard, color: bool) -> String {
    let temperature = card
        .temperature_celsius
        .map(|t| format!("{t}°C"))
        .unwrap_or_else(|| "n/a".to_string());

    let mut lines = vec![
        card.location_name.clone(),
        format!("📍 Lat: {}, Lon: {}", card.latitude, card.longitude),
        format!("🌡 {temperature}"),
    ];
    lines.extend(card.condition.clone());
    lines.extend(card.description.clone());
    if let Some(url) = &card.icon_url {
        lines.push(format!("Icon: {url}"));
    }
    if !card.suggestion_text.is_empty() {
        lines.push(String::new());
        lines.push(card.suggestion_text.to_string());
    }

    if !color {
        return lines.join("\n");
    }

    let (r, g, b) = presentation::color_rgb(card.color);
    let bg = Color::Rgb { r, g, b };
    let fg = if is_light(r, g, b) { Color::Black } else { Color::White };

    // Pad by terminal columns; the emoji rows are wider than their char count.
    let width = lines.iter().map(|l| l.width()).max().unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            let pad = width - line.width();
            format!(" {line}{} ", " ".repeat(pad)).with(fg).on(bg).to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn card_json(card: &WeatherCard) -> anyhow::Result<String> {
    serde_json::to_string_pretty(card).context("Failed to serialize weather card")
}

pub fn error_json(err: &AppError) -> anyhow::Result<String> {
    let kind = match err {
        AppError::GeolocationUnsupported => "geolocation-unsupported",
        AppError::GeolocationFailed(_) => "geolocation-failed",
        AppError::FetchFailed(_) => "fetch-failed",
    };

    serde_json::to_string_pretty(&serde_json::json!({
        "error": kind,
        "message": err.to_string(),
    }))
    .context("Failed to serialize error")
}

// Rec. 601 luma; dark text on light backgrounds.
fn is_light(r: u8, g: u8, b: u8) -> bool {
    let luma = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    luma >= 128_000
}
