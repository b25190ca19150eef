use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::model::{Coordinates, WeatherObservation};

use super::{WeatherProvider, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, Duration::from_secs(10))
    }

    pub fn with_base_url(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch_current(&self, coords: &Coordinates) -> Result<WeatherObservation> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        debug!(lat = coords.latitude, lon = coords.longitude, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            warn!(%status, "OpenWeather rejected the request");
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        Ok(parsed.into_observation())
    }
}

// The upstream schema is not guaranteed; every field is optional and the
// advisor decides what a missing value means.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwMain {
    temp: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwWeather {
    main: Option<String>,
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwCurrentResponse {
    name: Option<String>,
    main: Option<OwMain>,
    weather: Option<Vec<OwWeather>>,
    sys: Option<OwSys>,
}

impl OwCurrentResponse {
    fn into_observation(self) -> WeatherObservation {
        let weather = self
            .weather
            .and_then(|w| w.into_iter().next())
            .unwrap_or_default();
        let sys = self.sys.unwrap_or_default();

        WeatherObservation {
            condition_main: weather.main,
            description: weather.description,
            icon: weather.icon,
            temperature_celsius: self.main.and_then(|m| m.temp),
            sunrise: sys.sunrise,
            sunset: sys.sunset,
            location_name: self.name.filter(|n| !n.is_empty()),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_observation(&self, coords: &Coordinates) -> Result<WeatherObservation> {
        self.fetch_current(coords).await
    }
}
