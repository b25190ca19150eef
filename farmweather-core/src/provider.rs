use crate::model::{Coordinates, WeatherObservation};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_observation(&self, coords: &Coordinates) -> anyhow::Result<WeatherObservation>;
}

/// Shortens an error body for inclusion in a message, on a char boundary.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
