use thiserror::Error;

use crate::geolocation::GeolocationError;

/// Failures shown to the user. Each one ends the session.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Geolocation is not supported")]
    GeolocationUnsupported,

    #[error("Failed to get your location: {0}")]
    GeolocationFailed(#[from] GeolocationError),

    #[error("Failed to fetch weather data: {0}")]
    FetchFailed(String),
}

impl AppError {
    /// Wraps an infrastructure error, keeping its context chain in the message.
    pub fn fetch(err: anyhow::Error) -> Self {
        AppError::FetchFailed(format!("{err:#}"))
    }
}
