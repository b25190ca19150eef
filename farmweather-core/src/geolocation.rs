use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::Coordinates;

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location access was denied")]
    Denied,

    #[error("location service unavailable: {0}")]
    Unavailable(String),

    #[error("location service returned invalid coordinates")]
    Invalid,
}

#[async_trait]
pub trait GeolocationProvider: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Coordinates given up front, from the command line or the config file.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl GeolocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// Approximate position of the caller's public IP address, from an
/// ip-api.com compatible service.
#[derive(Debug, Clone)]
pub struct IpGeolocation {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpGeolocation {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for IP geolocation")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl GeolocationProvider for IpGeolocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        let url = format!("{}/json", self.base_url);
        debug!(%url, "looking up position by IP");

        let res = self
            .http
            .get(&url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "IP geolocation request failed");
                GeolocationError::Unavailable(e.to_string())
            })?;

        let status = res.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            return Err(GeolocationError::Denied);
        }
        if !status.is_success() {
            return Err(GeolocationError::Unavailable(format!(
                "lookup failed with status {status}"
            )));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| GeolocationError::Unavailable(format!("unreadable response: {e}")))?;

        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| body.status.clone());
            return Err(GeolocationError::Unavailable(reason));
        }

        let (Some(lat), Some(lon)) = (body.lat, body.lon) else {
            return Err(GeolocationError::Invalid);
        };

        Coordinates::new(lat, lon).map_err(|_| GeolocationError::Invalid)
    }
}
