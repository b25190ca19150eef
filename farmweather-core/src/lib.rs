//! Core library for the `farmweather` CLI.
//!
//! This crate defines:
//! - The weather observation model and the farming advisor
//! - Token → presentation tables and the weather card view model
//! - Geolocation and weather provider abstractions
//! - Configuration & credentials handling
//! - The controller that runs one locate-then-fetch session
//!
//! It is used by `farmweather-cli`, but can also be reused by other binaries or services.

pub mod advisor;
pub mod config;
pub mod controller;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod presentation;
pub mod provider;
pub mod state;

pub use advisor::{Advice, ColorToken, SuggestionToken, select_background_color, select_farming_suggestion};
pub use config::Config;
pub use controller::AppController;
pub use error::AppError;
pub use geolocation::{FixedLocation, GeolocationError, GeolocationProvider, IpGeolocation};
pub use model::{Condition, Coordinates, Daylight, WeatherObservation};
pub use presentation::WeatherCard;
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use state::DisplayState;
