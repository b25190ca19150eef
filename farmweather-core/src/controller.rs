//! Runs one session: locate, fetch, settle the display state.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    error::AppError,
    geolocation::GeolocationProvider,
    model::{Coordinates, WeatherObservation},
    presentation::WeatherCard,
    provider::WeatherProvider,
    state::DisplayState,
};

#[derive(Debug)]
pub struct AppController {
    geolocation: Option<Box<dyn GeolocationProvider>>,
    weather: Box<dyn WeatherProvider>,
    state: DisplayState,
}

impl AppController {
    /// `geolocation` is `None` when there is no way to determine a position.
    pub fn new(
        geolocation: Option<Box<dyn GeolocationProvider>>,
        weather: Box<dyn WeatherProvider>,
    ) -> Self {
        Self {
            geolocation,
            weather,
            state: DisplayState::Loading,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn into_state(self) -> DisplayState {
        self.state
    }

    /// Performs the single location request and, if it succeeds, the single
    /// weather request. A no-op once the state is terminal.
    pub async fn run(&mut self) -> &DisplayState {
        if self.state.is_terminal() {
            return &self.state;
        }

        let loaded = self.load().await;
        let settled = match loaded {
            Ok((observation, coordinates)) => {
                info!(location = observation.display_name(), "weather ready");
                self.state.ready(observation, coordinates)
            }
            Err(err) => {
                // The caller displays the error; keep it out of the default log level.
                info!(error = %err, "session failed");
                self.state.fail(err)
            }
        };
        if let Err(err) = settled {
            warn!(error = %err, "display state already settled");
        }

        &self.state
    }

    async fn load(&self) -> Result<(WeatherObservation, Coordinates), AppError> {
        let geolocation = self
            .geolocation
            .as_deref()
            .ok_or(AppError::GeolocationUnsupported)?;

        let coordinates = geolocation.current_position().await?;
        info!(lat = coordinates.latitude, lon = coordinates.longitude, "position acquired");

        let observation = self
            .weather
            .current_observation(&coordinates)
            .await
            .map_err(AppError::fetch)?;

        Ok((observation, coordinates))
    }

    /// The card for a `Ready` state, evaluated at `now`.
    pub fn card(&self, now: DateTime<Utc>) -> Option<WeatherCard> {
        match &self.state {
            DisplayState::Ready { observation, coordinates } => {
                Some(WeatherCard::build(observation, coordinates, now))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        advisor::{ColorToken, SuggestionToken},
        geolocation::{FixedLocation, GeolocationError},
    };
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug)]
    struct FailingLocation(GeolocationError);

    #[async_trait]
    impl GeolocationProvider for FailingLocation {
        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            Err(self.0.clone())
        }
    }

    #[derive(Debug, Clone)]
    struct StubWeather {
        result: Result<WeatherObservation, String>,
        calls: Arc<AtomicUsize>,
    }

    impl StubWeather {
        fn ok(obs: WeatherObservation) -> Self {
            Self { result: Ok(obs), calls: Arc::default() }
        }

        fn err(msg: &str) -> Self {
            Self { result: Err(msg.to_string()), calls: Arc::default() }
        }
    }

    #[async_trait]
    impl WeatherProvider for StubWeather {
        async fn current_observation(&self, _: &Coordinates) -> anyhow::Result<WeatherObservation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    fn here() -> Coordinates {
        Coordinates::new(-1.2921, 36.8219).expect("valid coordinates")
    }

    fn sunny() -> WeatherObservation {
        WeatherObservation {
            condition_main: Some("Clear".into()),
            temperature_celsius: Some(20.0),
            sunrise: Some(1_000),
            sunset: Some(50_000),
            location_name: Some("Nairobi".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ready_after_successful_run() {
        let weather = StubWeather::ok(sunny());
        let calls = weather.calls.clone();
        let mut controller =
            AppController::new(Some(Box::new(FixedLocation(here()))), Box::new(weather));

        assert!(matches!(controller.state(), DisplayState::Loading));
        controller.run().await;

        match controller.state() {
            DisplayState::Ready { observation, coordinates } => {
                assert_eq!(observation, &sunny());
                assert_eq!(coordinates, &here());
            }
            other => panic!("expected ready, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let now = DateTime::from_timestamp(2_000, 0).expect("valid timestamp");
        let card = controller.card(now).expect("card when ready");
        assert_eq!(card.location_name, "Nairobi");
        assert_eq!(card.color, ColorToken::GoldDay);
        assert_eq!(card.suggestion, SuggestionToken::GoodPlantingHarvest);
    }

    #[tokio::test]
    async fn no_geolocation_is_unsupported() {
        let weather = StubWeather::ok(sunny());
        let calls = weather.calls.clone();
        let mut controller = AppController::new(None, Box::new(weather));

        let state = controller.run().await;

        assert!(matches!(state, DisplayState::Error(AppError::GeolocationUnsupported)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn geolocation_failure_skips_fetch() {
        let weather = StubWeather::ok(sunny());
        let calls = weather.calls.clone();
        let mut controller = AppController::new(
            Some(Box::new(FailingLocation(GeolocationError::Denied))),
            Box::new(weather),
        );

        let state = controller.run().await;

        assert!(matches!(
            state,
            DisplayState::Error(AppError::GeolocationFailed(GeolocationError::Denied))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(controller.card(Utc::now()).is_none());
    }

    #[tokio::test]
    async fn fetch_failure_is_terminal() {
        let weather = StubWeather::err("status 500");
        let calls = weather.calls.clone();
        let mut controller =
            AppController::new(Some(Box::new(FixedLocation(here()))), Box::new(weather));

        controller.run().await;
        controller.run().await;

        match controller.state() {
            DisplayState::Error(AppError::FetchFailed(msg)) => assert!(msg.contains("status 500")),
            other => panic!("expected fetch failure, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
