use thiserror::Error;

use crate::{
    error::AppError,
    model::{Coordinates, WeatherObservation},
};

/// What the card currently shows.
///
/// Starts as `Loading` and moves exactly once, to `Error` or `Ready`.
#[derive(Debug, Default)]
pub enum DisplayState {
    #[default]
    Loading,
    Error(AppError),
    Ready {
        observation: WeatherObservation,
        coordinates: Coordinates,
    },
}

#[derive(Debug, Error)]
#[error("display state is already {current}; only Loading can transition")]
pub struct TerminalState {
    pub current: &'static str,
}

impl DisplayState {
    pub fn name(&self) -> &'static str {
        match self {
            DisplayState::Loading => "loading",
            DisplayState::Error(_) => "error",
            DisplayState::Ready { .. } => "ready",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DisplayState::Loading)
    }

    pub fn fail(&mut self, error: AppError) -> Result<(), TerminalState> {
        self.transition(DisplayState::Error(error))
    }

    pub fn ready(
        &mut self,
        observation: WeatherObservation,
        coordinates: Coordinates,
    ) -> Result<(), TerminalState> {
        self.transition(DisplayState::Ready { observation, coordinates })
    }

    fn transition(&mut self, next: DisplayState) -> Result<(), TerminalState> {
        if self.is_terminal() {
            return Err(TerminalState { current: self.name() });
        }
        *self = next;
        Ok(())
    }
}
