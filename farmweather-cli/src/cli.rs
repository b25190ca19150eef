use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use farmweather_core::{AppController, AppError, Config, Coordinates, DisplayState, WeatherCard};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "farmweather",
    version,
    about = "Current weather for your location, with a farming suggestion"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the weather card for the current location (the default).
    ///
    /// Uses --lat/--lon, else the configured location, else an IP lookup
    /// (ip-api.com) if enabled with `configure`.
    Show(ShowArgs),

    /// Interactively set the API key and location preferences.
    Configure,

    /// Print the path of the config file.
    ConfigPath,
}

#[derive(Debug, Default, Args)]
pub struct ShowArgs {
    /// Latitude in degrees; requires --lon.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in degrees; requires --lat.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Print the card as JSON.
    #[arg(long)]
    pub json: bool,

    /// Do not paint the card background.
    #[arg(long)]
    pub no_color: bool,
}

impl ShowArgs {
    fn coordinates(&self) -> anyhow::Result<Option<Coordinates>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Some(
                Coordinates::new(lat, lon).context("Invalid --lat/--lon")?,
            )),
            _ => Ok(None),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command.unwrap_or(Command::Show(ShowArgs::default())) {
            Command::Show(args) => show(args).await,
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn show(args: ShowArgs) -> anyhow::Result<ExitCode> {
    let config = Config::load()?;
    let api_key = config.api_key_from_env()?;

    let geolocation = config.geolocation(args.coordinates()?)?;
    let weather = config.weather_provider(api_key)?;
    let mut controller = AppController::new(geolocation, weather);

    if !args.json {
        eprintln!("Fetching weather data...");
    }
    controller.run().await;

    let output = session_output(controller.state(), controller.card(Utc::now()), &args)?;
    output.emit();
    Ok(output.exit_code())
}

/// What a finished session prints, and whether it counts as success.
#[derive(Debug)]
struct SessionOutput {
    stdout: Option<String>,
    stderr: Option<String>,
    success: bool,
}

impl SessionOutput {
    fn emit(&self) {
        if let Some(out) = &self.stdout {
            println!("{out}");
        }
        if let Some(err) = &self.stderr {
            eprintln!("{err}");
        }
    }

    fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

fn session_output(
    state: &DisplayState,
    card: Option<WeatherCard>,
    args: &ShowArgs,
) -> anyhow::Result<SessionOutput> {
    match (state, card) {
        (DisplayState::Ready { .. }, Some(card)) => {
            let text = if args.json {
                render::card_json(&card)?
            } else {
                render::card_text(&card, !args.no_color)
            };
            Ok(SessionOutput { stdout: Some(text), stderr: None, success: true })
        }
        (DisplayState::Error(err), _) if args.json => Ok(SessionOutput {
            stdout: Some(render::error_json(err)?),
            stderr: None,
            success: false,
        }),
        (DisplayState::Error(err), _) => {
            let mut message = err.to_string();
            if matches!(err, AppError::GeolocationUnsupported) {
                message.push_str(
                    "\nHint: pass --lat/--lon, or run `farmweather configure` to set a location \
                     or enable IP lookup.",
                );
            }
            Ok(SessionOutput { stdout: None, stderr: Some(message), success: false })
        }
        (state, _) => anyhow::bail!("Weather session ended in unexpected state: {}", state.name()),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let has_key = cfg.openweather.api_key.is_some();
    let prompt = if has_key {
        "OpenWeather API key (leave empty to keep the current one):"
    } else {
        "OpenWeather API key:"
    };
    let key = Password::new(prompt)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    let key = key.trim();
    if !key.is_empty() {
        cfg.openweather.api_key = Some(key.to_string());
    } else if !has_key {
        anyhow::bail!("An API key is required.");
    }

    let use_fixed = Confirm::new("Use a fixed location instead of detecting it?")
        .with_default(cfg.fixed_coordinates().ok().flatten().is_some())
        .prompt()?;

    if use_fixed {
        let lat = CustomType::<f64>::new("Latitude (-90 to 90):").prompt()?;
        let lon = CustomType::<f64>::new("Longitude (-180 to 180):").prompt()?;
        let coords = Coordinates::new(lat, lon)?;
        cfg.set_fixed_coordinates(Some(coords));
    } else {
        cfg.set_fixed_coordinates(None);
        cfg.location.ip_lookup =
            Confirm::new("Detect your location from your IP address? (sends it to ip-api.com)")
                .with_default(cfg.location.ip_lookup)
                .prompt()?;
    }

    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
