use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Select};
use weathermap_core::{
    Config, Coordinates, Dashboard, FixedGeolocator, Geolocator, LocationQuery, OverlaySettings,
    Units, WeatherError, WeatherProvider, provider_from_config, symbol,
};

use crate::output::{TextPresenter, format_current, format_forecast};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathermap", version, about = "Weather dashboard with a map overlay")]
pub struct Cli {
    /// Log resolution details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, units and overlay defaults.
    Configure,

    /// Show current weather for a city name or zip code.
    Show {
        /// City name or zip code, e.g. "New York" or "10001".
        query: String,
    },

    /// Show current weather at the device position.
    Locate {
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,

        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,
    },

    /// Center a map on a location and scatter weather markers around it.
    Map {
        /// City name or zip code.
        query: String,

        /// Number of markers (defaults to the configured value).
        #[arg(long)]
        count: Option<usize>,

        /// Scatter radius in kilometers (defaults to the configured value).
        #[arg(long)]
        radius: Option<f64>,

        /// Print the overlay as GeoJSON instead of text.
        #[arg(long)]
        geojson: bool,
    },

    /// Five-day forecast for a city name or zip code.
    Forecast {
        query: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { query } => {
                let config = Config::load()?;
                show(&config, &query).await
            }
            Command::Locate { lat, lon } => {
                let config = Config::load()?;
                let explicit = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                locate(&config, explicit).await
            }
            Command::Map { query, count, radius, geojson } => {
                let mut config = Config::load()?;
                if let Some(count) = count {
                    config.overlay.count = count;
                }
                if let Some(radius) = radius {
                    config.overlay.radius_km = radius;
                }
                map(&config, &query, geojson).await
            }
            Command::Forecast { query } => {
                let config = Config::load()?;
                forecast(&config, &query).await
            }
        }
    }
}

/// Turn a domain error into the short message the user sees, keeping the cause chain.
fn surface(err: WeatherError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

fn provider(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    provider_from_config(config)
}

async fn show(config: &Config, query: &str) -> anyhow::Result<()> {
    let provider = provider(config)?;
    let mut dashboard = Dashboard::new(OverlaySettings::from(config));

    dashboard.search(provider.as_ref(), query).await.map_err(surface)?;

    if let Some(current) = &dashboard.state().current {
        print!("{}", format_current(current));
    }
    Ok(())
}

async fn locate(config: &Config, explicit: Option<Coordinates>) -> anyhow::Result<()> {
    // Position first: a denied location should not turn into a missing API key error.
    let geolocator = FixedGeolocator::from_sources(explicit, &config.geolocation);
    let position = geolocator.locate().await.map_err(surface)?;

    let provider = provider(config)?;
    let mut dashboard = Dashboard::new(OverlaySettings::from(config));

    dashboard
        .resolve(provider.as_ref(), LocationQuery::Coordinates(position))
        .await
        .map_err(surface)?;

    if let Some(current) = &dashboard.state().current {
        print!("{}", format_current(current));
    }
    Ok(())
}

async fn map(config: &Config, query: &str, geojson: bool) -> anyhow::Result<()> {
    let provider = provider(config)?;
    let mut dashboard = Dashboard::new(OverlaySettings::from(config));

    dashboard.search(provider.as_ref(), query).await.map_err(surface)?;

    let state = dashboard.state();
    let (Some(current), Some(overlay)) = (&state.current, &state.overlay) else {
        return Ok(());
    };

    if geojson {
        let doc = overlay.to_geojson(symbol::glyph(current.condition));
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let mut presenter = TextPresenter::new(config.map.tile_source());
    dashboard.present(&mut presenter);

    print!("{}", format_current(current));
    println!();
    print!("{}", presenter.render());
    Ok(())
}

async fn forecast(config: &Config, query: &str) -> anyhow::Result<()> {
    let query = LocationQuery::parse(query).map_err(surface)?;
    let provider = provider(config)?;
    let today = chrono::Local::now().date_naive();

    let days = provider.forecast(&query, today).await.map_err(surface)?;

    println!("5-day forecast for {query}");
    print!("{}", format_forecast(&days, config.units));
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let key_prompt = if config.api_key.is_some() {
        "OpenWeather API key (leave empty to keep the current one):"
    } else {
        "OpenWeather API key:"
    };
    let api_key = Password::new(key_prompt)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let units = Units::all().to_vec();
    let cursor = units.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", units)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read units")?;

    config.overlay.count = CustomType::<usize>::new("Overlay markers:")
        .with_default(config.overlay.count)
        .prompt()
        .context("Failed to read marker count")?;

    config.overlay.radius_km = CustomType::<f64>::new("Overlay radius (km):")
        .with_default(config.overlay.radius_km)
        .prompt()
        .context("Failed to read overlay radius")?;

    config.validate()?;
    config.save_to(&path)?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}
