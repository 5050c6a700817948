//! Core library for the `weathermap` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and its OpenWeatherMap implementation
//! - Location resolution, overlay sampling and condition glyphs
//! - The dashboard state the map view is driven from
//!
//! It is used by `weathermap-cli`, but can also be reused by other front ends.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod geolocation;
pub mod model;
pub mod presenter;
pub mod provider;
pub mod sampler;
pub mod symbol;

pub use config::Config;
pub use dashboard::{Applied, Dashboard, DashboardState, OverlaySettings, RequestTicket};
pub use error::WeatherError;
pub use geolocation::{FixedGeolocator, Geolocator};
pub use model::{
    Condition, Coordinates, CurrentConditions, DailyForecast, Location, LocationQuery,
    OverlayPoint, OverlaySet, Resolution, Units,
};
pub use presenter::{MapPresenter, RecordingPresenter, TileCoord, TileSource};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
