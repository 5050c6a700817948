use async_trait::async_trait;
use std::fmt::Debug;

use crate::{config::GeolocationConfig, error::WeatherError, model::Coordinates};

/// Source of the device position.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Current position, or `GeolocationDenied` if the platform will not say.
    async fn locate(&self) -> Result<Coordinates, WeatherError>;
}

/// Position handed in from outside (command line flags or the config file).
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinates>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }

    /// Explicit coordinates win over the configured ones.
    pub fn from_sources(explicit: Option<Coordinates>, config: &GeolocationConfig) -> Self {
        Self::new(explicit.or_else(|| config.coordinates()))
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, WeatherError> {
        let position = self.position.ok_or_else(|| {
            WeatherError::geolocation_denied("no device position is available on this platform")
        })?;

        let valid = (-90.0..=90.0).contains(&position.latitude)
            && (-180.0..=180.0).contains(&position.longitude);
        if !valid {
            return Err(WeatherError::geolocation_denied(format!(
                "reported position ({}, {}) is out of range",
                position.latitude, position.longitude
            )));
        }

        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_position_is_denied() {
        let geo = FixedGeolocator::default();
        let err = geo.locate().await.unwrap_err();
        assert!(matches!(err, WeatherError::GeolocationDenied(_)));
    }

    #[tokio::test]
    async fn explicit_position_wins_over_config() {
        let config = GeolocationConfig { latitude: Some(1.0), longitude: Some(2.0) };
        let geo = FixedGeolocator::from_sources(Some(Coordinates::new(40.7, -74.0)), &config);
        assert_eq!(geo.locate().await.unwrap(), Coordinates::new(40.7, -74.0));

        let geo = FixedGeolocator::from_sources(None, &config);
        assert_eq!(geo.locate().await.unwrap(), Coordinates::new(1.0, 2.0));
    }

    #[tokio::test]
    async fn out_of_range_position_is_denied() {
        let geo = FixedGeolocator::new(Some(Coordinates::new(120.0, 0.0)));
        assert!(matches!(geo.locate().await, Err(WeatherError::GeolocationDenied(_))));
    }
}
