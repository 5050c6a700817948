use crate::{
    Config, DailyForecast, LocationQuery, Resolution, WeatherError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

pub mod openweather;

/// Narrow seam over the external weather service.
///
/// Implementations issue exactly one request per call and never cache or retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Turn a query into a location plus its current weather.
    async fn resolve(&self, query: &LocationQuery) -> Result<Resolution, WeatherError>;

    /// Up to five daily entries, labelled relative to `today`.
    async fn forecast(
        &self,
        query: &LocationQuery,
        today: NaiveDate,
    ) -> Result<Vec<DailyForecast>, WeatherError>;
}

/// Construct the provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::from_config(config)?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }

    #[test]
    fn provider_from_config_rejects_invalid_settings() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        cfg.request_timeout_secs = 0;

        assert!(provider_from_config(&cfg).is_err());
    }
}
