use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    Config,
    error::WeatherError,
    forecast::{ForecastSlot, daily_at_noon},
    model::{
        Condition, CurrentConditions, DailyForecast, Location, LocationQuery, Resolution, Units,
    },
};

use super::WeatherProvider;

/// OpenWeatherMap 2.5 API (`/weather` and `/forecast`).
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    units: Units,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        units: Units,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            units,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let api_key = config.require_api_key()?;

        Self::new(
            api_key.to_owned(),
            config.units,
            config.base_url.clone(),
            config.request_timeout(),
        )
    }

    fn location_params(query: &LocationQuery) -> Vec<(&'static str, String)> {
        match query {
            LocationQuery::Name(name) => vec![("q", name.clone())],
            LocationQuery::ZipCode(zip) => vec![("q", zip.clone())],
            LocationQuery::Coordinates(c) => {
                vec![("lat", c.latitude.to_string()), ("lon", c.longitude.to_string())]
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &LocationQuery,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut params = Self::location_params(query);
        params.push(("units", self.units.as_str().to_string()));
        params.push(("appid", self.api_key.clone()));

        tracing::debug!("GET {} for {}", url, query);

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!("OpenWeather {} returned {} for {}", endpoint, status, query);
            return Err(status_error(status, query, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::resolution(format!(
                "malformed OpenWeather {endpoint} response: {e}: {}",
                truncate_body(&body)
            ))
        })
    }
}

fn status_error(status: StatusCode, query: &LocationQuery, body: &str) -> WeatherError {
    let message = serde_json::from_str::<OwError>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| truncate_body(body));

    match status {
        StatusCode::NOT_FOUND => WeatherError::resolution(format!("{query}: {message}")),
        StatusCode::UNAUTHORIZED => {
            WeatherError::resolution(format!("OpenWeather rejected the API key: {message}"))
        }
        _ => WeatherError::resolution(format!(
            "OpenWeather request failed with status {status}: {message}"
        )),
    }
}

#[derive(Debug, Deserialize)]
struct OwError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    coord: OwCoord,
    #[serde(default)]
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl OwCurrentResponse {
    fn into_resolution(self, units: Units) -> Resolution {
        let first = self.weather.first();
        let condition = first.map(|w| Condition::from_main(&w.main)).unwrap_or_default();
        let description = first
            .map(|w| w.description.clone())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        // Coordinate lookups over open water come back without a name.
        let name = if self.name.is_empty() {
            format!("{:.4}, {:.4}", self.coord.lat, self.coord.lon)
        } else {
            self.name
        };

        Resolution {
            location: Location::new(name, self.coord.lat, self.coord.lon),
            condition,
            current: CurrentConditions {
                description,
                temperature: self.main.temp,
                feels_like: self.main.feels_like,
                humidity_pct: self.main.humidity,
                wind_speed: self.wind.speed,
                units,
                observed_at: self.dt.and_then(unix_to_utc).unwrap_or_else(Utc::now),
            },
        }
    }
}

impl From<OwForecastEntry> for ForecastSlot {
    fn from(entry: OwForecastEntry) -> Self {
        let first = entry.weather.first();
        ForecastSlot {
            condition: first.map(|w| Condition::from_main(&w.main)).unwrap_or_default(),
            icon: first.map(|w| w.icon.clone()).unwrap_or_default(),
            dt_txt: entry.dt_txt,
            temp_min: entry.main.temp_min,
            temp_max: entry.main.temp_max,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn resolve(&self, query: &LocationQuery) -> Result<Resolution, WeatherError> {
        let parsed: OwCurrentResponse = self.get_json("weather", query).await?;
        let resolution = parsed.into_resolution(self.units);

        tracing::info!(
            "Resolved {} to {} ({:.4}, {:.4}), {}",
            query,
            resolution.location.name,
            resolution.location.latitude,
            resolution.location.longitude,
            resolution.condition,
        );

        Ok(resolution)
    }

    async fn forecast(
        &self,
        query: &LocationQuery,
        today: NaiveDate,
    ) -> Result<Vec<DailyForecast>, WeatherError> {
        let parsed: OwForecastResponse = self.get_json("forecast", query).await?;
        let slots: Vec<ForecastSlot> = parsed.list.into_iter().map(ForecastSlot::from).collect();

        if slots.is_empty() {
            return Err(WeatherError::resolution("OpenWeather forecast response contained no data"));
        }

        Ok(daily_at_noon(&slots, today))
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;

    #[test]
    fn coordinates_use_lat_lon_params() {
        let params = OpenWeatherProvider::location_params(&LocationQuery::Coordinates(
            Coordinates::new(22.5, 88.25),
        ));
        assert_eq!(params, vec![("lat", "22.5".to_string()), ("lon", "88.25".to_string())]);
    }

    #[test]
    fn names_and_zips_use_q() {
        let params = OpenWeatherProvider::location_params(&LocationQuery::ZipCode("10001".into()));
        assert_eq!(params, vec![("q", "10001".to_string())]);
    }

    #[test]
    fn new_reports_setup_through_anyhow_and_trims_base_url() {
        // Construction reports setup problems through anyhow, not the transport variant.
        let built: anyhow::Result<OpenWeatherProvider> = OpenWeatherProvider::new(
            "KEY".into(),
            Units::Metric,
            "http://localhost:1/",
            Duration::from_secs(1),
        );
        let provider = built.unwrap();
        assert_eq!(provider.base_url, "http://localhost:1");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);
    }

    #[test]
    fn missing_classification_maps_to_other() {
        let parsed: OwCurrentResponse = serde_json::from_str(
            r#"{"name":"","coord":{"lat":1.0,"lon":2.0},"main":{"temp":70.0,"feels_like":71.0,"humidity":40},"wind":{"speed":3.0}}"#,
        )
        .unwrap();

        let res = parsed.into_resolution(Units::Imperial);
        assert_eq!(res.condition, Condition::Other);
        assert_eq!(res.current.description, "Unknown");
        assert_eq!(res.location.name, "1.0000, 2.0000");
    }

    #[test]
    fn status_error_prefers_provider_message() {
        let err = status_error(
            StatusCode::NOT_FOUND,
            &LocationQuery::Name("Zzqqxxnotacity".into()),
            r#"{"cod":"404","message":"city not found"}"#,
        );
        assert!(matches!(err, WeatherError::Resolution(_)));
        assert!(err.to_string().contains("Zzqqxxnotacity: city not found"));
    }
}
