use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// A resolved place. Replaced wholesale on every successful search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), latitude, longitude }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates { latitude: self.latitude, longitude: self.longitude }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Coarse weather category, taken from the provider's first classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Condition {
    Clear,
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
    Drizzle,
    Mist,
    Smoke,
    Haze,
    Fog,
    #[default]
    Other,
}

impl Condition {
    pub const fn all() -> &'static [Condition] {
        &[
            Condition::Clear,
            Condition::Clouds,
            Condition::Rain,
            Condition::Snow,
            Condition::Thunderstorm,
            Condition::Drizzle,
            Condition::Mist,
            Condition::Smoke,
            Condition::Haze,
            Condition::Fog,
            Condition::Other,
        ]
    }

    /// Map the provider's `main` classification. Matching is exact, like the provider emits it.
    pub fn from_main(main: &str) -> Self {
        match main {
            "Clear" => Condition::Clear,
            "Clouds" => Condition::Clouds,
            "Rain" => Condition::Rain,
            "Snow" => Condition::Snow,
            "Thunderstorm" => Condition::Thunderstorm,
            "Drizzle" => Condition::Drizzle,
            "Mist" => Condition::Mist,
            "Smoke" => Condition::Smoke,
            "Haze" => Condition::Haze,
            "Fog" => Condition::Fog,
            _ => Condition::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Clear => "Clear",
            Condition::Clouds => "Clouds",
            Condition::Rain => "Rain",
            Condition::Snow => "Snow",
            Condition::Thunderstorm => "Thunderstorm",
            Condition::Drizzle => "Drizzle",
            Condition::Mist => "Mist",
            Condition::Smoke => "Smoke",
            Condition::Haze => "Haze",
            Condition::Fog => "Fog",
            Condition::Other => "Other",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider `units=` selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Standard,
    Metric,
    #[default]
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Imperial, Units::Metric, Units::Standard]
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            Units::Standard => "K",
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_label(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "standard" => Ok(Units::Standard),
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: imperial, metric, standard."
            )),
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Name(String),
    ZipCode(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    /// Classify free text from the search box. Empty input never reaches the network.
    pub fn parse(input: &str) -> Result<Self, WeatherError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::input_validation(
                "Please enter a valid city or zip code",
            ));
        }

        if looks_like_zip(trimmed) {
            Ok(LocationQuery::ZipCode(trimmed.to_string()))
        } else {
            Ok(LocationQuery::Name(trimmed.to_string()))
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Name(name) => write!(f, "{name}"),
            LocationQuery::ZipCode(zip) => write!(f, "zip {zip}"),
            LocationQuery::Coordinates(c) => write!(f, "({:.4}, {:.4})", c.latitude, c.longitude),
        }
    }
}

// "10001", "10001-1234", "10001,us"
fn looks_like_zip(s: &str) -> bool {
    let (code, country) = match s.split_once(',') {
        Some((code, country)) => (code.trim(), Some(country.trim())),
        None => (s, None),
    };

    if let Some(cc) = country {
        if cc.len() != 2 || !cc.chars().all(|c| c.is_ascii_alphabetic()) {
            return false;
        }
    }

    let mut parts = code.splitn(2, '-');
    let head = parts.next().unwrap_or_default();
    let tail = parts.next();

    !head.is_empty()
        && head.chars().all(|c| c.is_ascii_digit())
        && tail.is_none_or(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
}

/// Readings shown on the current-weather card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub units: Units,
    pub observed_at: DateTime<Utc>,
}

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub location: Location,
    pub condition: Condition,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Decorative points scattered around one location. Regenerated, never diffed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySet {
    pub center: Location,
    pub radius_km: f64,
    pub points: Vec<OverlayPoint>,
}

impl OverlaySet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// GeoJSON FeatureCollection for map widgets. Coordinates are `[lon, lat]`.
    pub fn to_geojson(&self, glyph: &str) -> serde_json::Value {
        let features: Vec<serde_json::Value> = self
            .points
            .iter()
            .map(|p| {
                serde_json::json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [p.longitude, p.latitude],
                    },
                    "properties": { "glyph": glyph },
                })
            })
            .collect();

        serde_json::json!({
            "type": "FeatureCollection",
            "properties": {
                "center": self.center.name,
                "radius_km": self.radius_km,
            },
            "features": features,
        })
    }
}

/// One day of the 5-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub label: String,
    pub date: NaiveDate,
    pub temp_max: f64,
    pub temp_min: f64,
    pub condition: Condition,
    pub icon: String,
}
