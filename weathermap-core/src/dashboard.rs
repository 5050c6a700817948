//! The state behind the map view and the only place it changes.
//!
//! Every submitted lookup gets a [`RequestTicket`]. A completion is applied only if no
//! newer request has been issued since, so an old response arriving late cannot
//! overwrite a newer search. Failures leave the last good location on screen.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Config,
    error::WeatherError,
    geolocation::Geolocator,
    model::{LocationQuery, OverlaySet, Resolution},
    presenter::{MapPresenter, present_overlay},
    provider::WeatherProvider,
    sampler, symbol,
};

/// Overlay parameters taken from config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySettings {
    pub count: usize,
    pub radius_km: f64,
    pub zoom: u8,
}

impl From<&Config> for OverlaySettings {
    fn from(config: &Config) -> Self {
        Self {
            count: config.overlay.count,
            radius_km: config.overlay.radius_km,
            zoom: config.map.zoom,
        }
    }
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

/// Whether a completion changed the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// A newer request was issued after this one; the completion was dropped.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub current: Option<Resolution>,
    pub overlay: Option<OverlaySet>,
    pub last_error: Option<String>,
    issued: u64,
}

#[derive(Debug)]
pub struct Dashboard<R = StdRng> {
    state: DashboardState,
    settings: OverlaySettings,
    rng: R,
}

impl Dashboard<StdRng> {
    pub fn new(settings: OverlaySettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }
}

impl<R: Rng> Dashboard<R> {
    pub fn with_rng(settings: OverlaySettings, rng: R) -> Self {
        Self { state: DashboardState::default(), settings, rng }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Glyph for the currently displayed condition.
    pub fn glyph(&self) -> Option<&'static str> {
        self.state.current.as_ref().map(|r| symbol::glyph(r.condition))
    }

    /// Stamp a new outgoing request. Anything issued earlier becomes stale.
    pub fn begin(&mut self) -> RequestTicket {
        self.state.issued += 1;
        RequestTicket(self.state.issued)
    }

    fn is_stale(&self, ticket: RequestTicket) -> bool {
        ticket.0 < self.state.issued
    }

    /// Replace the displayed location and regenerate the overlay around it.
    pub fn on_resolved(&mut self, ticket: RequestTicket, resolution: Resolution) -> Applied {
        if self.is_stale(ticket) {
            tracing::debug!(
                "Dropping stale resolution #{} for {} (latest is #{})",
                ticket.0,
                resolution.location.name,
                self.state.issued
            );
            return Applied::Stale;
        }

        let overlay = sampler::sample(
            &resolution.location,
            self.settings.count,
            self.settings.radius_km,
            &mut self.rng,
        );

        self.state.current = Some(resolution);
        self.state.overlay = Some(overlay);
        self.state.last_error = None;
        Applied::Updated
    }

    /// Record a failure. The previous location and overlay stay as they were.
    pub fn on_error(&mut self, ticket: RequestTicket, error: &WeatherError) -> Applied {
        if self.is_stale(ticket) {
            tracing::debug!("Dropping stale error #{}: {}", ticket.0, error);
            return Applied::Stale;
        }

        self.record_error(error);
        Applied::Updated
    }

    fn record_error(&mut self, error: &WeatherError) {
        tracing::warn!("{}", error);
        self.state.last_error = Some(error.user_message());
    }

    /// Push the current location and overlay to `presenter`. Returns false if nothing
    /// has been resolved yet.
    pub fn present<P: MapPresenter + ?Sized>(&self, presenter: &mut P) -> bool {
        match (&self.state.current, &self.state.overlay) {
            (Some(resolution), Some(overlay)) => {
                present_overlay(
                    presenter,
                    overlay,
                    symbol::glyph(resolution.condition),
                    self.settings.zoom,
                );
                true
            }
            _ => false,
        }
    }

    /// Search box submission. Empty input is rejected before anything is sent.
    pub async fn search(
        &mut self,
        provider: &dyn WeatherProvider,
        input: &str,
    ) -> Result<Applied, WeatherError> {
        let query = match LocationQuery::parse(input) {
            Ok(q) => q,
            Err(e) => {
                self.record_error(&e);
                return Err(e);
            }
        };

        self.resolve(provider, query).await
    }

    /// "Use my location". A denied position never reaches the provider.
    pub async fn locate(
        &mut self,
        geolocator: &dyn Geolocator,
        provider: &dyn WeatherProvider,
    ) -> Result<Applied, WeatherError> {
        let position = match geolocator.locate().await {
            Ok(p) => p,
            Err(e) => {
                self.record_error(&e);
                return Err(e);
            }
        };

        self.resolve(provider, LocationQuery::Coordinates(position)).await
    }

    pub async fn resolve(
        &mut self,
        provider: &dyn WeatherProvider,
        query: LocationQuery,
    ) -> Result<Applied, WeatherError> {
        let ticket = self.begin();
        tracing::debug!("Request #{} for {}", ticket.0, query);

        match provider.resolve(&query).await {
            Ok(resolution) => Ok(self.on_resolved(ticket, resolution)),
            Err(e) => {
                self.on_error(ticket, &e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, CurrentConditions, Location, Units};
    use crate::presenter::RecordingPresenter;
    use chrono::Utc;

    fn resolution(name: &str, lat: f64, lon: f64, condition: Condition) -> Resolution {
        Resolution {
            location: Location::new(name, lat, lon),
            condition,
            current: CurrentConditions {
                description: "test".into(),
                temperature: 70.0,
                feels_like: 70.0,
                humidity_pct: 50,
                wind_speed: 5.0,
                units: Units::Imperial,
                observed_at: Utc::now(),
            },
        }
    }

    fn dashboard() -> Dashboard<StdRng> {
        Dashboard::with_rng(OverlaySettings::default(), StdRng::seed_from_u64(5))
    }

    #[test]
    fn resolved_location_gets_an_overlay() {
        let mut d = dashboard();
        let t = d.begin();

        let applied = d.on_resolved(t, resolution("New York", 40.7128, -74.006, Condition::Rain));
        assert_eq!(applied, Applied::Updated);

        let overlay = d.state().overlay.as_ref().unwrap();
        assert_eq!(overlay.len(), 10);
        assert_eq!(overlay.radius_km, 35.0);
        assert_eq!(overlay.center.name, "New York");
        assert_eq!(d.glyph(), Some("🌧️"));
    }

    #[test]
    fn late_response_from_older_request_is_dropped() {
        let mut d = dashboard();
        let first = d.begin();
        let second = d.begin();

        let paris = resolution("Paris", 48.85, 2.35, Condition::Clear);
        let london = resolution("London", 51.5, -0.12, Condition::Fog);

        assert_eq!(d.on_resolved(second, paris), Applied::Updated);
        assert_eq!(d.on_resolved(first, london), Applied::Stale);

        assert_eq!(d.state().current.as_ref().unwrap().location.name, "Paris");
    }

    #[test]
    fn stale_error_does_not_mark_newer_success() {
        let mut d = dashboard();
        let first = d.begin();
        let second = d.begin();

        d.on_resolved(second, resolution("Paris", 48.85, 2.35, Condition::Clear));
        let applied = d.on_error(first, &WeatherError::resolution("city not found"));

        assert_eq!(applied, Applied::Stale);
        assert!(d.state().last_error.is_none());
    }

    #[test]
    fn error_keeps_previous_location() {
        let mut d = dashboard();
        let t = d.begin();
        d.on_resolved(t, resolution("Kolkata", 22.57, 88.36, Condition::Haze));
        let before = d.state().overlay.clone();

        let t = d.begin();
        d.on_error(t, &WeatherError::resolution("city not found"));

        assert_eq!(d.state().current.as_ref().unwrap().location.name, "Kolkata");
        assert_eq!(d.state().overlay, before);
        assert!(d.state().last_error.as_ref().unwrap().contains("City not found"));
    }

    #[test]
    fn success_clears_previous_error() {
        let mut d = dashboard();
        let t = d.begin();
        d.on_error(t, &WeatherError::resolution("city not found"));
        assert!(d.state().last_error.is_some());

        let t = d.begin();
        d.on_resolved(t, resolution("Kolkata", 22.57, 88.36, Condition::Clear));
        assert!(d.state().last_error.is_none());
    }

    #[test]
    fn present_requires_a_resolution() {
        let d = dashboard();
        let mut p = RecordingPresenter::default();
        assert!(!d.present(&mut p));
        assert_eq!(p.clears, 0);
    }

    #[test]
    fn each_resolution_regenerates_markers() {
        let mut d = dashboard();
        let mut p = RecordingPresenter::default();

        for _ in 0..2 {
            let t = d.begin();
            d.on_resolved(t, resolution("New York", 40.7128, -74.006, Condition::Snow));
            assert!(d.present(&mut p));
        }

        assert_eq!(p.clears, 2);
        assert_eq!(p.markers.len(), 10);
        assert_eq!(p.view.unwrap().1, 10);
        assert!(p.markers.iter().all(|(_, g)| g == "❄️"));
    }
}
