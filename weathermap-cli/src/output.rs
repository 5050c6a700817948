use std::fmt::Write;

use weathermap_core::{
    Coordinates, DailyForecast, MapPresenter, OverlayPoint, Resolution, TileCoord, TileSource,
    Units, symbol,
};

/// Current-weather card as plain text.
pub fn format_current(resolution: &Resolution) -> String {
    let c = &resolution.current;
    let t = c.units.temperature_label();

    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", resolution.location.name, symbol::glyph(resolution.condition));
    let _ = writeln!(out, "{}", c.description);
    let _ = writeln!(
        out,
        "{}{t} (feels like {}{t})",
        c.temperature.round(),
        c.feels_like.round()
    );
    let _ = writeln!(
        out,
        "Wind: {} {}   Humidity: {}%",
        c.wind_speed.round(),
        c.units.speed_label(),
        c.humidity_pct
    );
    out
}

pub fn format_forecast(days: &[DailyForecast], units: Units) -> String {
    if days.is_empty() {
        return "No forecast available.\n".to_string();
    }

    let t = units.temperature_label();
    let mut out = String::new();
    for day in days {
        let _ = writeln!(
            out,
            "{:<10} {}  {}{t} / {}{t}",
            day.label,
            symbol::glyph(day.condition),
            day.temp_max.round(),
            day.temp_min.round()
        );
    }
    out
}

/// Map presenter that renders to lines of text.
#[derive(Debug)]
pub struct TextPresenter {
    tiles: TileSource,
    view: Vec<String>,
    markers: Vec<String>,
}

impl TextPresenter {
    pub fn new(tiles: TileSource) -> Self {
        Self { tiles, view: Vec::new(), markers: Vec::new() }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.view.iter().chain(&self.markers) {
            let _ = writeln!(out, "{line}");
        }
        out
    }
}

impl MapPresenter for TextPresenter {
    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        let tile = TileCoord::containing(center, zoom);
        self.view = vec![
            format!("Map centered on {:.4}, {:.4} at zoom {zoom}", center.latitude, center.longitude),
            format!("Tile: {}", self.tiles.url(tile)),
        ];
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn add_marker(&mut self, point: OverlayPoint, glyph: &str) {
        self.markers.push(format!("  {glyph} {:>9.4}, {:>9.4}", point.latitude, point.longitude));
    }
}
