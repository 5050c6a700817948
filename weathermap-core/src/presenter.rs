//! Contract with whatever draws the map.

use std::f64::consts::PI;

use crate::model::{Coordinates, OverlayPoint, OverlaySet};

pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_ZOOM: u8 = 10;
pub const MAX_ZOOM: u8 = 19;

/// Rendering side of the map. The core only ever tells it what to show.
pub trait MapPresenter {
    fn set_view(&mut self, center: Coordinates, zoom: u8);
    fn clear_markers(&mut self);
    fn add_marker(&mut self, point: OverlayPoint, glyph: &str);
}

/// Replace whatever the presenter shows with `overlay`.
///
/// Old markers are always removed first, even when the new set looks identical.
pub fn present_overlay<P: MapPresenter + ?Sized>(
    presenter: &mut P,
    overlay: &OverlaySet,
    glyph: &str,
    zoom: u8,
) {
    presenter.clear_markers();
    presenter.set_view(overlay.center.coordinates(), zoom);
    for point in &overlay.points {
        presenter.add_marker(*point, glyph);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    /// Slippy-map tile containing `at` at zoom `z`.
    pub fn containing(at: Coordinates, z: u8) -> Self {
        let n = f64::from(1u32 << z.min(MAX_ZOOM));
        // Web Mercator is undefined beyond ~85.0511°.
        let lat = at.latitude.clamp(-85.051_128, 85.051_128).to_radians();
        let lon = ((at.longitude + 180.0).rem_euclid(360.0)) - 180.0;

        let x = ((lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

        let max = n - 1.0;
        Self { x: x.clamp(0.0, max) as u32, y: y.clamp(0.0, max) as u32, z: z.min(MAX_ZOOM) }
    }
}

/// URL template for map tiles, e.g. `https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    template: String,
}

impl TileSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    pub fn url(&self, tile: TileCoord) -> String {
        const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];
        let subdomain = SUBDOMAINS[((tile.x + tile.y) % 3) as usize];

        self.template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

impl Default for TileSource {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_URL)
    }
}

/// Presenter that just remembers what it was told. Handy for headless callers and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingPresenter {
    pub view: Option<(Coordinates, u8)>,
    pub markers: Vec<(OverlayPoint, String)>,
    pub clears: usize,
}

impl MapPresenter for RecordingPresenter {
    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        self.view = Some((center, zoom));
    }

    fn clear_markers(&mut self) {
        self.clears += 1;
        self.markers.clear();
    }

    fn add_marker(&mut self, point: OverlayPoint, glyph: &str) {
        self.markers.push((point, glyph.to_string()));
    }
}
