//! Scatter decorative overlay points around a resolved location.

use std::f64::consts::PI;

use rand::{Rng, distributions::Standard};

use crate::model::{Coordinates, Location, OverlayPoint, OverlaySet};

/// Kilometers per degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// cos(89.94°); keeps the longitude correction finite at the poles.
const MIN_COS_LAT: f64 = 1e-3;

/// Draw `count` points within `radius_km` of `center`.
///
/// Distance and angle are drawn uniformly and independently, so points cluster toward
/// the center rather than covering the disk evenly by area. Longitude offsets are
/// widened by `1 / cos(lat)` to compensate for meridians converging.
pub fn sample<R: Rng + ?Sized>(
    center: &Location,
    count: usize,
    radius_km: f64,
    rng: &mut R,
) -> OverlaySet {
    let cos_lat = center.latitude.to_radians().cos().max(MIN_COS_LAT);

    let points = (0..count)
        .map(|_| {
            let distance = rng.sample::<f64, _>(Standard) * radius_km;
            let angle = rng.sample::<f64, _>(Standard) * 2.0 * PI;

            let delta_lat = (distance / KM_PER_DEGREE) * angle.cos();
            let delta_lon = (distance / (KM_PER_DEGREE * cos_lat)) * angle.sin();

            normalize(center.latitude + delta_lat, center.longitude + delta_lon)
        })
        .collect();

    OverlaySet { center: center.clone(), radius_km, points }
}

/// Fold a raw offset point back into `[-90, 90] x [-180, 180)` without moving it on the
/// sphere: latitudes past a pole are reflected and the longitude turned half way round.
fn normalize(latitude: f64, longitude: f64) -> OverlayPoint {
    let (latitude, longitude) = if latitude > 90.0 {
        (180.0 - latitude, longitude + 180.0)
    } else if latitude < -90.0 {
        (-180.0 - latitude, longitude + 180.0)
    } else {
        (latitude, longitude)
    };

    let longitude = if (-180.0..180.0).contains(&longitude) {
        longitude
    } else {
        ((longitude + 180.0).rem_euclid(360.0)) - 180.0
    };

    OverlayPoint { latitude, longitude }
}

/// Haversine great-circle distance in kilometers.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
