use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Edge length of one map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Web Mercator cannot represent the poles.
const MAX_LATITUDE: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned lat/lng rectangle. Does not handle antimeridian wrap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub const fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Smallest bounds containing both points, in any order.
    pub fn spanning(a: LatLng, b: LatLng) -> Self {
        Self {
            south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

/// Size of the whole world in pixels at `zoom`.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * f64::from(1u32 << zoom.min(30))
}

/// Project to Web Mercator world pixels at `zoom`.
pub fn to_world_px(point: LatLng, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

/// Inverse of [`to_world_px`].
pub fn from_world_px(x: f64, y: f64, zoom: u8) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / size;
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Tile column/row containing a world pixel.
pub fn tile_at(px: f64, py: f64) -> (i64, i64) {
    (
        (px / TILE_SIZE).floor() as i64,
        (py / TILE_SIZE).floor() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const VENUE: LatLng = LatLng::new(37.78313383211993, -122.40394949913025);

    #[test]
    fn projection_round_trips() {
        let (x, y) = to_world_px(VENUE, 19);
        let back = from_world_px(x, y, 19);
        assert!((back.lat - VENUE.lat).abs() < 1e-9);
        assert!((back.lng - VENUE.lng).abs() < 1e-9);
    }

    #[test]
    fn venue_falls_in_known_tiles() {
        let (x, y) = to_world_px(VENUE, 16);
        assert_eq!(tile_at(x, y), (10485, 25329));

        let (x, y) = to_world_px(VENUE, 18);
        let (tx, ty) = tile_at(x, y);
        assert!((41939..=41940).contains(&tx));
        assert!((101315..=101317).contains(&ty));
    }

    #[test]
    fn bounds_contains_is_inclusive() {
        let bounds = LatLngBounds::new(LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0));
        assert!(bounds.contains(LatLng::new(1.0, 2.0)));
        assert!(bounds.contains(LatLng::new(1.5, 1.5)));
        assert!(!bounds.contains(LatLng::new(2.1, 1.5)));
    }

    #[test]
    fn spanning_orders_corners() {
        let bounds = LatLngBounds::spanning(LatLng::new(2.0, -1.0), LatLng::new(1.0, 3.0));
        assert_eq!(bounds.south_west, LatLng::new(1.0, -1.0));
        assert_eq!(bounds.north_east, LatLng::new(2.0, 3.0));
        assert_eq!(bounds.center(), LatLng::new(1.5, 1.0));
    }
}
