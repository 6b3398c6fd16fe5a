use venue_map_shared::geo::{TILE_SIZE, from_world_px, tile_at, to_world_px};
use venue_map_shared::locations::VENUE_CENTER;
use venue_map_shared::tiles::MAX_ZOOM;
use venue_map_shared::{LatLng, LatLngBounds};

use crate::config::DEFAULT_ZOOM;

pub const MIN_VIEW_ZOOM: u8 = 15;
pub const MAX_VIEW_ZOOM: u8 = MAX_ZOOM;
const FIT_PADDING: f64 = 0.05;

/// Map camera: a geographic center at an integer Web Mercator zoom, over a
/// screen area measured in CSS pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: VENUE_CENTER,
            zoom: DEFAULT_ZOOM,
            width: 1200.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    /// World pixel shown at the top-left screen corner.
    fn origin(&self) -> (f64, f64) {
        let (cx, cy) = to_world_px(self.center, self.zoom);
        (cx - self.width / 2.0, cy - self.height / 2.0)
    }

    pub fn world_to_screen(&self, point: LatLng) -> (f64, f64) {
        let (x, y) = to_world_px(point, self.zoom);
        let (ox, oy) = self.origin();
        (x - ox, y - oy)
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64) -> LatLng {
        let (ox, oy) = self.origin();
        from_world_px(ox + sx, oy + sy, self.zoom)
    }

    /// Pan by screen-space delta; content follows the pointer.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = to_world_px(self.center, self.zoom);
        self.center = from_world_px(cx - dx, cy - dy, self.zoom);
    }

    /// Zoom by whole levels toward a focus point (screen coordinates).
    /// Returns `false` when already at the limit.
    pub fn zoom_at(&mut self, steps: i32, sx: f64, sy: f64) -> bool {
        let target = (i32::from(self.zoom) + steps)
            .clamp(i32::from(MIN_VIEW_ZOOM), i32::from(MAX_VIEW_ZOOM)) as u8;
        if target == self.zoom {
            return false;
        }
        let anchor = self.screen_to_world(sx, sy);
        self.zoom = target;

        // Keep the point under the cursor fixed
        let (ax, ay) = to_world_px(anchor, target);
        self.center = from_world_px(
            ax - sx + self.width / 2.0,
            ay - sy + self.height / 2.0,
            target,
        );
        true
    }

    pub fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.center = center;
        self.zoom = zoom.clamp(MIN_VIEW_ZOOM, MAX_VIEW_ZOOM);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Center on `bounds` at the deepest zoom that shows all of it with padding.
    pub fn fit_bounds(&mut self, bounds: LatLngBounds) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return;
        }

        let north_west = LatLng::new(bounds.north_east.lat, bounds.south_west.lng);
        let south_east = LatLng::new(bounds.south_west.lat, bounds.north_east.lng);
        let fits = |zoom: u8| {
            let (x1, y1) = to_world_px(north_west, zoom);
            let (x2, y2) = to_world_px(south_east, zoom);
            let scale = 1.0 + FIT_PADDING * 2.0;
            (x2 - x1) * scale <= self.width && (y2 - y1) * scale <= self.height
        };
        self.zoom = (MIN_VIEW_ZOOM..=MAX_VIEW_ZOOM)
            .rev()
            .find(|&zoom| fits(zoom))
            .unwrap_or(MIN_VIEW_ZOOM);
        self.center = bounds.center();
    }

    /// Tile columns and rows intersecting the screen at the current zoom.
    pub fn visible_tiles(&self) -> Vec<(i64, i64)> {
        let (ox, oy) = self.origin();
        let (x0, y0) = tile_at(ox, oy);
        let (x1, y1) = tile_at(ox + self.width, oy + self.height);
        (y0..=y1)
            .flat_map(|y| (x0..=x1).map(move |x| (x, y)))
            .collect()
    }

    /// Screen position of a tile's top-left corner.
    pub fn tile_screen_origin(&self, x: i64, y: i64) -> (f64, f64) {
        let (ox, oy) = self.origin();
        (x as f64 * TILE_SIZE - ox, y as f64 * TILE_SIZE - oy)
    }
}
