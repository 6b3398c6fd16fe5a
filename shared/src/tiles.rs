use crate::floor::Floor;

pub const MIN_ZOOM: u8 = 16;
pub const MAX_ZOOM: u8 = 20;

/// Zoom levels up to this one share a single floor-agnostic tile set.
pub const COARSE_MAX_ZOOM: u8 = 17;

pub const DEFAULT_TILE_BASE_URL: &str = "http://www.gstatic.com/io2010maps/tiles/2/";

const FLOOR_TEMPLATE: &str = "L{L}_{Z}_{X}_{Y}.png";
const COARSE_TEMPLATE: &str = "{Z}_{X}_{Y}.png";

/// Inclusive tile column and row ranges per zoom level, `MIN_ZOOM..=MAX_ZOOM`.
const RESOLUTION_BOUNDS: [((i64, i64), (i64, i64)); 5] = [
    ((10484, 10485), (25328, 25329)),
    ((20969, 20970), (50657, 50658)),
    ((41939, 41940), (101315, 101317)),
    ((83878, 83881), (202631, 202634)),
    ((167757, 167763), (405263, 405269)),
];

/// Tile address within the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub floor: Floor,
    pub zoom: u8,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub x: (i64, i64),
    pub y: (i64, i64),
}

impl TileRange {
    pub fn contains(&self, x: i64, y: i64) -> bool {
        (self.x.0..=self.x.1).contains(&x) && (self.y.0..=self.y.1).contains(&y)
    }
}

/// Tiles that exist at `zoom`, or `None` outside the supported zoom range.
pub fn tile_range(zoom: u8) -> Option<TileRange> {
    if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
        return None;
    }
    let (x, y) = RESOLUTION_BOUNDS[usize::from(zoom - MIN_ZOOM)];
    Some(TileRange { x, y })
}

/// Resolve the image path of an overlay tile. `None` when no such tile exists.
pub fn tile_url(base: &str, floor: Floor, zoom: u8, x: i64, y: i64) -> Option<String> {
    let range = tile_range(zoom)?;
    if !range.contains(x, y) {
        return None;
    }

    let template = if zoom <= COARSE_MAX_ZOOM {
        COARSE_TEMPLATE
    } else {
        FLOOR_TEMPLATE
    };
    let path = template
        .replace("{L}", &floor.to_string())
        .replace("{Z}", &zoom.to_string())
        .replace("{X}", &x.to_string())
        .replace("{Y}", &y.to_string());
    Some(format!("{base}{path}"))
}

impl TileKey {
    pub fn url(&self, base: &str) -> Option<String> {
        tile_url(base, self.floor, self.zoom, self.x, self.y)
    }

    /// Key under which the image is cached. Coarse zooms are shared by all floors.
    pub fn image_key(&self) -> TileKey {
        if self.zoom <= COARSE_MAX_ZOOM {
            TileKey {
                floor: Floor::default(),
                ..*self
            }
        } else {
            *self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "tiles/";

    #[test]
    fn rejects_zoom_outside_range() {
        for zoom in [0, 1, 15, 21, 22, 30] {
            assert_eq!(tile_url(BASE, Floor::One, zoom, 10484, 25328), None);
            assert!(tile_range(zoom).is_none());
        }
    }

    #[test]
    fn rejects_out_of_bounds_coordinates() {
        for zoom in MIN_ZOOM..=MAX_ZOOM {
            let range = tile_range(zoom).unwrap();
            let (x0, x1) = range.x;
            let (y0, y1) = range.y;
            for (x, y) in [(x0 - 1, y0), (x1 + 1, y0), (x0, y0 - 1), (x0, y1 + 1)] {
                assert_eq!(tile_url(BASE, Floor::Two, zoom, x, y), None, "z{zoom} {x},{y}");
            }
        }
    }

    #[test]
    fn every_in_bounds_tile_has_a_path_for_its_tier() {
        for zoom in MIN_ZOOM..=MAX_ZOOM {
            let range = tile_range(zoom).unwrap();
            for x in range.x.0..=range.x.1 {
                for y in range.y.0..=range.y.1 {
                    let url = tile_url(BASE, Floor::Three, zoom, x, y).unwrap();
                    let expected = if zoom <= COARSE_MAX_ZOOM {
                        format!("tiles/{zoom}_{x}_{y}.png")
                    } else {
                        format!("tiles/L3_{zoom}_{x}_{y}.png")
                    };
                    assert_eq!(url, expected);
                }
            }
        }
    }

    #[test]
    fn coarse_tiles_ignore_floor() {
        let a = tile_url(BASE, Floor::One, 16, 10484, 25328);
        let b = tile_url(BASE, Floor::Three, 16, 10484, 25328);
        assert_eq!(a, b);
        assert_eq!(a.as_deref(), Some("tiles/16_10484_25328.png"));
    }

    #[test]
    fn image_key_collapses_floors_only_when_coarse() {
        let coarse = TileKey {
            floor: Floor::Three,
            zoom: 17,
            x: 20969,
            y: 50657,
        };
        assert_eq!(coarse.image_key().floor, Floor::One);

        let fine = TileKey {
            floor: Floor::Three,
            zoom: 19,
            x: 83878,
            y: 202631,
        };
        assert_eq!(fine.image_key(), fine);
        assert_eq!(
            fine.url(BASE).as_deref(),
            Some("tiles/L3_19_83878_202631.png")
        );
    }
}
