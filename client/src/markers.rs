use venue_map_shared::{Floor, LatLng, Location};

use crate::config::MARKER_IMAGE_BASE;

pub const MARKER_SIZE: (f64, f64) = (30.0, 28.0);
pub const MARKER_ANCHOR: (f64, f64) = (13.0, 26.0);
pub const USER_MARKER_SIZE: f64 = 14.0;

/// Interactive marker for one categorized location.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub location: &'static Location,
    pub icon_src: String,
}

impl Marker {
    pub fn id(&self) -> &'static str {
        self.location.id
    }

    pub fn title(&self) -> &'static str {
        self.location.title.unwrap_or(self.location.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIcon {
    /// The user is on the floor being shown.
    Here,
    Elsewhere,
}

impl UserIcon {
    pub fn src(self) -> String {
        match self {
            UserIcon::Here => format!("{MARKER_IMAGE_BASE}my_location.png"),
            UserIcon::Elsewhere => format!("{MARKER_IMAGE_BASE}my_location_diff.png"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserPosition {
    pub position: LatLng,
    pub floor: Floor,
}

pub fn marker_icon_src(icon: &str) -> String {
    format!("{MARKER_IMAGE_BASE}marker-{icon}.png")
}

pub fn shadow_src() -> String {
    format!("{MARKER_IMAGE_BASE}marker-shadow.png")
}

/// Per-floor marker lists. Only the active floor's list is attached (drawn
/// and clickable).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerRegistry {
    floors: [Vec<Marker>; 3],
    attached: Option<Floor>,
    user: Option<UserPosition>,
}

impl MarkerRegistry {
    /// Landmarks without a category produce no marker.
    pub fn build(locations: &'static [Location]) -> Self {
        let mut registry = Self::default();
        for location in locations {
            if location.category.is_none() {
                continue;
            }
            let icon = location.icon.unwrap_or("generic");
            registry.floors[location.floor.index()].push(Marker {
                location,
                icon_src: marker_icon_src(icon),
            });
        }
        registry
    }

    /// Detach the previous floor's markers and attach `floor`'s.
    pub fn set_floor(&mut self, floor: Floor) {
        if let Some(previous) = self.attached
            && previous != floor
        {
            tracing::debug!(%previous, %floor, "swapping floor markers");
        }
        self.attached = Some(floor);
    }

    pub fn attached_floor(&self) -> Option<Floor> {
        self.attached
    }

    pub fn attached(&self) -> &[Marker] {
        match self.attached {
            Some(floor) => self.on_floor(floor),
            None => &[],
        }
    }

    pub fn on_floor(&self, floor: Floor) -> &[Marker] {
        &self.floors[floor.index()]
    }

    /// Every icon image any marker can use.
    pub fn icon_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self
            .floors
            .iter()
            .flatten()
            .map(|m| m.icon_src.clone())
            .collect();
        sources.push(shadow_src());
        sources.push(UserIcon::Here.src());
        sources.push(UserIcon::Elsewhere.src());
        sources.sort();
        sources.dedup();
        sources
    }

    pub fn user(&self) -> Option<UserPosition> {
        self.user
    }

    pub fn set_user(&mut self, position: LatLng, floor: Floor) {
        self.user = Some(UserPosition { position, floor });
    }

    pub fn clear_user(&mut self) {
        self.user = None;
    }

    /// Icon for the user marker, `None` when no position is known.
    pub fn user_icon(&self) -> Option<UserIcon> {
        let user = self.user?;
        Some(if Some(user.floor) == self.attached {
            UserIcon::Here
        } else {
            UserIcon::Elsewhere
        })
    }

    /// Topmost attached marker whose icon contains the screen point.
    pub fn hit_test(
        &self,
        sx: f64,
        sy: f64,
        to_screen: impl Fn(LatLng) -> (f64, f64),
    ) -> Option<&Marker> {
        self.attached().iter().rev().find(|marker| {
            let (mx, my) = to_screen(marker.location.position);
            let left = mx - MARKER_ANCHOR.0;
            let top = my - MARKER_ANCHOR.1;
            sx >= left && sx < left + MARKER_SIZE.0 && sy >= top && sy < top + MARKER_SIZE.1
        })
    }
}
