use serde::{Deserialize, Serialize};

use crate::floor::Floor;
use crate::geo::{LatLng, LatLngBounds};

/// Venue center used for the initial view.
pub const VENUE_CENTER: LatLng = LatLng::new(37.78313383211993, -122.40394949913025);

/// Positions outside this box are not considered inside the building.
pub const BUILDING_BOUNDS: LatLngBounds = LatLngBounds::new(
    LatLng::new(37.779718683356776, -122.40721106529236),
    LatLng::new(37.785001391734994, -122.40050554275513),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Session,
    Sandbox,
    OfficeHours,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Session => "session",
            Category::Sandbox => "sandbox",
            Category::OfficeHours => "officehours",
        }
    }
}

/// A fixed point of interest. Locations without a category are landmarks and
/// get no interactive marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub id: &'static str,
    pub floor: Floor,
    pub position: LatLng,
    pub category: Option<Category>,
    pub icon: Option<&'static str>,
    pub title: Option<&'static str>,
}

const fn loc(
    id: &'static str,
    floor: Floor,
    lat: f64,
    lng: f64,
    category: Option<Category>,
    icon: Option<&'static str>,
    title: Option<&'static str>,
) -> Location {
    Location {
        id,
        floor,
        position: LatLng::new(lat, lng),
        category,
        icon,
        title,
    }
}

const fn room(id: &'static str, lat: f64, lng: f64, title: &'static str) -> Location {
    loc(
        id,
        Floor::Two,
        lat,
        lng,
        Some(Category::Session),
        Some("media"),
        Some(title),
    )
}

const fn pod(id: &'static str, lat: f64, lng: f64, name: &'static str) -> Location {
    loc(
        id,
        Floor::Two,
        lat,
        lng,
        Some(Category::Sandbox),
        Some("generic"),
        Some(name),
    )
}

const fn landmark(id: &'static str, floor: Floor, lat: f64, lng: f64) -> Location {
    loc(id, floor, lat, lng, None, None, None)
}

pub const LOCATIONS: &[Location] = &[
    loc(
        "firesidechatroom",
        Floor::Two,
        37.783046918434756,
        -122.40462005138397,
        Some(Category::Session),
        Some("info"),
        Some("Fireside Chats"),
    ),
    room("1", 37.78342001060504, -122.4041486531496, "Room 1"),
    room("2", 37.78331189886305, -122.40430690348148, "Room 2"),
    room("3", 37.78317304923709, -122.40448258817196, "Room 3"),
    room("4", 37.78328222110238, -122.40380935370922, "Room 4"),
    room("5", 37.78314443134288, -122.40397699177265, "Room 5"),
    room("6", 37.78292608704408, -122.4042559415102, "Room 6"),
    room("7", 37.7830098210991, -122.40380734205246, "Room 7"),
    room("8", 37.782828573847965, -122.40403197705746, "Room 8"),
    room("9", 37.78269608288613, -122.40420296788216, "Room 9"),
    landmark("pressroom", Floor::Two, 37.78311899320535, -122.4036256223917),
    pod("appengine", 37.78361387539269, -122.40358136594296, "App Engine"),
    pod("chrome", 37.7832864607833, -122.4032662063837, "Chrome"),
    pod("enterprise", 37.78332143814089, -122.4031562358141, "Enterprise"),
    pod("android", 37.78343484945917, -122.40348614752293, "Android"),
    pod("geo", 37.783660611659144, -122.40379594266415, "Geo"),
    pod("googleapis", 37.78362245471605, -122.40368865430355, "Google APIs"),
    pod("gwt", 37.78322286554527, -122.40321524441242, "GWT"),
    pod("socialweb", 37.783549320520045, -122.40365378558636, "Social Web"),
    pod("wave", 37.78369982849679, -122.4037168174982, "Wave"),
    landmark("scvngr", Floor::Two, 37.78356521926445, -122.40382008254528),
    landmark("chevvy", Floor::Two, 37.78331613854221, -122.40365445613861),
    loc(
        "keynote",
        Floor::Three,
        37.783250423488326,
        -122.40417748689651,
        None,
        Some("media"),
        Some("Keynote"),
    ),
    loc(
        "officehours",
        Floor::Three,
        37.78367969012315,
        -122.4036893248558,
        Some(Category::OfficeHours),
        Some("generic"),
        Some("Office Hours"),
    ),
    landmark("gtug", Floor::Three, 37.783293880224164, -122.40323670208454),
];

pub fn on_floor(floor: Floor) -> impl Iterator<Item = &'static Location> {
    LOCATIONS.iter().filter(move |l| l.floor == floor)
}

/// Look up a location across all floors.
pub fn find(id: &str) -> Option<&'static Location> {
    LOCATIONS.iter().find(|l| l.id == id)
}

/// Look up a location on one floor.
pub fn find_on(floor: Floor, id: &str) -> Option<&'static Location> {
    on_floor(floor).find(|l| l.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<&str> = LOCATIONS.iter().map(|l| l.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), LOCATIONS.len());
    }

    #[test]
    fn every_location_is_inside_the_building() {
        for location in LOCATIONS {
            assert!(BUILDING_BOUNDS.contains(location.position), "{}", location.id);
        }
    }

    #[test]
    fn first_floor_is_empty() {
        assert_eq!(on_floor(Floor::One).count(), 0);
    }

    #[test]
    fn lookup_is_floor_scoped() {
        assert_eq!(find("officehours").map(|l| l.floor), Some(Floor::Three));
        assert!(find_on(Floor::Two, "officehours").is_none());
        assert_eq!(
            find_on(Floor::Two, "3").and_then(|l| l.category),
            Some(Category::Session)
        );
    }

    #[test]
    fn categorized_locations_have_icons() {
        for location in LOCATIONS.iter().filter(|l| l.category.is_some()) {
            assert!(location.icon.is_some(), "{}", location.id);
            assert!(location.title.is_some(), "{}", location.id);
        }
    }
}
