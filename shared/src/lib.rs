pub mod cache;
pub mod content;
pub mod error;
pub mod feed;
pub mod floor;
pub mod fragment;
pub mod geo;
pub mod locations;
pub mod schedule;
pub mod tiles;
pub mod view_state;

pub use cache::{CachedValue, KeyValueStore, LocalCache};
pub use content::{ContentStore, FeedOutcome, PanelContent, PanelEntry, panel_for};
pub use error::{FeedError, RowError};
pub use feed::{FeedKind, SandboxItem, SessionItem};
pub use floor::Floor;
pub use fragment::ViewFragment;
pub use geo::{LatLng, LatLngBounds};
pub use locations::{Category, Location};
pub use schedule::ConferenceDay;
pub use tiles::{TileKey, tile_url};
pub use view_state::{PanelChange, Transition, ViewStateSync};
