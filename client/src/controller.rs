use leptos::prelude::*;
use venue_map_shared::locations::{self, BUILDING_BOUNDS, LOCATIONS};
use venue_map_shared::{
    ConferenceDay, ContentStore, FeedKind, FeedOutcome, Floor, KeyValueStore, LatLng,
    LatLngBounds, LocalCache, PanelChange, PanelContent, Transition, ViewFragment, ViewStateSync, panel_for,
};

use crate::config::{FOCUS_ZOOM, SESSION_BASE_URL};
use crate::feed_loader;
use crate::hash_sync;
use crate::host;
use crate::markers::MarkerRegistry;
use crate::storage::BrowserStore;
use crate::viewport::Viewport;

/// Schedule day shown in panels, from the local date.
fn today() -> ConferenceDay {
    ConferenceDay::shown_on(chrono::Local::now().date_naive())
}

fn local_cache() -> LocalCache<BrowserStore> {
    LocalCache::new(BrowserStore::detect())
}

/// Panel for `id` on `floor`, if that location exists there and has content.
fn resolve(
    floor: Floor,
    id: &str,
    day: ConferenceDay,
    content: &ContentStore,
) -> Option<PanelContent> {
    locations::find_on(floor, id).and_then(|l| panel_for(l, day, content, SESSION_BASE_URL))
}

/// Owns map state. Every field is an arena handle, so the controller is
/// `Copy` and can be captured freely by event handlers and host entry points.
#[derive(Clone, Copy)]
pub struct MapController {
    pub viewport: RwSignal<Viewport>,
    pub floor: RwSignal<Floor>,
    pub markers: RwSignal<MarkerRegistry>,
    pub panel: RwSignal<Option<PanelContent>>,
    /// Floor buttons stay hidden until the first tiles have loaded.
    pub toolbox_enabled: RwSignal<bool>,
    pub my_location_visible: RwSignal<bool>,
    content: StoredValue<ContentStore>,
    sync: StoredValue<ViewStateSync>,
    host_managed: bool,
    mobile: bool,
}

impl MapController {
    pub fn new(host_managed: bool, mobile: bool) -> Self {
        Self {
            viewport: RwSignal::new(Viewport::default()),
            floor: RwSignal::new(Floor::default()),
            markers: RwSignal::new(MarkerRegistry::build(LOCATIONS)),
            panel: RwSignal::new(None),
            toolbox_enabled: RwSignal::new(false),
            my_location_visible: RwSignal::new(false),
            content: StoredValue::new(ContentStore::default()),
            sync: StoredValue::new(ViewStateSync::new()),
            host_managed,
            mobile,
        }
    }

    pub fn is_mobile(self) -> bool {
        self.mobile
    }

    /// Initial floor, cached content, feed loading, then fragment polling.
    /// Polling is skipped when a host drives navigation.
    pub fn start(self) {
        let hash = hash_sync::read_hash();
        if self.host_managed || hash.trim_start_matches('#').is_empty() {
            self.navigate(ViewFragment::floor_only(Floor::One), true);
        }

        let cached = ContentStore::from_cache(&local_cache());
        tracing::debug!(
            sessions = cached.is_loaded(FeedKind::Sessions),
            sandbox = cached.is_loaded(FeedKind::Sandbox),
            "loaded cached content"
        );
        self.content.set_value(cached);

        feed_loader::load_feeds(self);
        if !self.host_managed {
            hash_sync::start(self);
        }
    }

    pub fn stop(self) {
        hash_sync::stop();
    }

    /// Evaluate the current fragment and apply the resulting transition.
    pub fn check_hash(self, force: bool) {
        self.evaluate(&hash_sync::read_hash(), force);
    }

    fn evaluate(self, hash: &str, force: bool) {
        let day = today();
        let mut sync = self.sync.get_value();
        let transition = self.content.with_value(|content| {
            sync.check(hash, force, |floor, id| resolve(floor, id, day, content).is_some())
        });
        self.sync.set_value(sync);
        self.apply(transition);
    }

    fn apply(self, transition: Transition) {
        if transition.is_empty() {
            return;
        }
        if let Some(floor) = transition.floor {
            self.switch_floor(floor);
        }
        match transition.panel {
            Some(PanelChange::Open(id)) => self.open_panel(&id),
            Some(PanelChange::Close) => self.panel.set(None),
            None => {}
        }
    }

    fn switch_floor(self, floor: Floor) {
        tracing::debug!(%floor, "switching floor");
        self.floor.set(floor);
        self.markers.update(|markers| markers.set_floor(floor));
        self.panel.set(None);
    }

    fn open_panel(self, id: &str) {
        let floor = self.floor.get_untracked();
        let day = today();
        let content = self.content.with_value(|content| resolve(floor, id, day, content));
        self.panel.set(content);
    }

    /// Route a navigation. Without a host the fragment is written and fed
    /// straight into the transition path; with one, state changes directly.
    fn navigate(self, fragment: ViewFragment, force: bool) {
        if !self.host_managed {
            hash_sync::write_hash(&fragment);
            self.check_hash(force);
            return;
        }

        let mut sync = self.sync.get_value();
        let switched = sync.set_floor(fragment.floor, force);
        self.sync.set_value(sync);
        if let Some(floor) = switched {
            self.switch_floor(floor);
        }
        if let Some(id) = fragment.content_id {
            host::open_content_info(&id);
        }
    }

    /// Floor buttons and `showLevel`. Selecting the active floor does nothing.
    pub fn show_floor(self, floor: Floor) {
        if self.sync.with_value(|sync| sync.floor()) == Some(floor) {
            return;
        }
        self.navigate(ViewFragment::floor_only(floor), false);
    }

    pub fn marker_clicked(self, id: &str) {
        if self.host_managed {
            host::open_content_info(id);
            return;
        }
        let floor = self.floor.get_untracked();
        self.navigate(ViewFragment::with_content(floor, id), false);
    }

    /// Dismiss the panel, leaving only the floor in the fragment.
    pub fn close_panel(self) {
        if self.panel.with_untracked(Option::is_none) {
            return;
        }
        if self.host_managed {
            let mut sync = self.sync.get_value();
            sync.close_panel();
            self.sync.set_value(sync);
            self.panel.set(None);
            return;
        }
        self.navigate(ViewFragment::floor_only(self.floor.get_untracked()), false);
    }

    pub fn set_user_location(self, lat: f64, lng: f64, floor: Floor, center: bool, show_floor: bool) {
        let position = LatLng::new(lat, lng);
        if !BUILDING_BOUNDS.contains(position) {
            tracing::debug!(lat, lng, "user outside the building");
            self.markers.update(MarkerRegistry::clear_user);
            self.my_location_visible.set(false);
            return;
        }

        self.markers.update(|markers| markers.set_user(position, floor));
        if show_floor {
            self.show_floor(floor);
        }
        if center {
            self.viewport.update(|vp| vp.center = position);
        }
        self.my_location_visible.set(true);
    }

    pub fn show_location_by_id(self, id: &str) {
        let Some(location) = locations::find(id) else {
            tracing::warn!(id, "no location with this id");
            return;
        };
        let user = self.markers.with_untracked(MarkerRegistry::user);
        self.viewport.update(|vp| match user {
            Some(user) => vp.fit_bounds(LatLngBounds::spanning(location.position, user.position)),
            None => vp.set_view(location.position, FOCUS_ZOOM),
        });
        self.show_floor(location.floor);
    }

    /// My-location control: recenter on the user and show their floor.
    pub fn center_on_user(self) {
        let Some(user) = self.markers.with_untracked(MarkerRegistry::user) else {
            return;
        };
        self.viewport.update(|vp| vp.center = user.position);
        self.show_floor(user.floor);
    }

    pub fn zoom_by(self, steps: i32) {
        self.viewport.update(|vp| {
            let (cx, cy) = (vp.width / 2.0, vp.height / 2.0);
            vp.zoom_at(steps, cx, cy);
        });
    }

    /// First tiles are on screen: reveal floor switching and tell the host.
    pub fn tiles_loaded(self) {
        tracing::info!("map tiles loaded");
        self.toolbox_enabled.set(true);
        host::notify_map_ready();
    }

    /// New content re-runs the fragment so a panel waiting on it can open.
    pub fn apply_feed(self, kind: FeedKind, payload: &str) {
        if self.store_feed(&local_cache(), kind, payload) && !self.host_managed {
            self.check_hash(true);
        }
    }

    /// Returns whether the in-memory set was replaced.
    fn store_feed<S: KeyValueStore>(
        self,
        cache: &LocalCache<S>,
        kind: FeedKind,
        payload: &str,
    ) -> bool {
        let mut content = self.content.get_value();
        match content.apply_feed(cache, kind, payload) {
            Ok(outcome) => {
                self.content.set_value(content);
                matches!(outcome, FeedOutcome::Replaced { .. })
            }
            Err(error) => {
                tracing::warn!(feed = %kind, %error, "discarding feed payload");
                false
            }
        }
    }

    pub fn current_view(self) -> ViewFragment {
        self.sync
            .with_value(ViewStateSync::fragment)
            .unwrap_or_else(|| ViewFragment::floor_only(self.floor.get_untracked()))
    }
}

#[cfg(test)]
mod tests {
    use venue_map_shared::cache::NoStore;

    use super::*;

    // Host-managed controllers never touch `location`, so they run off-browser.
    fn hosted() -> MapController {
        let controller = MapController::new(true, false);
        controller.navigate(ViewFragment::floor_only(Floor::One), true);
        controller
    }

    #[test]
    fn position_outside_building_hides_marker_and_control() {
        let controller = hosted();
        controller.set_user_location(37.7832, -122.4040, Floor::Two, false, false);
        assert!(controller.my_location_visible.get_untracked());
        assert!(controller.markers.with_untracked(|m| m.user().is_some()));

        controller.set_user_location(40.7128, -74.0060, Floor::Two, false, false);
        assert!(!controller.my_location_visible.get_untracked());
        assert!(controller.markers.with_untracked(|m| m.user().is_none()));
    }

    #[test]
    fn user_location_can_switch_floor_and_recenter() {
        let controller = hosted();
        let position = LatLng::new(37.7832, -122.4040);
        controller.set_user_location(position.lat, position.lng, Floor::Three, true, true);
        assert_eq!(controller.floor.get_untracked(), Floor::Three);
        assert_eq!(controller.viewport.with_untracked(|vp| vp.center), position);
        assert_eq!(
            controller.markers.with_untracked(|m| m.attached_floor()),
            Some(Floor::Three)
        );
    }

    #[test]
    fn show_location_by_id_focuses_its_floor() {
        let controller = hosted();
        controller.show_location_by_id("officehours");
        assert_eq!(controller.floor.get_untracked(), Floor::Three);
        let (center, zoom) = controller.viewport.with_untracked(|vp| (vp.center, vp.zoom));
        assert_eq!(zoom, FOCUS_ZOOM);
        assert_eq!(Some(center), locations::find("officehours").map(|l| l.position));
    }

    #[test]
    fn show_location_by_id_frames_user_too() {
        let controller = hosted();
        controller.set_user_location(37.7800, -122.4070, Floor::One, false, false);
        controller.show_location_by_id("3");
        let vp = controller.viewport.get_untracked();
        assert!(vp.zoom < FOCUS_ZOOM);
        assert_eq!(controller.floor.get_untracked(), Floor::Two);
    }

    #[test]
    fn unknown_location_changes_nothing() {
        let controller = hosted();
        let before = controller.viewport.get_untracked();
        controller.show_location_by_id("nowhere");
        assert_eq!(controller.viewport.get_untracked(), before);
        assert_eq!(controller.floor.get_untracked(), Floor::One);
    }

    fn sessions_payload(date: &str) -> String {
        let row = |time: &str, title: &str| {
            serde_json::json!({
                "gsx$sessiondate": { "$t": date },
                "gsx$sessiontime": { "$t": time },
                "gsx$room": { "$t": "3" },
                "gsx$sessiontitle": { "$t": title },
                "gsx$sessionlink": { "$t": title.to_lowercase() }
            })
        };
        serde_json::json!({
            "feed": {
                "updated": { "$t": "t1" },
                "entry": [row("2:30pm-3:30pm", "Afternoon"), row("9:00am-10:00am", "Morning")]
            }
        })
        .to_string()
    }

    #[test]
    fn pending_room_panel_opens_once_sessions_arrive() {
        let controller = MapController::new(false, false);
        controller.evaluate("#level2:3", false);
        assert_eq!(controller.floor.get_untracked(), Floor::Two);
        assert!(controller.panel.with_untracked(Option::is_none));

        let date = match today() {
            ConferenceDay::May19 => "May 19",
            ConferenceDay::May20 => "May 20",
        };
        let cache = LocalCache::new(NoStore);
        assert!(controller.store_feed(&cache, FeedKind::Sessions, &sessions_payload(date)));
        controller.evaluate("#level2:3", true);

        let panel = controller.panel.get_untracked().unwrap();
        assert_eq!(panel.location_id, "3");
        let titles: Vec<&str> = panel.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Morning", "Afternoon"]);
    }

    #[test]
    fn broken_feed_leaves_content_alone() {
        let controller = MapController::new(false, false);
        let cache = LocalCache::new(NoStore);
        assert!(!controller.store_feed(&cache, FeedKind::Sessions, "not json"));
        controller.evaluate("#level2:3", true);
        assert!(controller.panel.with_untracked(Option::is_none));
    }

    #[test]
    fn current_view_reports_active_floor() {
        let controller = hosted();
        controller.show_floor(Floor::Two);
        assert_eq!(controller.current_view(), ViewFragment::floor_only(Floor::Two));
    }
}
