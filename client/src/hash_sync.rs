use std::cell::RefCell;

use gloo_timers::callback::Interval;
use venue_map_shared::ViewFragment;

use crate::config::HASH_POLL_MS;
use crate::controller::MapController;

thread_local! {
    static HASH_POLL: RefCell<Option<Interval>> = const { RefCell::new(None) };
}

/// Current `location.hash`, including the leading `#`.
pub fn read_hash() -> String {
    web_sys::window()
        .and_then(|window| window.location().hash().ok())
        .unwrap_or_default()
}

pub fn write_hash(fragment: &ViewFragment) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(error) = window.location().set_hash(&fragment.to_string()) {
        tracing::warn!(%fragment, ?error, "failed to write location hash");
    }
}

/// Poll the fragment for back/forward and hand-edited URLs. Writes made by the
/// map itself are checked immediately, so polls do not see them as changes.
pub fn start(controller: MapController) {
    stop();
    controller.check_hash(false);
    let interval = Interval::new(HASH_POLL_MS, move || controller.check_hash(false));
    HASH_POLL.with(|slot| *slot.borrow_mut() = Some(interval));
}

pub fn stop() {
    // Dropping the interval cancels it.
    HASH_POLL.with(|slot| slot.borrow_mut().take());
}
