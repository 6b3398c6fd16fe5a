//! Optional embedding host. When `window.MAP_CONTAINER` exists, the host
//! drives navigation through the exported functions below and receives
//! `onMapReady()` / `openContentInfo(id)` calls instead of the map managing
//! the URL fragment itself.

use std::cell::Cell;

use js_sys::{Function, Reflect};
use venue_map_shared::{Floor, ViewFragment};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::config::HOST_OBJECT;
use crate::controller::MapController;

thread_local! {
    static CONTROLLER: Cell<Option<MapController>> = const { Cell::new(None) };
}

fn host_object() -> Option<JsValue> {
    let window = web_sys::window()?;
    let host = Reflect::get(window.as_ref(), &JsValue::from_str(HOST_OBJECT)).ok()?;
    (!host.is_undefined() && !host.is_null()).then_some(host)
}

pub fn has_host() -> bool {
    host_object().is_some()
}

fn call_host(method: &str, arg: Option<JsValue>) {
    let Some(host) = host_object() else {
        return;
    };
    let Some(function) = Reflect::get(&host, &JsValue::from_str(method))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
    else {
        tracing::warn!(method, "host object has no such function");
        return;
    };
    let result = match arg {
        Some(arg) => function.call1(&host, &arg),
        None => function.call0(&host),
    };
    if let Err(error) = result {
        tracing::warn!(method, ?error, "host call failed");
    }
}

pub fn notify_map_ready() {
    call_host("onMapReady", None);
}

pub fn open_content_info(id: &str) {
    call_host("openContentInfo", Some(JsValue::from_str(id)));
}

/// Make `controller` reachable from the exported entry points.
pub fn register(controller: MapController) {
    CONTROLLER.with(|slot| slot.set(Some(controller)));
}

pub fn unregister() {
    CONTROLLER.with(|slot| slot.set(None));
}

fn with_controller<R>(f: impl FnOnce(MapController) -> R) -> Option<R> {
    let controller = CONTROLLER.with(Cell::get);
    if controller.is_none() {
        tracing::warn!("map entry point called before the map was mounted");
    }
    controller.map(f)
}

fn floor_arg(level: u8) -> Option<Floor> {
    let floor = Floor::from_number(level);
    if floor.is_none() {
        tracing::warn!(level, "ignoring unknown floor");
    }
    floor
}

#[wasm_bindgen(js_name = showLevel)]
pub fn show_level(level: u8) {
    if let Some(floor) = floor_arg(level) {
        with_controller(|c| c.show_floor(floor));
    }
}

#[wasm_bindgen(js_name = setUserLocation)]
pub fn set_user_location(
    lat: f64,
    lng: f64,
    level: u8,
    center: Option<bool>,
    show_level: Option<bool>,
) {
    let Some(floor) = floor_arg(level) else {
        return;
    };
    with_controller(|c| {
        c.set_user_location(
            lat,
            lng,
            floor,
            center.unwrap_or(false),
            show_level.unwrap_or(false),
        )
    });
}

#[wasm_bindgen(js_name = showLocationById)]
pub fn show_location_by_id(id: String) {
    with_controller(|c| c.show_location_by_id(&id));
}

/// Current floor and open content id, as `{ floor, content_id }`.
#[wasm_bindgen(js_name = currentView)]
pub fn current_view() -> JsValue {
    let view: Option<ViewFragment> = with_controller(MapController::current_view);
    serde_wasm_bindgen::to_value(&view).unwrap_or(JsValue::NULL)
}
