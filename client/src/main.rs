mod app;
mod canvas;
mod config;
mod controller;
mod feed_loader;
mod hash_sync;
mod host;
mod icons;
mod logging;
mod markers;
mod panel;
mod render_loop;
mod storage;
mod tiles;
mod toolbox;
mod viewport;

use leptos::mount::mount_to;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn main() {
    console_error_panic_hook::set_once();
    logging::init(&config::log_filter());

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let mount_target = document
        .get_element_by_id("map-canvas")
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .or_else(|| document.body());
    let Some(target) = mount_target else {
        tracing::error!("no element to mount the map into");
        return;
    };

    APP_MOUNT_HANDLE.with(move |slot| {
        // Re-entry drops the previous mount so its effects stop.
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, app::App);
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
