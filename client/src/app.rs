use std::cell::RefCell;
use std::collections::HashMap;

use leptos::prelude::*;
use venue_map_shared::Floor;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::canvas::MapCanvas;
use crate::controller::MapController;
use crate::host;
use crate::icons::{self, MarkerImages};
use crate::markers::MarkerRegistry;
use crate::panel::InfoPanel;
use crate::tiles::TileImages;
use crate::toolbox::Toolbox;

struct KeydownBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

fn clear_keydown_binding() {
    KEYDOWN_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.window.remove_event_listener_with_callback(
                "keydown",
                old._handler.as_ref().unchecked_ref(),
            );
        }
    });
}

/// Phones and tablets get the docked panel and tap-to-close behaviour.
fn is_mobile_agent() -> bool {
    let ua = web_sys::window()
        .and_then(|w| w.navigator().user_agent().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    ua.contains("android") || ua.contains("iphone") || ua.contains("ipad") || ua.contains("mobile")
}

/// Root component. Builds the controller, shares it through context and
/// boots the map once mounted.
#[component]
pub fn App() -> impl IntoView {
    let controller = MapController::new(host::has_host(), is_mobile_agent());
    let tile_images: RwSignal<TileImages> = RwSignal::new(HashMap::new());
    let marker_images: RwSignal<MarkerImages> = RwSignal::new(HashMap::new());

    provide_context(controller);
    provide_context(tile_images);
    provide_context(marker_images);
    host::register(controller);

    Effect::new(move || {
        let sources = controller.markers.with_untracked(MarkerRegistry::icon_sources);
        icons::load_marker_images(sources, marker_images);
        controller.start();
        on_cleanup(move || {
            controller.stop();
            host::unregister();
        });
    });

    // Keyboard shortcuts
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        clear_keydown_binding();

        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                let target_tag = e
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
                    .map(|el| el.tag_name())
                    .unwrap_or_default();
                if target_tag == "INPUT" || target_tag == "TEXTAREA" {
                    return;
                }

                match e.key().as_str() {
                    "Escape" => controller.close_panel(),
                    "+" | "=" => controller.zoom_by(1),
                    "-" | "_" => controller.zoom_by(-1),
                    key => {
                        if let Some(floor) = key.parse::<u8>().ok().and_then(Floor::from_number) {
                            controller.show_floor(floor);
                        }
                    }
                }
            });
        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_err()
        {
            return;
        }
        KEYDOWN_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(KeydownBinding {
                window: window.clone(),
                _handler: handler,
            });
        });
    });
    on_cleanup(clear_keydown_binding);

    view! {
        <div class="venue-map" style="position: relative; width: 100%; height: 100%; overflow: hidden;">
            <MapCanvas />
            <Toolbox />
            <InfoPanel />
        </div>
    }
}
