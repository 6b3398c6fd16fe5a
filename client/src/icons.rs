use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use web_sys::HtmlImageElement;

/// Decoded marker images keyed by their `src`.
pub type MarkerImages = HashMap<String, HtmlImageElement>;

static ICON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_icon_once(src: &str, detail: &str) {
    if ICON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        tracing::warn!(src, detail, "marker icon unavailable, drawing fallback");
    }
}

/// Load every marker icon. Images appear in `signal` as they decode; a missing
/// icon leaves its marker drawn as a plain pin.
pub fn load_marker_images(sources: Vec<String>, signal: RwSignal<MarkerImages>) {
    for src in sources {
        wasm_bindgen_futures::spawn_local(async move {
            let Ok(image) = HtmlImageElement::new() else {
                warn_icon_once(&src, "could not create image element");
                return;
            };
            image.set_src(&src);
            match wasm_bindgen_futures::JsFuture::from(image.decode()).await {
                Ok(_) => signal.update(|images| {
                    images.insert(src, image);
                }),
                Err(err) => warn_icon_once(&src, &format!("{err:?}")),
            }
        });
    }
}
