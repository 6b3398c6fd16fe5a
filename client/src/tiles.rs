#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use js_sys::Reflect;
use leptos::prelude::*;
use venue_map_shared::geo::{TILE_SIZE, to_world_px};
use venue_map_shared::{Floor, TileKey};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

use crate::config::TILE_CONCURRENCY;
use crate::viewport::Viewport;

const ONLOAD_HANDLE_KEY: &str = "__venueTileOnload";
const ONERROR_HANDLE_KEY: &str = "__venueTileOnerror";

pub type IdleCallback = Rc<dyn Fn()>;

/// Decoded overlay images keyed by [`TileKey::image_key`].
pub type TileImages = HashMap<TileKey, HtmlImageElement>;

/// Overlay tiles covering the viewport for `floor`, nearest to the center
/// first. Tiles outside the overlay's coverage are left out.
pub fn wanted_tiles(vp: &Viewport, floor: Floor, base_url: &str) -> Vec<(TileKey, String)> {
    let (cx, cy) = to_world_px(vp.center, vp.zoom);
    let mut wanted: Vec<(TileKey, String)> = vp
        .visible_tiles()
        .into_iter()
        .filter_map(|(x, y)| {
            let key = TileKey {
                floor,
                zoom: vp.zoom,
                x,
                y,
            }
            .image_key();
            key.url(base_url).map(|url| (key, url))
        })
        .collect();

    let distance_sq = |key: &TileKey| {
        let dx = (key.x as f64 + 0.5) * TILE_SIZE - cx;
        let dy = (key.y as f64 + 0.5) * TILE_SIZE - cy;
        dx * dx + dy * dy
    };
    wanted.sort_by(|(a, _), (b, _)| distance_sq(a).total_cmp(&distance_sq(b)));
    wanted
}

/// Loads overlay tiles with bounded concurrency and publishes decoded images
/// into a signal. A failed tile is not retried.
pub struct TileLayer {
    base_url: String,
    tiles: RwSignal<TileImages>,
    queue: RefCell<VecDeque<(TileKey, String)>>,
    requested: RefCell<HashSet<TileKey>>,
    in_flight: Cell<usize>,
    on_idle: RefCell<Option<IdleCallback>>,
}

impl TileLayer {
    pub fn new(base_url: String, tiles: RwSignal<TileImages>) -> Rc<Self> {
        Rc::new(Self {
            base_url,
            tiles,
            queue: RefCell::new(VecDeque::new()),
            requested: RefCell::new(HashSet::new()),
            in_flight: Cell::new(0),
            on_idle: RefCell::new(None),
        })
    }

    /// Run `callback` once, the first time the queue drains.
    pub fn on_first_idle(&self, callback: IdleCallback) {
        *self.on_idle.borrow_mut() = Some(callback);
    }

    /// Queue whatever the viewport shows that has not been requested yet.
    /// Queued tiles no longer on screen (panned away, other floor) are dropped.
    pub fn request(self: &Rc<Self>, vp: &Viewport, floor: Floor) {
        let wanted = wanted_tiles(vp, floor, &self.base_url);
        let wanted_keys: HashSet<TileKey> = wanted.iter().map(|(key, _)| *key).collect();
        {
            let mut queue = self.queue.borrow_mut();
            let mut requested = self.requested.borrow_mut();
            queue.retain(|(key, _)| {
                let keep = wanted_keys.contains(key);
                if !keep {
                    requested.remove(key);
                }
                keep
            });
            for (key, url) in wanted {
                if requested.insert(key) {
                    queue.push_back((key, url));
                }
            }
        }
        self.pump();
    }

    fn pump(self: &Rc<Self>) {
        while self.in_flight.get() < TILE_CONCURRENCY {
            let Some((key, url)) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            self.in_flight.set(self.in_flight.get() + 1);
            self.load(key, &url);
        }

        if self.queue.borrow().is_empty()
            && self.in_flight.get() == 0
            && let Some(callback) = self.on_idle.borrow_mut().take()
        {
            callback();
        }
    }

    fn finish(self: &Rc<Self>) {
        self.in_flight.set(self.in_flight.get().saturating_sub(1));
        self.pump();
    }

    fn load(self: &Rc<Self>, key: TileKey, src: &str) {
        let img = match HtmlImageElement::new() {
            Ok(img) => img,
            Err(_) => {
                self.finish();
                return;
            }
        };

        let img_for_load = img.clone();
        let layer_load = self.clone();
        let onload = Closure::<dyn FnMut()>::new(move || {
            clear_image_handlers(&img_for_load);

            let img_for_decode = img_for_load.clone();
            let layer = layer_load.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let _ = JsFuture::from(img_for_decode.decode()).await;
                layer.tiles.update(|tiles| {
                    tiles.insert(key, img_for_decode);
                });
                layer.finish();
            });
        });

        let img_for_error = img.clone();
        let layer_error = self.clone();
        let src_for_error = src.to_string();
        let onerror = Closure::<dyn FnMut()>::new(move || {
            clear_image_handlers(&img_for_error);
            tracing::debug!(src = %src_for_error, "tile failed to load");
            layer_error.finish();
        });

        let onload_js = onload.into_js_value();
        let onerror_js = onerror.into_js_value();
        img.set_onload(Some(onload_js.unchecked_ref()));
        img.set_onerror(Some(onerror_js.unchecked_ref()));
        let _ = Reflect::set(
            img.as_ref(),
            &JsValue::from_str(ONLOAD_HANDLE_KEY),
            &onload_js,
        );
        let _ = Reflect::set(
            img.as_ref(),
            &JsValue::from_str(ONERROR_HANDLE_KEY),
            &onerror_js,
        );
        img.set_src(src);
    }
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}
