use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use leptos::prelude::*;
use venue_map_shared::geo::TILE_SIZE;
use venue_map_shared::{Floor, TileKey};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, PointerEvent, TouchEvent, WheelEvent,
};

use crate::config;
use crate::controller::MapController;
use crate::icons::MarkerImages;
use crate::markers::{
    MARKER_ANCHOR, MARKER_SIZE, MarkerRegistry, USER_MARKER_SIZE, UserIcon, shadow_src,
};
use crate::render_loop::FrameScheduler;
use crate::tiles::{TileImages, TileLayer};
use crate::viewport::Viewport;

const BACKGROUND: &str = "#e5e3df";
/// Pointer travel below this still counts as a click.
const CLICK_SLOP_PX: f64 = 5.0;
/// Accumulated wheel delta (pixels) per zoom level.
const WHEEL_STEP: f64 = 120.0;
const WHEEL_LINE_PX: f64 = 40.0;
/// Pinch distance ratio per zoom level.
const PINCH_STEP: f64 = 1.6;

struct ResizeBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn clear_resize_binding() {
    RESIZE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old
                .window
                .remove_event_listener_with_callback("resize", old._handler.as_ref().unchecked_ref());
        }
    });
}

struct SceneInput<'a> {
    ctx: &'a CanvasRenderingContext2d,
    w: f64,
    h: f64,
    vp: &'a Viewport,
    floor: Floor,
    tiles: &'a TileImages,
    markers: &'a MarkerRegistry,
    icons: &'a MarkerImages,
}

fn render_scene(input: SceneInput<'_>) {
    let SceneInput {
        ctx,
        w,
        h,
        vp,
        floor,
        tiles,
        markers,
        icons,
    } = input;

    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);

    for (x, y) in vp.visible_tiles() {
        let key = TileKey {
            floor,
            zoom: vp.zoom,
            x,
            y,
        }
        .image_key();
        let Some(image) = tiles.get(&key) else {
            continue;
        };
        let (sx, sy) = vp.tile_screen_origin(x, y);
        // Whole pixels plus one so neighbouring tiles overlap instead of seaming.
        ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            sx.floor(),
            sy.floor(),
            TILE_SIZE + 1.0,
            TILE_SIZE + 1.0,
        )
        .ok();
    }

    let shadow = icons.get(&shadow_src());
    for marker in markers.attached() {
        let (mx, my) = vp.world_to_screen(marker.location.position);
        let left = (mx - MARKER_ANCHOR.0).round();
        let top = (my - MARKER_ANCHOR.1).round();
        if left + MARKER_SIZE.0 < 0.0 || top + MARKER_SIZE.1 < 0.0 || left > w || top > h {
            continue;
        }
        if let Some(shadow) = shadow {
            ctx.draw_image_with_html_image_element_and_dw_and_dh(
                shadow,
                left,
                top,
                MARKER_SIZE.0,
                MARKER_SIZE.1,
            )
            .ok();
        }
        match icons.get(&marker.icon_src) {
            Some(icon) => {
                ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    icon,
                    left,
                    top,
                    MARKER_SIZE.0,
                    MARKER_SIZE.1,
                )
                .ok();
            }
            None => draw_fallback_pin(ctx, mx, my),
        }
    }

    if let (Some(user), Some(icon)) = (markers.user(), markers.user_icon()) {
        let (ux, uy) = vp.world_to_screen(user.position);
        let half = USER_MARKER_SIZE / 2.0;
        match icons.get(&icon.src()) {
            Some(image) => {
                ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    image,
                    (ux - half).round(),
                    (uy - half).round(),
                    USER_MARKER_SIZE,
                    USER_MARKER_SIZE,
                )
                .ok();
            }
            None => {
                let color = match icon {
                    UserIcon::Here => "#3b78e7",
                    UserIcon::Elsewhere => "#9e9e9e",
                };
                ctx.begin_path();
                ctx.arc(ux, uy, half - 1.0, 0.0, TAU).ok();
                ctx.set_fill_style_str(color);
                ctx.fill();
            }
        }
    }
}

fn draw_fallback_pin(ctx: &CanvasRenderingContext2d, x: f64, y: f64) {
    ctx.begin_path();
    ctx.arc(x, y - 14.0, 7.0, 0.0, TAU).ok();
    ctx.set_fill_style_str("#d64937");
    ctx.fill();
    ctx.set_stroke_style_str("#ffffff");
    ctx.stroke();
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, e: &MouseEvent) -> (f64, f64) {
    canvas_ref
        .get_untracked()
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            (
                e.client_x() as f64 - rect.left(),
                e.client_y() as f64 - rect.top(),
            )
        })
        .unwrap_or((e.offset_x() as f64, e.offset_y() as f64))
}

fn hit_marker(controller: MapController, sx: f64, sy: f64) -> Option<(&'static str, &'static str)> {
    controller.viewport.with_untracked(|vp| {
        controller.markers.with_untracked(|markers| {
            markers
                .hit_test(sx, sy, |p| vp.world_to_screen(p))
                .map(|m| (m.id(), m.title()))
        })
    })
}

fn touch_distance(e: &TouchEvent) -> Option<(f64, f64, f64)> {
    let touches = e.touches();
    if touches.length() != 2 {
        return None;
    }
    let (t0, t1) = (touches.get(0)?, touches.get(1)?);
    let dx = (t1.client_x() - t0.client_x()) as f64;
    let dy = (t1.client_y() - t0.client_y()) as f64;
    let mid_x = (t0.client_x() + t1.client_x()) as f64 / 2.0;
    let mid_y = (t0.client_y() + t1.client_y()) as f64 / 2.0;
    Some(((dx * dx + dy * dy).sqrt(), mid_x, mid_y))
}

/// Map surface: overlay tiles, markers and the user position on a 2D canvas,
/// with drag to pan, wheel/pinch/double-click to zoom, and marker clicks.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let controller: MapController = expect_context();
    let tile_images: RwSignal<TileImages> = expect_context();
    let marker_images: RwSignal<MarkerImages> = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let tile_layer = TileLayer::new(config::tile_base_url(), tile_images);
    tile_layer.on_first_idle(Rc::new(move || controller.tiles_loaded()));

    // Drag state
    let is_dragging = Rc::new(Cell::new(false));
    let drag_start_x = Rc::new(Cell::new(0.0f64));
    let drag_start_y = Rc::new(Cell::new(0.0f64));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));

    let wheel_acc = Rc::new(Cell::new(0.0f64));
    // Pinch distance at the last zoom step; 0 when no pinch is active.
    let pinch_base = Rc::new(Cell::new(0.0f64));

    // Cached 2D context (invalidated on canvas resize)
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let scheduler = Rc::new(FrameScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let Some(parent) = canvas.parent_element() else {
            return;
        };
        let w = parent.client_width() as f64;
        let h = parent.client_height() as f64;
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        let dpr = web_sys::window()
            .map(|window| window.device_pixel_ratio())
            .unwrap_or(1.0)
            .max(1.0);
        let pw = (w * dpr).round() as u32;
        let ph = (h * dpr).round() as u32;
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
            // Resizing resets 2D context state
            *cached_ctx.borrow_mut() = None;
        }

        let resized = controller
            .viewport
            .with_untracked(|vp| vp.width != w || vp.height != h);
        if resized {
            // The viewport effect schedules the next frame.
            controller.viewport.update(|vp| vp.resize(w, h));
            return;
        }

        let ctx = {
            let mut ctx_cache = cached_ctx.borrow_mut();
            if ctx_cache.is_none() {
                let Some(ctx) = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
                else {
                    return;
                };
                // Draw in CSS pixels
                ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
                *ctx_cache = Some(ctx);
            }
            let Some(ctx) = ctx_cache.clone() else {
                return;
            };
            ctx
        };

        let floor = controller.floor.get_untracked();
        controller.viewport.with_untracked(|vp| {
            tile_images.with_untracked(|tiles| {
                marker_images.with_untracked(|icons| {
                    controller.markers.with_untracked(|markers| {
                        render_scene(SceneInput {
                            ctx: &ctx,
                            w,
                            h,
                            vp,
                            floor,
                            tiles,
                            markers,
                            icons,
                        });
                    });
                });
            });
        });
    }));

    // Repaint whenever anything on screen changes
    Effect::new({
        let scheduler = scheduler.clone();
        move || {
            let _ = canvas_ref.get();
            controller.viewport.track();
            controller.floor.track();
            controller.markers.track();
            tile_images.track();
            marker_images.track();
            scheduler.mark_dirty();
        }
    });

    // Load the tiles the view needs on the active floor
    Effect::new({
        let tile_layer = tile_layer.clone();
        move || {
            let floor = controller.floor.get();
            controller.viewport.with(|vp| tile_layer.request(vp, floor));
        }
    });

    // Window resizes change the container size; the next frame picks it up.
    Effect::new({
        let scheduler = scheduler.clone();
        move || {
            let Some(window) = web_sys::window() else {
                return;
            };
            clear_resize_binding();

            let scheduler = scheduler.clone();
            let handler = Closure::<dyn Fn()>::new(move || scheduler.mark_dirty());
            if window
                .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
                .is_err()
            {
                return;
            }
            RESIZE_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(ResizeBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });
    on_cleanup(clear_resize_binding);

    let on_wheel = {
        let wheel_acc = wheel_acc.clone();
        move |e: WheelEvent| {
            e.prevent_default();
            let delta = match e.delta_mode() {
                WheelEvent::DOM_DELTA_LINE => e.delta_y() * WHEEL_LINE_PX,
                _ => e.delta_y(),
            };
            let acc = wheel_acc.get() + delta;
            if acc.abs() < WHEEL_STEP {
                wheel_acc.set(acc);
                return;
            }
            wheel_acc.set(0.0);
            let steps = if acc > 0.0 { -1 } else { 1 };
            let (x, y) = local_point(canvas_ref, &e);
            controller.viewport.update(|vp| {
                vp.zoom_at(steps, x, y);
            });
        }
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let drag_start_x = drag_start_x.clone();
        let drag_start_y = drag_start_y.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            is_dragging.set(true);
            drag_start_x.set(e.client_x() as f64);
            drag_start_y.set(e.client_y() as f64);
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            if is_dragging.get() {
                let dx = e.client_x() as f64 - last_x.get();
                let dy = e.client_y() as f64 - last_y.get();
                last_x.set(e.client_x() as f64);
                last_y.set(e.client_y() as f64);
                controller.viewport.update(|vp| vp.pan(dx, dy));
                return;
            }

            let Some(canvas) = canvas_ref.get_untracked() else {
                return;
            };
            let (sx, sy) = local_point(canvas_ref, &e);
            let (cursor, title) = match hit_marker(controller, sx, sy) {
                Some((_, title)) => ("pointer", title),
                None => ("grab", ""),
            };
            let el: &web_sys::HtmlElement = &canvas;
            el.style().set_property("cursor", cursor).ok();
            if el.title() != title {
                el.set_title(title);
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
        }
    };

    let on_click = {
        let drag_start_x = drag_start_x.clone();
        let drag_start_y = drag_start_y.clone();
        move |e: MouseEvent| {
            let dx = (e.client_x() as f64 - drag_start_x.get()).abs();
            let dy = (e.client_y() as f64 - drag_start_y.get()).abs();
            if dx >= CLICK_SLOP_PX || dy >= CLICK_SLOP_PX {
                return;
            }
            let (sx, sy) = local_point(canvas_ref, &e);
            match hit_marker(controller, sx, sy) {
                Some((id, _)) => controller.marker_clicked(id),
                None if controller.is_mobile() => controller.close_panel(),
                None => {}
            }
        }
    };

    let on_dblclick = move |e: MouseEvent| {
        let (sx, sy) = local_point(canvas_ref, &e);
        controller.viewport.update(|vp| {
            vp.zoom_at(1, sx, sy);
        });
    };

    let on_touch_start = {
        let pinch_base = pinch_base.clone();
        move |e: TouchEvent| {
            if let Some((dist, _, _)) = touch_distance(&e) {
                e.prevent_default();
                pinch_base.set(dist);
            }
        }
    };

    let on_touch_move = {
        let pinch_base = pinch_base.clone();
        let is_dragging = is_dragging.clone();
        move |e: TouchEvent| {
            let Some((dist, mid_x, mid_y)) = touch_distance(&e) else {
                return;
            };
            e.prevent_default();
            // Two fingers zoom; they do not pan.
            is_dragging.set(false);
            let base = pinch_base.get();
            if base <= 0.0 {
                pinch_base.set(dist);
                return;
            }
            let steps = if dist / base >= PINCH_STEP {
                1
            } else if base / dist >= PINCH_STEP {
                -1
            } else {
                return;
            };
            pinch_base.set(dist);
            let (x, y) = canvas_ref
                .get_untracked()
                .map(|el| {
                    let rect = el.get_bounding_client_rect();
                    (mid_x - rect.left(), mid_y - rect.top())
                })
                .unwrap_or((mid_x, mid_y));
            controller.viewport.update(|vp| {
                vp.zoom_at(steps, x, y);
            });
        }
    };

    let on_touch_end = move |_: TouchEvent| pinch_base.set(0.0);

    view! {
        <div
            class="map-surface"
            style="position: absolute; inset: 0; overflow: hidden;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:click=on_click
            on:dblclick=on_dblclick
            on:touchstart=on_touch_start
            on:touchmove=on_touch_move
            on:touchend=on_touch_end
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            />
        </div>
    }
}
