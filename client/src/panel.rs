use leptos::prelude::*;
use venue_map_shared::locations;
use venue_map_shared::{PanelContent, PanelEntry};

use crate::controller::MapController;
use crate::markers::MARKER_ANCHOR;

const PANEL_MAX_WIDTH: f64 = 330.0;

fn entry_view(entry: PanelEntry) -> impl IntoView {
    let PanelEntry {
        time,
        title,
        href,
        details,
    } = entry;
    let title = match href {
        Some(href) => view! {
            <a class="info-entry-title" href=href target="_blank">{title}</a>
        }
        .into_any(),
        None => view! { <span class="info-entry-title">{title}</span> }.into_any(),
    };
    view! {
        <li class="info-entry">
            {(!time.is_empty()).then(|| view! { <span class="info-entry-time">{time}</span> })}
            {title}
            {details
                .into_iter()
                .map(|line| view! { <div class="info-entry-detail">{line}</div> })
                .collect_view()}
        </li>
    }
}

fn content_view(content: PanelContent) -> impl IntoView {
    let PanelContent {
        heading,
        category,
        entries,
        ..
    } = content;
    view! {
        <h3 class="info-heading">{heading}</h3>
        <ul class=format!("info-entries {}", category.as_str())>
            {entries.into_iter().map(entry_view).collect_view()}
        </ul>
    }
}

/// Info panel anchored above the open location's marker. On mobile layouts it
/// docks to the bottom of the map instead.
#[component]
pub fn InfoPanel() -> impl IntoView {
    let controller: MapController = expect_context();
    let mobile = controller.is_mobile();

    let style = move || {
        if mobile {
            return "position:absolute;left:8px;right:8px;bottom:8px;max-height:50%;overflow-y:auto;"
                .to_string();
        }
        let anchor = controller
            .panel
            .with(|panel| panel.as_ref().and_then(|p| locations::find(&p.location_id)))
            .map(|location| controller.viewport.with(|vp| vp.world_to_screen(location.position)));
        let Some((x, y)) = anchor else {
            return "display:none;".to_string();
        };
        format!(
            "position:absolute;left:{x:.0}px;top:{:.0}px;transform:translate(-50%, -100%);max-width:{PANEL_MAX_WIDTH}px;",
            y - MARKER_ANCHOR.1 - 6.0
        )
    };

    view! {
        <Show when=move || controller.panel.with(Option::is_some)>
            <div class="info-panel" class:mobile=mobile style=style>
                <button
                    class="info-panel-close"
                    title="Close"
                    on:click=move |_| controller.close_panel()
                >
                    "×"
                </button>
                {move || controller.panel.get().map(content_view)}
            </div>
        </Show>
    }
}
