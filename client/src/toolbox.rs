use leptos::prelude::*;
use venue_map_shared::Floor;

use crate::controller::MapController;

/// Floor buttons and the my-location control. Hidden until the first tiles
/// load; the my-location button only shows while the user is in the building.
#[component]
pub fn Toolbox() -> impl IntoView {
    let controller: MapController = expect_context();

    let floor_button = move |floor: Floor| {
        view! {
            <button
                id=floor.button_id()
                class="level-button"
                class:selected=move || controller.floor.get() == floor
                on:click=move |_| controller.show_floor(floor)
            >
                {format!("Level {floor}")}
            </button>
        }
    };

    view! {
        <div class="map-toolbox" class:hidden=move || !controller.toolbox_enabled.get()>
            {Floor::ALL.into_iter().map(floor_button).collect_view()}
            <button
                id="my-location"
                class="my-location-button"
                class:hidden=move || !controller.my_location_visible.get()
                title="Show my location"
                on:click=move |_| controller.center_on_user()
            >
                "My location"
            </button>
        </div>
    }
}
