use venue_map_shared::FeedKind;
use wasm_bindgen_futures::spawn_local;

use crate::config;
use crate::controller::MapController;

/// Fetch one feed's raw JSON.
pub async fn fetch_feed(url: &str) -> Result<String, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.text().await.map_err(|e| format!("read error: {e}"))
}

/// Request both feeds concurrently. Each result is applied as it arrives; a
/// failure is logged and leaves cached content in place.
pub fn load_feeds(controller: MapController) {
    for kind in FeedKind::ALL {
        spawn_local(async move {
            let url = config::feed_url(kind);
            match fetch_feed(&url).await {
                Ok(payload) => controller.apply_feed(kind, &payload),
                Err(error) => tracing::warn!(feed = %kind, %url, %error, "feed request failed"),
            }
        });
    }
}
