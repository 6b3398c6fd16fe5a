//! Deployment constants. A few can be overridden from the page query string
//! (`?feedKey=`, `?tiles=`, `?log=`) for staging and debugging.

use venue_map_shared::FeedKind;
use venue_map_shared::tiles::DEFAULT_TILE_BASE_URL;

pub const FEED_BASE_URL: &str = "https://spreadsheets.google.com";
pub const DEFAULT_SPREADSHEET_KEY: &str = "t0bDxnEqbFO4XuYpkA070Nw";
pub const SESSION_BASE_URL: &str = "http://code.google.com/events/io/2010/sessions/";
pub const MARKER_IMAGE_BASE: &str = "images/";

/// Name of the optional embedding object on `window`.
pub const HOST_OBJECT: &str = "MAP_CONTAINER";

pub const HASH_POLL_MS: u32 = 100;
pub const DEFAULT_ZOOM: u8 = 18;
/// Zoom used by show-location-by-id.
pub const FOCUS_ZOOM: u8 = 20;
pub const TILE_CONCURRENCY: usize = 6;
pub const DEFAULT_LOG_FILTER: &str = "info";

fn query_param(name: &str) -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get(name).filter(|value| !value.trim().is_empty())
}

pub fn spreadsheet_key() -> String {
    query_param("feedKey").unwrap_or_else(|| DEFAULT_SPREADSHEET_KEY.to_string())
}

pub fn tile_base_url() -> String {
    query_param("tiles").unwrap_or_else(|| DEFAULT_TILE_BASE_URL.to_string())
}

pub fn log_filter() -> String {
    query_param("log").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

pub fn feed_url(kind: FeedKind) -> String {
    build_feed_url(FEED_BASE_URL, &spreadsheet_key(), kind)
}

/// Public list feed for one worksheet, as JSON.
pub fn build_feed_url(base: &str, key: &str, kind: FeedKind) -> String {
    format!(
        "{}/feeds/list/{key}/{}/public/values?alt=json",
        base.trim_end_matches('/'),
        kind.worksheet()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_urls_target_each_worksheet() {
        assert_eq!(
            build_feed_url("https://sheets.test/", "abc", FeedKind::Sessions),
            "https://sheets.test/feeds/list/abc/od6/public/values?alt=json"
        );
        assert_eq!(
            build_feed_url("https://sheets.test", "abc", FeedKind::Sandbox),
            "https://sheets.test/feeds/list/abc/od5/public/values?alt=json"
        );
    }
}
