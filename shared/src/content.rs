use serde::Serialize;

use crate::cache::{KeyValueStore, LocalCache};
use crate::error::FeedError;
use crate::feed::{FeedKind, FeedRow, RawFeed, SandboxItem, SessionItem, parse_rows};
use crate::locations::{Category, Location};
use crate::schedule::{ConferenceDay, office_hours, start_key};

/// Content loaded from the feeds. Each set is replaced wholesale, never
/// patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentStore {
    pub sessions: Option<Vec<SessionItem>>,
    pub sandbox: Option<Vec<SandboxItem>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// Timestamp matched the cached one and cached items exist.
    Unchanged,
    Replaced { items: usize, skipped: usize },
}

impl ContentStore {
    /// Load whatever item sets the cache holds.
    pub fn from_cache<S: KeyValueStore>(cache: &LocalCache<S>) -> Self {
        Self {
            sessions: cache.get_items(FeedKind::Sessions.items_key()),
            sandbox: cache.get_items(FeedKind::Sandbox.items_key()),
        }
    }

    pub fn is_loaded(&self, kind: FeedKind) -> bool {
        match kind {
            FeedKind::Sessions => self.sessions.is_some(),
            FeedKind::Sandbox => self.sandbox.is_some(),
        }
    }

    /// Apply a freshly fetched feed payload.
    pub fn apply_feed<S: KeyValueStore>(
        &mut self,
        cache: &LocalCache<S>,
        kind: FeedKind,
        payload: &str,
    ) -> Result<FeedOutcome, FeedError> {
        let raw = RawFeed::from_json(payload)?;
        Ok(match kind {
            FeedKind::Sessions => replace_if_newer(&mut self.sessions, cache, raw),
            FeedKind::Sandbox => replace_if_newer(&mut self.sandbox, cache, raw),
        })
    }
}

fn replace_if_newer<T: FeedRow, S: KeyValueStore>(
    slot: &mut Option<Vec<T>>,
    cache: &LocalCache<S>,
    raw: RawFeed,
) -> FeedOutcome {
    let kind = T::KIND;
    let last_updated = cache.get_text(kind.updated_key());
    if last_updated.as_deref() == Some(raw.updated.as_str()) {
        // Only a set that still reads back as items counts as cached.
        if slot.is_none() {
            *slot = cache.get_items(kind.items_key());
        }
        if slot.is_some() {
            tracing::debug!(feed = %kind, updated = %raw.updated, "feed unchanged");
            return FeedOutcome::Unchanged;
        }
    }

    let parsed = parse_rows::<T>(raw.rows);
    let outcome = FeedOutcome::Replaced {
        items: parsed.items.len(),
        skipped: parsed.skipped.len(),
    };
    cache.put_items(kind.items_key(), &parsed.items);
    cache.put_text(kind.updated_key(), &raw.updated);
    *slot = Some(parsed.items);
    tracing::info!(feed = %kind, updated = %raw.updated, ?outcome, "feed replaced");
    outcome
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelEntry {
    /// Time range or empty for untimed entries.
    pub time: String,
    pub title: String,
    pub href: Option<String>,
    /// Extra lines under the title (office-hours products).
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelContent {
    pub location_id: String,
    pub heading: String,
    pub category: Category,
    pub entries: Vec<PanelEntry>,
}

/// Compose the info panel for a location. `None` when there is nothing to
/// show, in which case no panel opens.
pub fn panel_for(
    location: &Location,
    day: ConferenceDay,
    content: &ContentStore,
    session_base: &str,
) -> Option<PanelContent> {
    let category = location.category?;
    let title = location.title.unwrap_or(location.id);

    let (heading, entries) = match category {
        Category::Session => {
            let sessions = content.sessions.as_ref()?;
            let mut matching: Vec<&SessionItem> = sessions
                .iter()
                .filter(|s| s.room == location.id && s.day == day)
                .collect();
            matching.sort_by_key(|s| start_key(&s.start));
            let entries: Vec<PanelEntry> = matching
                .into_iter()
                .map(|s| PanelEntry {
                    time: s.session_time.clone(),
                    title: s.title.clone(),
                    href: Some(format!("{session_base}{}.html", s.link)),
                    details: Vec::new(),
                })
                .collect();
            (format!("{title} - {}", day.label()), entries)
        }
        Category::Sandbox => {
            let sandbox = content.sandbox.as_ref()?;
            let entries: Vec<PanelEntry> = sandbox
                .iter()
                .filter(|c| c.pod == location.id)
                .map(|c| PanelEntry {
                    time: String::new(),
                    title: c.company_name.clone(),
                    href: Some(format!("http://{}", c.company_url)),
                    details: Vec::new(),
                })
                .collect();
            (title.to_string(), entries)
        }
        Category::OfficeHours => {
            let entries: Vec<PanelEntry> = office_hours(day)
                .iter()
                .map(|slot| PanelEntry {
                    time: slot.time.to_string(),
                    title: String::new(),
                    href: None,
                    details: slot.products.iter().map(|p| p.to_string()).collect(),
                })
                .collect();
            (format!("Office Hours - {}", day.label()), entries)
        }
    };

    if entries.is_empty() {
        return None;
    }
    Some(PanelContent {
        location_id: location.id.to_string(),
        heading,
        category,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cache::MemoryStore;
    use crate::locations::find;

    const SESSION_BASE: &str = "http://example.test/sessions/";

    fn session_payload(updated: &str, rows: &[(&str, &str, &str, &str)]) -> String {
        let entry: Vec<_> = rows
            .iter()
            .map(|(date, time, room, title)| {
                json!({
                    "gsx$sessiondate": { "$t": date },
                    "gsx$sessiontime": { "$t": time },
                    "gsx$room": { "$t": room },
                    "gsx$sessiontitle": { "$t": title },
                    "gsx$sessionlink": { "$t": title.to_lowercase() }
                })
            })
            .collect();
        json!({ "feed": { "updated": { "$t": updated }, "entry": entry } }).to_string()
    }

    fn sandbox_payload(updated: &str) -> String {
        json!({
            "feed": {
                "updated": { "$t": updated },
                "entry": [{
                    "gsx$companyname": { "$t": "Acme" },
                    "gsx$companyurl": { "$t": "acme.example" },
                    "gsx$companypod": { "$t": "Chrome" }
                }]
            }
        })
        .to_string()
    }

    #[test]
    fn new_feed_replaces_and_persists() {
        let cache = LocalCache::new(MemoryStore::new());
        let mut content = ContentStore::default();
        let payload = session_payload("t1", &[("May 19", "10:00am-11:00am", "3", "A")]);

        let outcome = content
            .apply_feed(&cache, FeedKind::Sessions, &payload)
            .unwrap();
        assert_eq!(outcome, FeedOutcome::Replaced { items: 1, skipped: 0 });
        assert_eq!(cache.get_text("sessionsUpdated").as_deref(), Some("t1"));
        assert_eq!(ContentStore::from_cache(&cache).sessions, content.sessions);
    }

    #[test]
    fn unchanged_timestamp_with_cached_items_is_a_no_op() {
        let cache = LocalCache::new(MemoryStore::new());
        let mut content = ContentStore::default();
        content
            .apply_feed(
                &cache,
                FeedKind::Sessions,
                &session_payload("t1", &[("May 19", "10:00am-11:00am", "3", "A")]),
            )
            .unwrap();
        let before = content.clone();

        let different_rows = session_payload("t1", &[("May 20", "1:00pm-2:00pm", "4", "B")]);
        let outcome = content
            .apply_feed(&cache, FeedKind::Sessions, &different_rows)
            .unwrap();
        assert_eq!(outcome, FeedOutcome::Unchanged);
        assert_eq!(content, before);
    }

    #[test]
    fn matching_timestamp_without_cached_items_still_loads() {
        let store = MemoryStore::new();
        store.set_text("sandboxUpdated", "t1");
        let cache = LocalCache::new(store);
        let mut content = ContentStore::default();

        let outcome = content
            .apply_feed(&cache, FeedKind::Sandbox, &sandbox_payload("t1"))
            .unwrap();
        assert_eq!(outcome, FeedOutcome::Replaced { items: 1, skipped: 0 });
        assert_eq!(content.sandbox.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn cached_rows_in_an_old_shape_do_not_block_the_feed() {
        let store = MemoryStore::new();
        store.set_text("sessionsUpdated", "t1");
        store.set_text("sessions", r#"[{"sessionTitle":"Old format","room":"3"}]"#);
        let cache = LocalCache::new(store);
        let mut content = ContentStore::from_cache(&cache);
        assert!(!content.is_loaded(FeedKind::Sessions));

        let payload = session_payload("t1", &[("May 19", "10:00am-11:00am", "3", "A")]);
        let outcome = content
            .apply_feed(&cache, FeedKind::Sessions, &payload)
            .unwrap();
        assert_eq!(outcome, FeedOutcome::Replaced { items: 1, skipped: 0 });
        assert_eq!(content.sessions.as_ref().map(Vec::len), Some(1));
        assert_eq!(ContentStore::from_cache(&cache).sessions, content.sessions);
    }

    #[test]
    fn unchanged_feed_picks_up_cached_items() {
        let cache = LocalCache::new(MemoryStore::new());
        let payload = session_payload("t1", &[("May 19", "10:00am-11:00am", "3", "A")]);
        ContentStore::default()
            .apply_feed(&cache, FeedKind::Sessions, &payload)
            .unwrap();

        let mut content = ContentStore::default();
        let outcome = content
            .apply_feed(&cache, FeedKind::Sessions, &payload)
            .unwrap();
        assert_eq!(outcome, FeedOutcome::Unchanged);
        assert_eq!(content.sessions.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn broken_envelope_keeps_previous_items() {
        let cache = LocalCache::new(MemoryStore::new());
        let mut content = ContentStore::default();
        content
            .apply_feed(&cache, FeedKind::Sandbox, &sandbox_payload("t1"))
            .unwrap();
        let before = content.clone();

        assert!(content.apply_feed(&cache, FeedKind::Sandbox, "{}").is_err());
        assert_eq!(content, before);
    }

    #[test]
    fn session_panel_lists_room_entries_for_day_sorted() {
        let cache = LocalCache::new(MemoryStore::new());
        let mut content = ContentStore::default();
        let payload = session_payload(
            "t1",
            &[
                ("May 19", "2:30pm-3:30pm", "3", "Later"),
                ("May 19", "10:45am-11:45am", "3", "Earlier"),
                ("May 20", "9:00am-10:00am", "3", "Other day"),
                ("May 19", "11:00am-12:00pm", "4", "Other room"),
            ],
        );
        content
            .apply_feed(&cache, FeedKind::Sessions, &payload)
            .unwrap();

        let room3 = find("3").unwrap();
        let panel = panel_for(room3, ConferenceDay::May19, &content, SESSION_BASE).unwrap();
        assert_eq!(panel.heading, "Room 3 - Wednesday May 19");
        let titles: Vec<&str> = panel.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Earlier", "Later"]);
        assert_eq!(
            panel.entries[0].href.as_deref(),
            Some("http://example.test/sessions/earlier.html")
        );
        assert_eq!(panel.entries[0].time, "10:45am-11:45am");
    }

    #[test]
    fn sandbox_panel_links_companies() {
        let cache = LocalCache::new(MemoryStore::new());
        let mut content = ContentStore::default();
        content
            .apply_feed(&cache, FeedKind::Sandbox, &sandbox_payload("t1"))
            .unwrap();

        let chrome = find("chrome").unwrap();
        let panel = panel_for(chrome, ConferenceDay::May20, &content, SESSION_BASE).unwrap();
        assert_eq!(panel.heading, "Chrome");
        assert_eq!(panel.entries[0].href.as_deref(), Some("http://acme.example"));
    }

    #[test]
    fn office_hours_need_no_feed() {
        let location = find("officehours").unwrap();
        let panel = panel_for(
            location,
            ConferenceDay::May20,
            &ContentStore::default(),
            SESSION_BASE,
        )
        .unwrap();
        assert_eq!(panel.heading, "Office Hours - Thursday May 20");
        assert_eq!(panel.entries.len(), 2);
        assert!(panel.entries[1].details.contains(&"Android".to_string()));
    }

    #[test]
    fn nothing_to_show_means_no_panel() {
        let content = ContentStore::default();
        assert!(panel_for(find("3").unwrap(), ConferenceDay::May19, &content, "").is_none());
        assert!(panel_for(find("pressroom").unwrap(), ConferenceDay::May19, &content, "").is_none());

        let loaded_but_empty = ContentStore {
            sessions: Some(Vec::new()),
            sandbox: Some(Vec::new()),
        };
        assert!(
            panel_for(find("gwt").unwrap(), ConferenceDay::May19, &loaded_but_empty, "").is_none()
        );
    }
}
