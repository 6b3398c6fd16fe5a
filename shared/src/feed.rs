//! Spreadsheet list-feed schemas and row normalization.
//!
//! Each feed row is a flat object of `gsx$<column>: { "$t": text }` cells.
//! Rows are parsed one at a time so a bad row costs only itself.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{FeedError, RowError};
use crate::schedule::ConferenceDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Sessions,
    Sandbox,
}

impl FeedKind {
    pub const ALL: [FeedKind; 2] = [FeedKind::Sessions, FeedKind::Sandbox];

    /// Cache key holding the parsed item list.
    pub const fn items_key(self) -> &'static str {
        match self {
            FeedKind::Sessions => "sessions",
            FeedKind::Sandbox => "sandbox",
        }
    }

    /// Cache key holding the feed's last seen update timestamp.
    pub const fn updated_key(self) -> &'static str {
        match self {
            FeedKind::Sessions => "sessionsUpdated",
            FeedKind::Sandbox => "sandboxUpdated",
        }
    }

    /// Spreadsheet worksheet backing this feed.
    pub const fn worksheet(self) -> &'static str {
        match self {
            FeedKind::Sessions => "od6",
            FeedKind::Sandbox => "od5",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.items_key())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Cell {
    #[serde(rename = "$t", default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    feed: FeedBody,
}

#[derive(Debug, Deserialize)]
struct FeedBody {
    updated: Option<Cell>,
    #[serde(default)]
    entry: Vec<serde_json::Value>,
}

/// A decoded feed: its timestamp and raw rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeed {
    pub updated: String,
    pub rows: Vec<serde_json::Value>,
}

impl RawFeed {
    pub fn from_json(text: &str) -> Result<Self, FeedError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Self::from_envelope(envelope)
    }

    #[cfg(test)]
    pub fn from_value(value: serde_json::Value) -> Result<Self, FeedError> {
        let envelope: Envelope = serde_json::from_value(value)?;
        Self::from_envelope(envelope)
    }

    fn from_envelope(envelope: Envelope) -> Result<Self, FeedError> {
        let updated = envelope
            .feed
            .updated
            .map(|cell| cell.text)
            .filter(|text| !text.is_empty())
            .ok_or(FeedError::MissingTimestamp)?;
        Ok(Self {
            updated,
            rows: envelope.feed.entry,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SessionRow {
    #[serde(rename = "gsx$sessiondate")]
    date: Cell,
    #[serde(rename = "gsx$sessiontime")]
    time: Cell,
    #[serde(rename = "gsx$room")]
    room: Cell,
    #[serde(rename = "gsx$product", default)]
    product: Cell,
    #[serde(rename = "gsx$track", default)]
    track: Cell,
    #[serde(rename = "gsx$waveid", default)]
    wave_id: Cell,
    #[serde(rename = "gsx$sessiontitle")]
    title: Cell,
    #[serde(rename = "gsx$sessionlink", default)]
    link: Cell,
    #[serde(rename = "gsx$sessionspeakers", default)]
    speakers: Cell,
    #[serde(rename = "gsx$sessionabstract", default)]
    summary: Cell,
}

#[derive(Debug, Deserialize)]
struct SandboxRow {
    #[serde(rename = "gsx$companyname")]
    name: Cell,
    #[serde(rename = "gsx$companydesc", default)]
    description: Cell,
    #[serde(rename = "gsx$companyurl", default)]
    url: Cell,
    #[serde(rename = "gsx$companypod")]
    pod: Cell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionItem {
    pub session_date: String,
    pub session_time: String,
    pub room: String,
    pub product: String,
    pub track: String,
    pub wave_id: String,
    pub title: String,
    pub link: String,
    pub speakers: String,
    pub summary: String,
    pub day: ConferenceDay,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxItem {
    pub company_name: String,
    pub company_desc: String,
    pub company_url: String,
    pub pod: String,
}

/// Row types that can be produced from a feed row.
pub trait FeedRow: Sized + Serialize + DeserializeOwned {
    const KIND: FeedKind;

    fn from_row(row: serde_json::Value) -> Result<Self, RowError>;
}

impl FeedRow for SessionItem {
    const KIND: FeedKind = FeedKind::Sessions;

    fn from_row(row: serde_json::Value) -> Result<Self, RowError> {
        let row: SessionRow = serde_json::from_value(row)?;
        let time = row.time.text;
        let (start, end) = time
            .split_once('-')
            .ok_or_else(|| RowError::TimeRange(time.clone()))?;
        let start = to_24_hour(start);
        let end = to_24_hour(end);
        if start.is_empty() || end.is_empty() {
            return Err(RowError::TimeRange(time));
        }

        Ok(SessionItem {
            day: ConferenceDay::from_date_text(&row.date.text),
            session_date: row.date.text,
            session_time: time,
            room: name_to_id(&row.room.text),
            product: row.product.text,
            track: row.track.text,
            wave_id: row.wave_id.text,
            title: row.title.text,
            link: row.link.text,
            speakers: row.speakers.text,
            summary: row.summary.text,
            start,
            end,
        })
    }
}

impl FeedRow for SandboxItem {
    const KIND: FeedKind = FeedKind::Sandbox;

    fn from_row(row: serde_json::Value) -> Result<Self, RowError> {
        let row: SandboxRow = serde_json::from_value(row)?;
        Ok(SandboxItem {
            company_name: row.name.text,
            company_desc: row.description.text,
            company_url: row.url.text,
            pod: name_to_id(&row.pod.text),
        })
    }
}

/// Result of parsing every row of a feed.
#[derive(Debug)]
pub struct ParsedRows<T> {
    pub items: Vec<T>,
    pub skipped: Vec<(usize, RowError)>,
}

/// Parse all rows, dropping (and logging) the ones that do not fit.
pub fn parse_rows<T: FeedRow>(rows: Vec<serde_json::Value>) -> ParsedRows<T> {
    let mut items = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();
    let kind = T::KIND;
    for (index, row) in rows.into_iter().enumerate() {
        match T::from_row(row) {
            Ok(item) => items.push(item),
            Err(error) => {
                tracing::warn!(feed = %kind, row = index, %error, "skipping malformed feed row");
                skipped.push((index, error));
            }
        }
    }
    ParsedRows { items, skipped }
}

/// Turn a free-text room or pod name into an identifier: lowercase, keeping
/// only `[a-z0-9_-]`.
pub fn name_to_id(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// Convert `"2:30pm"` to `"14:30"`. Morning times and `12:xxpm` keep their
/// hour; only the `am`/`pm` marker and whitespace are removed.
pub fn to_24_hour(time: &str) -> String {
    let lower = time.to_ascii_lowercase();
    let pm = lower.contains("pm");
    let bare: String = lower
        .chars()
        .filter(|c| !matches!(c, 'a' | 'p' | 'm') && !c.is_whitespace())
        .collect();
    if !pm {
        return bare;
    }

    let Some((hour, minute)) = bare.split_once(':') else {
        return bare;
    };
    match hour.parse::<u32>() {
        Ok(h) if h < 12 => format!("{}:{minute}", h + 12),
        _ => bare,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn session_row(date: &str, time: &str, room: &str, title: &str) -> serde_json::Value {
        json!({
            "gsx$sessiondate": { "$t": date },
            "gsx$sessiontime": { "$t": time },
            "gsx$room": { "$t": room },
            "gsx$product": { "$t": "Android" },
            "gsx$track": { "$t": "Mobile" },
            "gsx$waveid": { "$t": "" },
            "gsx$sessiontitle": { "$t": title },
            "gsx$sessionlink": { "$t": "android-ui" },
            "gsx$sessionspeakers": { "$t": "Someone" },
            "gsx$sessionabstract": { "$t": "Abstract" }
        })
    }

    #[test]
    fn converts_pm_times() {
        assert_eq!(to_24_hour("2:30pm"), "14:30");
        assert_eq!(to_24_hour(" 5:00PM "), "17:00");
    }

    #[test]
    fn keeps_morning_and_noon_times() {
        assert_eq!(to_24_hour("11:00am"), "11:00");
        assert_eq!(to_24_hour("12:00pm"), "12:00");
        assert_eq!(to_24_hour("9:15"), "9:15");
    }

    #[test]
    fn normalizes_names() {
        assert_eq!(name_to_id("Fireside Chat Room"), "firesidechatroom");
        assert_eq!(name_to_id("Room 3"), "room3");
        assert_eq!(name_to_id("Google APIs!"), "googleapis");
        assert_eq!(name_to_id("Pod_A-1"), "pod_a-1");
    }

    #[test]
    fn reads_envelope() {
        let raw = RawFeed::from_value(json!({
            "feed": {
                "updated": { "$t": "2010-05-18T10:00:00.000Z" },
                "entry": [ session_row("May 19", "10:45am-11:45am", "3", "A") ]
            }
        }))
        .unwrap();
        assert_eq!(raw.updated, "2010-05-18T10:00:00.000Z");
        assert_eq!(raw.rows.len(), 1);
    }

    #[test]
    fn envelope_without_timestamp_fails() {
        let err = RawFeed::from_value(json!({ "feed": { "entry": [] } })).unwrap_err();
        assert!(matches!(err, FeedError::MissingTimestamp));
        assert!(RawFeed::from_json("not json").is_err());
    }

    #[test]
    fn parses_session_rows() {
        let parsed: ParsedRows<SessionItem> = parse_rows(vec![session_row(
            "Wednesday May 19",
            "1:45pm-2:45pm",
            "Room 3",
            "Android UI",
        )]);
        assert!(parsed.skipped.is_empty());
        let item = &parsed.items[0];
        assert_eq!(item.room, "room3");
        assert_eq!(item.day, ConferenceDay::May19);
        assert_eq!(item.start, "13:45");
        assert_eq!(item.end, "14:45");
        assert_eq!(item.session_time, "1:45pm-2:45pm");
    }

    #[test]
    fn dates_without_19_fall_on_the_20th() {
        let parsed: ParsedRows<SessionItem> =
            parse_rows(vec![session_row("Thursday", "10:00am-11:00am", "1", "X")]);
        assert_eq!(parsed.items[0].day, ConferenceDay::May20);
    }

    #[test]
    fn skips_malformed_rows_and_keeps_the_rest() {
        let rows = vec![
            session_row("May 19", "10:00am-11:00am", "1", "Good"),
            session_row("May 19", "all day", "1", "No range"),
            json!({ "gsx$room": { "$t": "1" } }),
            json!("not an object"),
            session_row("May 20", "3:00pm-4:00pm", "2", "Also good"),
        ];
        let parsed: ParsedRows<SessionItem> = parse_rows(rows);
        let titles: Vec<&str> = parsed.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Good", "Also good"]);
        let skipped: Vec<usize> = parsed.skipped.iter().map(|(i, _)| *i).collect();
        assert_eq!(skipped, vec![1, 2, 3]);
        assert!(matches!(parsed.skipped[0].1, RowError::TimeRange(_)));
    }

    #[test]
    fn parses_sandbox_rows() {
        let parsed: ParsedRows<SandboxItem> = parse_rows(vec![json!({
            "gsx$companyname": { "$t": "Acme" },
            "gsx$companydesc": { "$t": "Rockets" },
            "gsx$companyurl": { "$t": "acme.example" },
            "gsx$companypod": { "$t": "App Engine" }
        })]);
        assert_eq!(parsed.items[0].pod, "appengine");
        assert_eq!(parsed.items[0].company_url, "acme.example");
    }
}
