//! The address fragment (`#level2:firesidechatroom`) is the only persisted
//! representation of view state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::floor::Floor;

const LEVEL_TOKEN: &str = "level";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFragment {
    pub floor: Floor,
    pub content_id: Option<String>,
}

impl ViewFragment {
    pub fn floor_only(floor: Floor) -> Self {
        Self {
            floor,
            content_id: None,
        }
    }

    pub fn with_content(floor: Floor, content_id: impl Into<String>) -> Self {
        Self {
            floor,
            content_id: Some(content_id.into()),
        }
    }

    /// Find the first `level<digit>` token anywhere in `hash`, with an optional
    /// `:<id>` suffix. A leading `#` is allowed. Digits that do not name a
    /// floor make the whole fragment unparsable.
    pub fn parse(hash: &str) -> Option<Self> {
        let mut rest = hash;
        while let Some(pos) = rest.find(LEVEL_TOKEN) {
            let after = &rest[pos + LEVEL_TOKEN.len()..];
            let mut chars = after.chars();
            let Some(digit) = chars.next().and_then(|c| c.to_digit(10)) else {
                rest = &rest[pos + 1..];
                continue;
            };

            let floor = Floor::from_number(digit as u8)?;
            let tail = &after[1..];
            let content_id = tail.strip_prefix(':').and_then(|id| {
                let end = id
                    .find(|c: char| !is_id_char(c))
                    .unwrap_or(id.len());
                (end > 0).then(|| id[..end].to_string())
            });
            return Some(Self { floor, content_id });
        }
        None
    }
}

pub fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Fragment text without the leading `#`.
impl fmt::Display for ViewFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LEVEL_TOKEN}{}", self.floor)?;
        if let Some(id) = &self.content_id {
            write!(f, ":{id}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_floor_only() {
        assert_eq!(
            ViewFragment::parse("#level3"),
            Some(ViewFragment::floor_only(Floor::Three))
        );
    }

    #[test]
    fn parses_floor_and_content() {
        assert_eq!(
            ViewFragment::parse("#level2:firesidechatroom"),
            Some(ViewFragment::with_content(Floor::Two, "firesidechatroom"))
        );
        assert_eq!(
            ViewFragment::parse("level2:room-3_b!trailing"),
            Some(ViewFragment::with_content(Floor::Two, "room-3_b"))
        );
    }

    #[test]
    fn empty_content_id_is_dropped() {
        assert_eq!(
            ViewFragment::parse("#level1:"),
            Some(ViewFragment::floor_only(Floor::One))
        );
    }

    #[test]
    fn finds_token_after_noise() {
        assert_eq!(
            ViewFragment::parse("#levelx/level2:7"),
            Some(ViewFragment::with_content(Floor::Two, "7"))
        );
    }

    #[test]
    fn rejects_unparsable() {
        for hash in ["", "#", "#lobby", "#level", "#levelA", "#level7", "#level0:3"] {
            assert_eq!(ViewFragment::parse(hash), None, "{hash}");
        }
    }

    #[test]
    fn written_fragment_parses_back() {
        for floor in Floor::ALL {
            for fragment in [
                ViewFragment::floor_only(floor),
                ViewFragment::with_content(floor, "appengine"),
            ] {
                let written = format!("#{fragment}");
                assert_eq!(ViewFragment::parse(&written), Some(fragment));
            }
        }
    }
}
