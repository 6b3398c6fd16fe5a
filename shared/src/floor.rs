use std::fmt;

use serde::{Deserialize, Serialize};

/// One level of the venue. Floors are ordered bottom to top.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Floor {
    #[default]
    One,
    Two,
    Three,
}

impl Floor {
    pub const ALL: [Floor; 3] = [Floor::One, Floor::Two, Floor::Three];

    pub const fn number(self) -> u8 {
        match self {
            Floor::One => 1,
            Floor::Two => 2,
            Floor::Three => 3,
        }
    }

    pub const fn from_number(n: u8) -> Option<Floor> {
        match n {
            1 => Some(Floor::One),
            2 => Some(Floor::Two),
            3 => Some(Floor::Three),
            _ => None,
        }
    }

    /// Index into per-floor arrays.
    pub const fn index(self) -> usize {
        self.number() as usize - 1
    }

    /// DOM id of the toolbox button that selects this floor.
    pub fn button_id(self) -> String {
        format!("btn-level{}", self.number())
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl TryFrom<u8> for Floor {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Floor::from_number(value).ok_or_else(|| format!("no floor {value}"))
    }
}

impl From<Floor> for u8 {
    fn from(floor: Floor) -> Self {
        floor.number()
    }
}
