use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// The two days of the conference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConferenceDay {
    May19,
    May20,
}

impl ConferenceDay {
    pub fn date(self) -> NaiveDate {
        match self {
            ConferenceDay::May19 => NaiveDate::from_ymd_opt(2010, 5, 19),
            ConferenceDay::May20 => NaiveDate::from_ymd_opt(2010, 5, 20),
        }
        .unwrap_or_default()
    }

    /// Bucket a free-text session date. Anything mentioning `19` is the first
    /// day; everything else is the second.
    pub fn from_date_text(text: &str) -> Self {
        if text.contains("19") {
            ConferenceDay::May19
        } else {
            ConferenceDay::May20
        }
    }

    /// Day whose schedule is shown on `today`: the first day until the second
    /// one starts.
    pub fn shown_on(today: NaiveDate) -> Self {
        if today < ConferenceDay::May20.date() {
            ConferenceDay::May19
        } else {
            ConferenceDay::May20
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConferenceDay::May19 => "Wednesday May 19",
            ConferenceDay::May20 => "Thursday May 20",
        }
    }
}

/// Sort key for a 24-hour `H:MM` start time. Unparsable times sort last.
pub fn start_key(time: &str) -> u32 {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map(|t| t.hour() * 100 + t.minute())
        .unwrap_or(u32::MAX)
}

/// One office-hours slot and the products staffed during it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeHoursSlot {
    pub time: &'static str,
    pub products: &'static [&'static str],
}

const MAY19_OFFICE_HOURS: &[OfficeHoursSlot] = &[
    OfficeHoursSlot {
        time: "12:00pm-2:30pm",
        products: &[
            "Enterprise",
            "Go Programming Language",
            "Google Project Hosting",
            "Social Web",
            "Google APIs",
            "App Engine",
        ],
    },
    OfficeHoursSlot {
        time: "2:30pm-5:00pm",
        products: &[
            "Chrome",
            "Closure Compiler",
            "Geo",
            "GWT",
            "Wave",
            "Developer Docs",
            "App Engine",
        ],
    },
];

const MAY20_OFFICE_HOURS: &[OfficeHoursSlot] = &[
    OfficeHoursSlot {
        time: "12:00pm-3:00pm",
        products: &[
            "Chrome",
            "Android",
            "Geo",
            "GWT",
            "Wave",
            "Developer Docs",
            "App Engine",
        ],
    },
    OfficeHoursSlot {
        time: "3:00pm-5:30pm",
        products: &[
            "Enterprise",
            "Android",
            "Google Project Hosting",
            "Social Web",
            "Google APIs",
            "App Engine",
        ],
    },
];

pub fn office_hours(day: ConferenceDay) -> &'static [OfficeHoursSlot] {
    match day {
        ConferenceDay::May19 => MAY19_OFFICE_HOURS,
        ConferenceDay::May20 => MAY20_OFFICE_HOURS,
    }
}
