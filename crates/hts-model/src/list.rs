//! Section 301 list identifiers and entries.

use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::code::HtsCode;

/// A Section 301 tariff-action list.
///
/// Lists are ranked by enactment: a later list's text controls a code that
/// also appears on an earlier list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Section301List {
    List1,
    List2,
    List3,
    List4A,
    /// A label outside the known chronology; ranks below every known list.
    Other(String),
}

impl Section301List {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lowered = trimmed.to_lowercase();
        let key = lowered
            .strip_prefix("list")
            .map(str::trim)
            .unwrap_or(lowered.as_str());
        match key {
            "1" => Self::List1,
            "2" => Self::List2,
            "3" => Self::List3,
            "4a" => Self::List4A,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Chronological priority; higher wins.
    pub fn priority(&self) -> u8 {
        match self {
            Self::List1 => 1,
            Self::List2 => 2,
            Self::List3 => 3,
            Self::List4A => 4,
            Self::Other(_) => 0,
        }
    }

    /// Additional duty in percent.
    pub fn rate(&self) -> f64 {
        match self {
            Self::List1 | Self::List2 | Self::List3 => 25.0,
            Self::List4A => 7.5,
            Self::Other(_) => 0.0,
        }
    }

    pub fn effective(&self) -> Option<NaiveDate> {
        let (year, month, day) = match self {
            Self::List1 => (2018, 7, 6),
            Self::List2 => (2018, 8, 23),
            Self::List3 => (2018, 9, 24),
            Self::List4A => (2019, 9, 1),
            Self::Other(_) => return None,
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::List1 => "1",
            Self::List2 => "2",
            Self::List3 => "3",
            Self::List4A => "4a",
            Self::Other(label) => label,
        }
    }

    /// Human-readable tariff tier used in reports.
    pub fn tier_label(&self) -> &'static str {
        match self {
            Self::List1 | Self::List2 | Self::List3 => "25%",
            Self::List4A => "7.5%",
            Self::Other(_) => "Unknown",
        }
    }
}

impl fmt::Display for Section301List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Section301List {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One row of an extracted list: a code as printed, its description and list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub code: HtsCode,
    pub raw_code: String,
    pub description: String,
    pub list: Section301List,
}

impl ListEntry {
    pub fn new(raw_code: &str, description: &str, list: Section301List) -> Self {
        Self {
            code: HtsCode::normalize(raw_code),
            raw_code: raw_code.trim().to_string(),
            description: description.trim().to_string(),
            list,
        }
    }

    pub fn priority(&self) -> u8 {
        self.list.priority()
    }
}

/// Keep one entry per canonical code: the highest-priority list wins, and
/// among equal priorities the entry that came first. Output is sorted by code.
pub fn controlling_entries(mut entries: Vec<ListEntry>) -> Vec<ListEntry> {
    entries.sort_by(|a, b| {
        a.code
            .cmp(&b.code)
            .then_with(|| b.priority().cmp(&a.priority()))
    });
    entries.dedup_by(|later, kept| later.code == kept.code);
    entries
}
