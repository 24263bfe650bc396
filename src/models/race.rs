// src/models/race.rs

//! Race candidate, elevation reading, and the emitted marathon record.

use serde::{Deserialize, Serialize};

use crate::models::UsState;

/// Text rendering of a value that could not be determined.
pub const SENTINEL: &str = "-";

/// Column order of the tabular output.
pub const RECORD_HEADERS: [&str; 9] = [
    "State",
    "State_Code",
    "Marathon Name",
    "City",
    "Finishers",
    "Course Type",
    "Elevation Gain (ft)",
    "Elevation Loss (ft)",
    "Date",
];

/// A race extracted from a state listing page, before elevation enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceCandidate {
    /// Race name; also the lookup key for the detail page
    pub name: String,

    /// City the race starts in (may be empty)
    pub city: String,

    /// Start date as published by the listing
    pub date: Option<String>,

    /// Number of finishers reported for the last edition
    pub finishers: u32,

    /// Normalized course type from the configured vocabulary
    pub course_type: Option<String>,
}

/// Elevation change of a course, in feet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevationReading {
    pub gain_ft: Option<u32>,
    pub loss_ft: Option<u32>,
}

impl ElevationReading {
    /// Reading with both fields unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// True when both gain and loss are known.
    pub fn is_complete(&self) -> bool {
        self.gain_ft.is_some() && self.loss_ft.is_some()
    }
}

/// One output row: a state, one of its races, and that race's elevation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarathonRecord {
    pub state: String,
    pub state_code: String,
    #[serde(flatten)]
    pub race: RaceCandidate,
    #[serde(flatten)]
    pub elevation: ElevationReading,
}

impl MarathonRecord {
    pub fn new(state: &UsState, race: RaceCandidate, elevation: ElevationReading) -> Self {
        Self {
            state: state.name.clone(),
            state_code: state.code.clone(),
            race,
            elevation,
        }
    }

    /// Render the record as text fields in [`RECORD_HEADERS`] order.
    pub fn to_row(&self) -> [String; 9] {
        [
            self.state.clone(),
            self.state_code.clone(),
            self.race.name.clone(),
            self.race.city.clone(),
            self.race.finishers.to_string(),
            text_or_sentinel(self.race.course_type.as_deref()),
            number_or_sentinel(self.elevation.gain_ft),
            number_or_sentinel(self.elevation.loss_ft),
            text_or_sentinel(self.race.date.as_deref()),
        ]
    }
}

fn text_or_sentinel(value: Option<&str>) -> String {
    value.unwrap_or(SENTINEL).to_string()
}

fn number_or_sentinel(value: Option<u32>) -> String {
    value.map_or_else(|| SENTINEL.to_string(), |v| v.to_string())
}
