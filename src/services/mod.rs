//! Service layer for the marathon collector.
//!
//! This module contains the business logic for:
//! - Listing extraction and ranking (`RaceListExtractor`)
//! - Elevation recovery from detail pages (`ElevationFieldRecovery`)
//! - Per-state collection (`StateCollector`)

mod collector;
mod elevation;
pub mod listing;

pub use collector::{StateCollector, StateOutcome};
pub use elevation::ElevationFieldRecovery;
pub use listing::RaceListExtractor;

use scraper::Selector;

use crate::error::{AppError, Result};

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
