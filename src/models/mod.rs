// src/models/mod.rs

//! Domain models for the marathon collector.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod race;
mod selectors;
mod state;
mod stats;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, LoggingConfig, OutputConfig, OutputFormat, Pacing, Replacement,
    SelectionConfig, SiteConfig,
};
pub use race::{ElevationReading, MarathonRecord, RECORD_HEADERS, RaceCandidate, SENTINEL};
pub use selectors::PageSelectors;
pub use state::UsState;
pub use stats::RunStats;
