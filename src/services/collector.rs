// src/services/collector.rs

//! Per-state collection: listing, ranking, and elevation enrichment.

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{
    Config, ElevationReading, MarathonRecord, Pacing, RaceCandidate, SiteConfig, UsState,
};
use crate::services::{ElevationFieldRecovery, RaceListExtractor, listing::select_top};
use crate::utils::http::PageFetcher;
use crate::utils::url::{detail_url, listing_url};

/// Result of collecting one state.
#[derive(Debug, Default)]
pub struct StateOutcome {
    /// Enriched records in ranked order
    pub records: Vec<MarathonRecord>,
    /// Qualifying races on the listing before truncation
    pub candidates_found: usize,
    /// Races whose detail page could not be fetched
    pub detail_failures: usize,
}

/// Collects the top races of a state with their elevation data.
pub struct StateCollector<'a> {
    fetcher: &'a dyn PageFetcher,
    site: SiteConfig,
    extractor: RaceListExtractor,
    recovery: ElevationFieldRecovery,
    max_races: usize,
    max_concurrent: usize,
    pacing: Pacing,
}

impl<'a> StateCollector<'a> {
    /// Create a collector from configuration, fetching through `fetcher`.
    pub fn new(config: &Config, fetcher: &'a dyn PageFetcher) -> Result<Self> {
        Ok(Self {
            fetcher,
            site: config.site.clone(),
            extractor: RaceListExtractor::new(&config.selectors, &config.selection)?,
            recovery: ElevationFieldRecovery::new(&config.selectors)?,
            max_races: config.selection.max_races,
            max_concurrent: config.crawler.max_concurrent.max(1),
            pacing: Pacing::from(&config.crawler),
        })
    }

    /// Replace the politeness delays.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Collect one state.
    ///
    /// Fails only when the listing page cannot be fetched. A race whose
    /// detail page fails keeps unknown elevation and the state carries on.
    pub async fn collect(&self, state: &UsState) -> Result<StateOutcome> {
        let url = listing_url(&self.site, &state.name)?;
        let content = self.fetcher.fetch(&url).await?;
        Pacing::wait(self.pacing.listing_settle).await;

        let candidates = self.extractor.extract_html(&content);
        let candidates_found = candidates.len();
        let top = select_top(candidates, self.max_races);

        log::info!(
            "  Found {} valid races, collecting top {}",
            candidates_found,
            top.len()
        );

        let enriched: Vec<(RaceCandidate, Option<ElevationReading>)> = stream::iter(top)
            .map(|race| async move {
                log::info!("    Getting elevation for: {}", race.name);
                let elevation = match self.fetch_elevation(&race).await {
                    Ok(reading) => Some(reading),
                    Err(error) => {
                        log::warn!("    Error getting elevation for {}: {}", race.name, error);
                        None
                    }
                };
                Pacing::wait(self.pacing.race_delay).await;
                (race, elevation)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut outcome = StateOutcome {
            candidates_found,
            ..StateOutcome::default()
        };
        for (race, elevation) in enriched {
            if elevation.is_none() {
                outcome.detail_failures += 1;
            }
            let elevation = elevation.unwrap_or_default();
            outcome.records.push(MarathonRecord::new(state, race, elevation));
        }

        Ok(outcome)
    }

    async fn fetch_elevation(&self, race: &RaceCandidate) -> Result<ElevationReading> {
        let url = detail_url(&self.site, &race.name)?;
        let content = self.fetcher.fetch(&url).await?;
        Pacing::wait(self.pacing.detail_settle).await;
        Ok(self.recovery.recover(&content, &race.name))
    }
}
