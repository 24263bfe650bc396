// src/services/elevation.rs

//! Elevation gain/loss recovery from race detail pages.
//!
//! Detail pages publish elevation either as labelled figures
//! ("Elevation Gain: 1,200 feet") or in free text near an elevation chart.
//! Labelled figures are matched first against the raw page; any field still
//! missing is looked up in the page's elevation section, or failing that in
//! elevation-related sentences of the body text.

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::Result;
use crate::models::{ElevationReading, PageSelectors};
use crate::services::parse_selector;
use crate::utils::element_text;

/// Best-effort elevation extraction for a single detail page.
pub struct ElevationFieldRecovery {
    gain_label: Regex,
    loss_label: Regex,
    mention: Regex,
    loose_gain: Regex,
    loose_loss: Regex,
    section: Selector,
    body: Selector,
}

impl ElevationFieldRecovery {
    pub fn new(selectors: &PageSelectors) -> Result<Self> {
        Ok(Self {
            gain_label: Regex::new(r"(?i)Elevation\s+Gain[:\s]*(\d+(?:,\d+)*)\s*(?:feet|ft)")?,
            loss_label: Regex::new(r"(?i)Elevation\s+Loss[:\s]*(\d+(?:,\d+)*)\s*(?:feet|ft)")?,
            mention: Regex::new(r"(?is)\belevation\b.*?\b(?:gain|loss)\b.*?\d+(?:,\d{3})*")?,
            loose_gain: Regex::new(r"(?i)\b(?:elevation\s*)?gain\b[^\d|]{0,24}?(\d+(?:,\d+)*)")?,
            loose_loss: Regex::new(r"(?i)\b(?:elevation\s*)?loss\b[^\d|]{0,24}?(\d+(?:,\d+)*)")?,
            section: parse_selector(&selectors.elevation_section_selector)?,
            body: parse_selector("body")?,
        })
    }

    /// Recover elevation gain and loss from a detail page.
    ///
    /// Never fails; fields that cannot be found are left unknown.
    pub fn recover(&self, content: &str, race_name: &str) -> ElevationReading {
        let mut reading = ElevationReading {
            gain_ft: capture_feet(&self.gain_label, content),
            loss_ft: capture_feet(&self.loss_label, content),
        };

        if !reading.is_complete() {
            let proxy = self.proxy_text(content);
            if !proxy.is_empty() {
                reading.gain_ft = reading
                    .gain_ft
                    .or_else(|| capture_feet(&self.loose_gain, &proxy));
                reading.loss_ft = reading
                    .loss_ft
                    .or_else(|| capture_feet(&self.loose_loss, &proxy));
            }
        }

        log::debug!(
            "Elevation for {}: gain={:?} loss={:?}",
            race_name,
            reading.gain_ft,
            reading.loss_ft
        );
        reading
    }

    /// Text to search when labelled figures are missing.
    ///
    /// The named elevation section if the page has one, else every
    /// elevation-related span of the body text joined with " | ".
    fn proxy_text(&self, content: &str) -> String {
        let document = Html::parse_document(content);

        if let Some(section) = document.select(&self.section).next() {
            return element_text(section);
        }

        let body_text = document
            .select(&self.body)
            .next()
            .map(element_text)
            .unwrap_or_default();

        self.mention
            .find_iter(&body_text)
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// First capture group as feet, thousands separators stripped.
fn capture_feet(pattern: &Regex, text: &str) -> Option<u32> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}
