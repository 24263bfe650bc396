// src/services/listing.rs

//! State listing extraction.
//!
//! Turns a rendered state calendar into the filtered, ranked set of race
//! candidates. The listing mixes two row layouts: spotlight rows carry the
//! race name in a primary heading, regular rows in a tertiary one.

use std::fmt;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::{PageSelectors, RaceCandidate, SelectionConfig};
use crate::services::parse_selector;
use crate::utils::{element_text, normalize_whitespace};

/// Minimum number of cells in a race row.
const MIN_CELLS: usize = 4;

const COURSE_CELL: usize = 1;
const FINISHERS_CELL: usize = 3;
const CERTIFICATION_CELL: usize = 4;

/// Layout of a listing row, resolved once from its first cell.
#[derive(Debug, Clone, Copy)]
enum RowShape<'a> {
    Spotlight {
        name: ElementRef<'a>,
        city: Option<ElementRef<'a>>,
    },
    Regular {
        name: ElementRef<'a>,
        city: Option<ElementRef<'a>>,
    },
    Unrecognized,
}

/// Why a row produced no candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rejection {
    TooFewCells(usize),
    Unrecognized,
    EmptyName,
    ExcludedCourse(String),
    NotCertified,
    BelowThreshold(u32),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewCells(count) => write!(f, "only {count} cells"),
            Self::Unrecognized => write!(f, "no race heading in first cell"),
            Self::EmptyName => write!(f, "empty race name"),
            Self::ExcludedCourse(course) => write!(f, "excluded course type '{course}'"),
            Self::NotCertified => write!(f, "course not certified"),
            Self::BelowThreshold(count) => write!(f, "{count} finishers below threshold"),
        }
    }
}

/// Extracts ranked race candidates from a state listing page.
pub struct RaceListExtractor {
    policy: SelectionConfig,
    rows: Selector,
    spotlight_name: Selector,
    spotlight_city: Vec<Selector>,
    regular_name: Selector,
    regular_city: Selector,
    detail_link: Selector,
    any_link: Selector,
    start_date: Selector,
    start_date_attr: String,
    course_type: Selector,
    finishers: Regex,
}

impl RaceListExtractor {
    /// Create an extractor for the given markup and selection policy.
    pub fn new(selectors: &PageSelectors, policy: &SelectionConfig) -> Result<Self> {
        Ok(Self {
            policy: policy.clone(),
            rows: parse_selector(&selectors.row_selector)?,
            spotlight_name: parse_selector(&selectors.spotlight_name_selector)?,
            spotlight_city: selectors
                .spotlight_city_selectors
                .iter()
                .map(|s| parse_selector(s))
                .collect::<Result<_>>()?,
            regular_name: parse_selector(&selectors.regular_name_selector)?,
            regular_city: parse_selector(&selectors.regular_city_selector)?,
            detail_link: parse_selector(&selectors.detail_link_selector)?,
            any_link: parse_selector("a")?,
            start_date: parse_selector(&selectors.start_date_selector)?,
            start_date_attr: selectors.start_date_attr.clone(),
            course_type: parse_selector(&selectors.course_type_selector)?,
            finishers: Regex::new(r"(?i)(\d+(?:,\d+)*)\s*finisher")?,
        })
    }

    /// Parse `content` and extract its candidates.
    pub fn extract_html(&self, content: &str) -> Vec<RaceCandidate> {
        let document = Html::parse_document(content);
        self.extract(&document)
    }

    /// Extract every qualifying race, ranked by finishers descending.
    ///
    /// Ties keep their order of appearance on the page.
    pub fn extract(&self, document: &Html) -> Vec<RaceCandidate> {
        let mut candidates = Vec::new();

        for (index, row) in document.select(&self.rows).enumerate() {
            match self.parse_row(row) {
                Ok(candidate) => candidates.push(candidate),
                Err(Rejection::TooFewCells(_)) => {}
                Err(reason) => log::debug!("Row {} skipped: {}", index, reason),
            }
        }

        rank(&mut candidates);
        candidates
    }

    fn parse_row(&self, row: ElementRef<'_>) -> std::result::Result<RaceCandidate, Rejection> {
        let cells: Vec<ElementRef<'_>> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "td" | "th"))
            .collect();

        if cells.len() < MIN_CELLS {
            return Err(Rejection::TooFewCells(cells.len()));
        }

        let (name_heading, city_line) = match self.classify(cells[0]) {
            RowShape::Spotlight { name, city } | RowShape::Regular { name, city } => (name, city),
            RowShape::Unrecognized => return Err(Rejection::Unrecognized),
        };

        let name = self.race_name(name_heading);
        if name.is_empty() {
            return Err(Rejection::EmptyName);
        }

        let city = city_line
            .map(|el| {
                let text = element_text(el);
                text.split(',').next().unwrap_or_default().trim().to_string()
            })
            .unwrap_or_default();

        let date = city_line
            .and_then(|el| self.start_date(el))
            .or_else(|| self.start_date(cells[0]));

        let course_type = self.course_type(cells[COURSE_CELL])?;
        let finishers = self.parse_finishers(&element_text(cells[FINISHERS_CELL]));

        if let Some(cell) = cells.get(CERTIFICATION_CELL) {
            if self.is_excluded_by_marker(&element_text(*cell)) {
                return Err(Rejection::NotCertified);
            }
        }

        if finishers < self.policy.min_finishers {
            return Err(Rejection::BelowThreshold(finishers));
        }

        Ok(RaceCandidate {
            name,
            city,
            date,
            finishers,
            course_type,
        })
    }

    fn classify<'a>(&self, cell: ElementRef<'a>) -> RowShape<'a> {
        if let Some(name) = cell.select(&self.spotlight_name).next() {
            let city = self
                .spotlight_city
                .iter()
                .find_map(|sel| cell.select(sel).next());
            RowShape::Spotlight { name, city }
        } else if let Some(name) = cell.select(&self.regular_name).next() {
            let city = cell.select(&self.regular_city).next();
            RowShape::Regular { name, city }
        } else {
            RowShape::Unrecognized
        }
    }

    fn race_name(&self, heading: ElementRef<'_>) -> String {
        let anchor = heading
            .select(&self.detail_link)
            .next()
            .or_else(|| heading.select(&self.any_link).next());
        element_text(anchor.unwrap_or(heading))
    }

    fn start_date(&self, scope: ElementRef<'_>) -> Option<String> {
        let el = scope.select(&self.start_date).next()?;
        let value = el
            .value()
            .attr(&self.start_date_attr)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| element_text(el));
        (!value.is_empty()).then_some(value)
    }

    fn course_type(&self, cell: ElementRef<'_>) -> std::result::Result<Option<String>, Rejection> {
        let raw = cell
            .select(&self.course_type)
            .next()
            .map(element_text)
            .unwrap_or_else(|| element_text(cell));
        self.normalize_course(&raw)
    }

    /// Apply aliases, drop excluded types, and map onto the vocabulary.
    fn normalize_course(&self, raw: &str) -> std::result::Result<Option<String>, Rejection> {
        let mut value = normalize_whitespace(raw);

        if let Some(alias) = self
            .policy
            .course_aliases
            .iter()
            .find(|alias| value.eq_ignore_ascii_case(&alias.from))
        {
            value = alias.to.clone();
        }

        if self
            .policy
            .excluded_course_types
            .iter()
            .any(|excluded| value.eq_ignore_ascii_case(excluded))
        {
            return Err(Rejection::ExcludedCourse(value));
        }

        if value.is_empty() {
            return Ok(None);
        }

        let canonical = self
            .policy
            .course_types
            .iter()
            .find(|known| value.eq_ignore_ascii_case(known))
            .cloned();
        if canonical.is_none() {
            log::debug!("Course type '{}' is outside the vocabulary", value);
        }
        Ok(canonical)
    }

    fn parse_finishers(&self, text: &str) -> u32 {
        self.finishers
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse().ok())
            .unwrap_or(0)
    }

    fn is_excluded_by_marker(&self, text: &str) -> bool {
        let marker = self.policy.exclusion_marker.trim();
        !marker.is_empty() && text.to_lowercase().contains(&marker.to_lowercase())
    }
}

/// Stable sort by finishers, most first.
pub fn rank(candidates: &mut [RaceCandidate]) {
    candidates.sort_by(|a, b| b.finishers.cmp(&a.finishers));
}

/// The first `max_races` candidates of a ranked list.
pub fn select_top(mut candidates: Vec<RaceCandidate>, max_races: usize) -> Vec<RaceCandidate> {
    candidates.truncate(max_races);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RaceListExtractor {
        RaceListExtractor::new(&PageSelectors::default(), &SelectionConfig::default()).unwrap()
    }

    fn table(rows: &str) -> String {
        format!("<html><body><table>{rows}</table></body></html>")
    }

    fn regular_row(name: &str, course: &str, finishers: &str, cert: &str) -> String {
        format!(
            "<tr><td><h3><a href=\"race-detail.php?zname={name}\">{name}</a></h3>\
             <h4>Springfield, IL</h4></td><td><h4>{course}</h4></td><td>2h</td>\
             <td>{finishers}</td><td>{cert}</td></tr>"
        )
    }

    #[test]
    fn test_spotlight_and_regular_shapes() {
        let html = table(
            "<tr><td><h1><a href=\"race-detail.php?zname=Big\">Big City Marathon</a></h1>\
             <h3>Chicago, IL <span itemprop=\"startDate\" content=\"2025-10-12\">Oct 12</span></h3></td>\
             <td><h4>Flat</h4></td><td></td><td>40,000 Finishers</td></tr>\
             <tr><td><h3>Small Town Marathon</h3><h4>Peoria, IL</h4></td>\
             <td>Hilly</td><td></td><td>150 Finishers</td></tr>",
        );
        let races = extractor().extract_html(&html);

        assert_eq!(races.len(), 2);
        assert_eq!(races[0].name, "Big City Marathon");
        assert_eq!(races[0].city, "Chicago");
        assert_eq!(races[0].date.as_deref(), Some("2025-10-12"));
        assert_eq!(races[0].finishers, 40_000);
        assert_eq!(races[1].name, "Small Town Marathon");
        assert_eq!(races[1].city, "Peoria");
        assert_eq!(races[1].date, None);
        assert_eq!(races[1].course_type.as_deref(), Some("Hilly"));
    }

    #[test]
    fn test_rows_with_few_cells_are_ignored() {
        let html = table(
            "<tr><th>Race</th><th>Course</th><th>Time</th></tr>\
             <tr><td><h3>Three Cell Marathon</h3></td><td>Flat</td><td>500 Finishers</td></tr>",
        );
        assert!(extractor().extract_html(&html).is_empty());
    }

    #[test]
    fn test_row_without_heading_is_skipped() {
        let html = table("<tr><td>No heading</td><td>Flat</td><td></td><td>500 Finishers</td></tr>");
        assert!(extractor().extract_html(&html).is_empty());
    }

    #[test]
    fn test_empty_name_is_skipped() {
        let html = table("<tr><td><h3> <a href=\"race-detail.php\"></a> </h3></td><td>Flat</td><td></td><td>500 Finishers</td></tr>");
        assert!(extractor().extract_html(&html).is_empty());
    }

    #[test]
    fn test_very_flat_becomes_flat_on_minimal_row() {
        let html = table("<tr><td><h3>Minimal</h3></td><td>Very Flat</td><td></td><td>100 Finishers</td></tr>");
        let races = extractor().extract_html(&html);

        assert_eq!(races.len(), 1);
        assert_eq!(races[0].course_type.as_deref(), Some("Flat"));
        assert_eq!(races[0].city, "");
        assert_eq!(races[0].date, None);
    }

    #[test]
    fn test_very_hilly_is_excluded() {
        let html = table(&regular_row("Mountain Marathon", "Very Hilly", "900 Finishers", ""));
        assert!(extractor().extract_html(&html).is_empty());
    }

    #[test]
    fn test_not_certified_is_excluded() {
        let html = table(&regular_row(
            "Trail Marathon",
            "Rolling Hills",
            "900 Finishers",
            "Course is NOT Certified",
        ));
        assert!(extractor().extract_html(&html).is_empty());
    }

    #[test]
    fn test_finisher_threshold() {
        let html = table(&format!(
            "{}{}{}",
            regular_row("Ninety Nine", "Flat", "99 Finishers", ""),
            regular_row("One Hundred", "Flat", "100 Finishers", ""),
            regular_row("No Count", "Flat", "Results pending", ""),
        ));
        let races = extractor().extract_html(&html);

        assert_eq!(races.len(), 1);
        assert_eq!(races[0].name, "One Hundred");
    }

    #[test]
    fn test_unknown_course_type_is_absent() {
        let html = table(&regular_row("Odd Course", "Net Downhill-ish", "300 Finishers", ""));
        let races = extractor().extract_html(&html);
        assert_eq!(races[0].course_type, None);
    }

    #[test]
    fn test_ranking_is_stable_for_ties() {
        let html = table(&format!(
            "{}{}{}{}",
            regular_row("First Tie", "Flat", "500 Finishers", ""),
            regular_row("Biggest", "Flat", "2,500 Finishers", ""),
            regular_row("Second Tie", "Flat", "500 Finishers", ""),
            regular_row("Smallest", "Flat", "120 finishers", ""),
        ));
        let names: Vec<_> = extractor()
            .extract_html(&html)
            .into_iter()
            .map(|r| r.name)
            .collect();

        assert_eq!(names, ["Biggest", "First Tie", "Second Tie", "Smallest"]);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let html = table(&format!(
            "{}{}",
            regular_row("A", "Flat", "300 Finishers", ""),
            regular_row("B", "Downhill", "300 Finishers", ""),
        ));
        let document = Html::parse_document(&html);
        let ex = extractor();
        assert_eq!(ex.extract(&document), ex.extract(&document));
    }

    #[test]
    fn test_parse_finishers_with_separators() {
        let ex = extractor();
        assert_eq!(ex.parse_finishers("12,345 Finishers"), 12_345);
        assert_eq!(ex.parse_finishers("1,234,567 FINISHERS"), 1_234_567);
        assert_eq!(ex.parse_finishers("2019 | 812 Finishers"), 812);
        assert_eq!(ex.parse_finishers("Finishers: 812"), 0);
    }

    #[test]
    fn test_inline_markup_does_not_split_name_or_count() {
        let html = table(
            "<tr><td><h3><a href=\"race-detail.php?zname=Rock\">Rock<sup>®</sup> Marathon</a></h3>\
             <h4>Nashville, TN</h4></td><td><h4>Rolling Hills</h4></td><td></td>\
             <td><b>5,</b>432 Finishers</td></tr>\
             <tr><td><h3>Music City <span>Half</span>way Marathon</h3><h4>Nashville, TN</h4></td>\
             <td>Flat</td><td></td><td>6<i>00</i> Finishers</td></tr>",
        );
        let races = extractor().extract_html(&html);

        assert_eq!(races.len(), 2);
        assert_eq!(races[0].name, "Rock® Marathon");
        assert_eq!(races[0].finishers, 5_432);
        assert_eq!(races[1].name, "Music City Halfway Marathon");
        assert_eq!(races[1].finishers, 600);
    }

    #[test]
    fn test_date_falls_back_to_visible_text() {
        let html = table(
            "<tr><td><h3>Text Date</h3><h4>Austin, TX <span itemprop=\"startDate\">Feb 16, 2025</span></h4></td>\
             <td>Flat</td><td></td><td>300 Finishers</td></tr>",
        );
        let races = extractor().extract_html(&html);
        assert_eq!(races[0].date.as_deref(), Some("Feb 16, 2025"));
        assert_eq!(races[0].city, "Austin");
    }

    #[test]
    fn test_custom_threshold_and_marker() {
        let policy = SelectionConfig {
            min_finishers: 1000,
            exclusion_marker: "uncertified".to_string(),
            ..SelectionConfig::default()
        };
        let ex = RaceListExtractor::new(&PageSelectors::default(), &policy).unwrap();
        let html = table(&format!(
            "{}{}{}",
            regular_row("Big", "Flat", "1,500 Finishers", "Course is Not Certified"),
            regular_row("Marked", "Flat", "5,000 Finishers", "uncertified"),
            regular_row("Small", "Flat", "900 Finishers", ""),
        ));
        let races = ex.extract_html(&html);

        assert_eq!(races.len(), 1);
        assert_eq!(races[0].name, "Big");
    }

    #[test]
    fn test_select_top_is_prefix() {
        let html = table(&format!(
            "{}{}{}",
            regular_row("A", "Flat", "300 Finishers", ""),
            regular_row("B", "Flat", "200 Finishers", ""),
            regular_row("C", "Flat", "400 Finishers", ""),
        ));
        let ranked = extractor().extract_html(&html);
        let top = select_top(ranked.clone(), 2);

        assert_eq!(top, &ranked[..2]);
        assert_eq!(select_top(ranked.clone(), 10), ranked);
    }
}
