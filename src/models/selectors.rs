// src/models/selectors.rs

//! CSS selectors for scraping listing and detail pages.

use serde::{Deserialize, Serialize};

/// CSS selectors for the markup the extractors walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSelectors {
    /// Selector for each candidate row in the state listing
    #[serde(default = "defaults::row")]
    pub row_selector: String,

    /// Heading that marks a spotlight row and holds its race name
    #[serde(default = "defaults::spotlight_name")]
    pub spotlight_name_selector: String,

    /// City line of a spotlight row, tried in order
    #[serde(default = "defaults::spotlight_city")]
    pub spotlight_city_selectors: Vec<String>,

    /// Heading that marks a regular row and holds its race name
    #[serde(default = "defaults::regular_name")]
    pub regular_name_selector: String,

    /// City line of a regular row
    #[serde(default = "defaults::regular_city")]
    pub regular_city_selector: String,

    /// Link to the race detail page within the name heading
    #[serde(default = "defaults::detail_link")]
    pub detail_link_selector: String,

    /// Machine-readable start date within the city line
    #[serde(default = "defaults::start_date")]
    pub start_date_selector: String,

    /// Attribute carrying the machine-readable date value
    #[serde(default = "defaults::start_date_attr")]
    pub start_date_attr: String,

    /// Element within the course cell holding the course type
    #[serde(default = "defaults::course_type")]
    pub course_type_selector: String,

    /// Named elevation section on the detail page
    #[serde(default = "defaults::elevation_section")]
    pub elevation_section_selector: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            row_selector: defaults::row(),
            spotlight_name_selector: defaults::spotlight_name(),
            spotlight_city_selectors: defaults::spotlight_city(),
            regular_name_selector: defaults::regular_name(),
            regular_city_selector: defaults::regular_city(),
            detail_link_selector: defaults::detail_link(),
            start_date_selector: defaults::start_date(),
            start_date_attr: defaults::start_date_attr(),
            course_type_selector: defaults::course_type(),
            elevation_section_selector: defaults::elevation_section(),
        }
    }
}

impl PageSelectors {
    /// All selector strings, for validation.
    pub fn all(&self) -> Vec<&str> {
        let mut selectors = vec![
            self.row_selector.as_str(),
            self.spotlight_name_selector.as_str(),
            self.regular_name_selector.as_str(),
            self.regular_city_selector.as_str(),
            self.detail_link_selector.as_str(),
            self.start_date_selector.as_str(),
            self.course_type_selector.as_str(),
            self.elevation_section_selector.as_str(),
        ];
        selectors.extend(self.spotlight_city_selectors.iter().map(String::as_str));
        selectors
    }
}

mod defaults {
    pub fn row() -> String {
        "tr".into()
    }
    pub fn spotlight_name() -> String {
        "h1".into()
    }
    pub fn spotlight_city() -> Vec<String> {
        vec!["h3".into(), "h2".into()]
    }
    pub fn regular_name() -> String {
        "h3".into()
    }
    pub fn regular_city() -> String {
        "h4".into()
    }
    pub fn detail_link() -> String {
        r#"a[href*="race-detail"]"#.into()
    }
    pub fn start_date() -> String {
        r#"[itemprop="startDate"]"#.into()
    }
    pub fn start_date_attr() -> String {
        "content".into()
    }
    pub fn course_type() -> String {
        "h4".into()
    }
    pub fn elevation_section() -> String {
        r#"#Elevation, [id*="elevation"], .elevation"#.into()
    }
}
