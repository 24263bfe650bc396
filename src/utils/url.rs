// src/utils/url.rs

//! Endpoint URL construction for the listing site.

use url::Url;
use url::form_urlencoded::byte_serialize;

use crate::error::Result;
use crate::models::SiteConfig;

/// Percent-encode a query value, spaces as `%20`.
///
/// # Examples
/// ```
/// use marathon_tracker::utils::url::encode_component;
///
/// assert_eq!(encode_component("New York"), "New%20York");
/// assert_eq!(encode_component("Rock & Roll"), "Rock%20%26%20Roll");
/// ```
pub fn encode_component(value: &str) -> String {
    // form encoding writes spaces as '+' and escapes a literal '+' as %2B
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// URL of a state's race calendar, sorted by finishers descending.
pub fn listing_url(site: &SiteConfig, state_name: &str) -> Result<String> {
    let query = format!(
        "state={}&sort={}",
        encode_component(state_name),
        encode_component(&site.listing_sort)
    );
    build(&site.base_url, &site.listing_path, &query, &site.listing_fragment)
}

/// URL of a race's detail page, keyed by race name.
pub fn detail_url(site: &SiteConfig, race_name: &str) -> Result<String> {
    let query = format!("zname={}", encode_component(race_name));
    build(&site.base_url, &site.detail_path, &query, &site.detail_fragment)
}

fn build(base: &str, path: &str, query: &str, fragment: &str) -> Result<String> {
    let mut url = Url::parse(base)?.join(path)?;
    url.set_query(Some(query));
    if !fragment.is_empty() {
        url.set_fragment(Some(fragment));
    }
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url() {
        let site = SiteConfig::default();
        assert_eq!(
            listing_url(&site, "New Hampshire").unwrap(),
            "https://findmymarathon.com/calendar-state.php?state=New%20Hampshire&sort=finishersd#calendar"
        );
    }

    #[test]
    fn test_detail_url() {
        let site = SiteConfig::default();
        assert_eq!(
            detail_url(&site, "Boston Marathon").unwrap(),
            "https://findmymarathon.com/race-detail.php?zname=Boston%20Marathon#Elevation"
        );
    }

    #[test]
    fn test_detail_url_escapes_reserved() {
        let site = SiteConfig::default();
        let url = detail_url(&site, "Rock 'n' Roll & Friends").unwrap();
        assert!(url.contains("zname=Rock%20%27n%27%20Roll%20%26%20Friends"));
    }

    #[test]
    fn test_encode_keeps_literal_plus() {
        assert_eq!(encode_component("A+B"), "A%2BB");
    }

    #[test]
    fn test_custom_base_without_fragment() {
        let site = SiteConfig {
            base_url: "http://localhost:8080/mirror/".to_string(),
            listing_path: "calendar-state.php".to_string(),
            listing_fragment: String::new(),
            ..SiteConfig::default()
        };
        assert_eq!(
            listing_url(&site, "Ohio").unwrap(),
            "http://localhost:8080/mirror/calendar-state.php?state=Ohio&sort=finishersd"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let site = SiteConfig {
            base_url: "not a url".to_string(),
            ..SiteConfig::default()
        };
        assert!(listing_url(&site, "Ohio").is_err());
    }
}
