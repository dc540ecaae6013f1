use crate::config::SiteConfig;
use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for recognizing listing links on a search page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingFilterConfig {
    /// Base that relative hrefs are resolved against
    pub base_url: String,

    /// Regex patterns an href must match (at least one) to be a listing link
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for hrefs to reject (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl ListingFilterConfig {
    pub fn from_site(site: &SiteConfig) -> Self {
        Self {
            base_url: site.base_url.clone(),
            include_patterns: vec![site.listing_url_pattern.clone()],
            exclude_patterns: site.listing_exclude_patterns.clone(),
        }
    }
}

/// Decides which hrefs are listing links and turns them into absolute URLs
#[derive(Debug)]
pub struct ListingUrlFilter {
    base_url: Url,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl ListingUrlFilter {
    /// Create a new listing filter from configuration
    pub fn new(config: &ListingFilterConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let mut include_regexes = Vec::with_capacity(config.include_patterns.len());
        for pattern in &config.include_patterns {
            include_regexes.push(Regex::new(pattern)?);
        }

        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            base_url,
            include_regexes,
            exclude_regexes,
        })
    }

    /// Determine if an href points at a listing, whatever markup surrounds it
    pub fn is_listing(&self, href: &str) -> bool {
        // Check regex exclusions (these take precedence)
        if self.exclude_regexes.iter().any(|regex| regex.is_match(href)) {
            return false;
        }

        // With no include patterns nothing qualifies as a listing
        self.include_regexes.iter().any(|regex| regex.is_match(href))
    }

    /// Resolve a listing href to its absolute, fragment-free form
    pub fn resolve(&self, href: &str) -> Option<Url> {
        if !self.is_listing(href) {
            return None;
        }
        let resolved = self.base_url.join(href.trim()).ok()?;
        Some(self.normalize_url(&resolved))
    }

    /// Create a normalized version of the URL (e.g., removing fragments)
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_filter() -> ListingUrlFilter {
        ListingUrlFilter::new(&ListingFilterConfig::from_site(&SiteConfig::default())).unwrap()
    }

    #[test]
    fn test_listing_pattern() {
        let filter = site_filter();

        assert!(filter.is_listing("/partner/jobListing.htm?pos=101&jobListingId=1"));
        assert!(filter.is_listing("https://www.glassdoor.com/partner/jobListing.htm?x=1"));
        assert!(!filter.is_listing("/Job/index.htm"));
        assert!(!filter.is_listing("/partner/jobListingXhtm?x=1"));
    }

    #[test]
    fn test_resolve_relative_href() {
        let filter = site_filter();

        let url = filter
            .resolve("/partner/jobListing.htm?pos=101&jobListingId=42#apply")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.glassdoor.com/partner/jobListing.htm?pos=101&jobListingId=42"
        );
        assert!(filter.resolve("/Reviews/index.htm").is_none());
    }

    #[test]
    fn test_exclusions_take_precedence() {
        let config = ListingFilterConfig {
            base_url: "https://jobs.example.com".to_string(),
            include_patterns: vec![r"/listing/".to_string()],
            exclude_patterns: vec![r"sponsored=1".to_string()],
        };
        let filter = ListingUrlFilter::new(&config).unwrap();

        assert!(filter.resolve("/listing/1").is_some());
        assert!(filter.resolve("/listing/2?sponsored=1").is_none());
    }

    #[test]
    fn test_site_exclusions_are_applied() {
        let site = SiteConfig {
            listing_exclude_patterns: vec![r"[?&]sponsored=true".to_string()],
            ..SiteConfig::default()
        };
        let filter = ListingUrlFilter::new(&ListingFilterConfig::from_site(&site)).unwrap();

        assert!(filter.resolve("/partner/jobListing.htm?pos=101&jobListingId=7").is_some());
        assert!(
            filter
                .resolve("/partner/jobListing.htm?pos=102&jobListingId=8&sponsored=true")
                .is_none()
        );
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = ListingFilterConfig {
            base_url: "https://jobs.example.com".to_string(),
            include_patterns: vec!["(".to_string()],
            exclude_patterns: vec![],
        };
        assert!(ListingUrlFilter::new(&config).is_err());
    }
}
