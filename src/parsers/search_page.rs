use super::{compile_selector, element_text};
use crate::config::SiteConfig;
use crate::error::Result;
use crate::filter::{ListingFilterConfig, ListingUrlFilter};
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Listing URLs found on one search-results page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedLinks {
    /// Distinct absolute URLs in the order they first appear
    pub urls: Vec<String>,
}

impl CollectedLinks {
    pub fn count(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Collects listing links from search-results pages.
///
/// Every anchor on the page is checked against the listing filter, so links
/// are still found when the result cards change their markup.
pub struct LinkCollector {
    filter: ListingUrlFilter,
    anchor_selector: Selector,
}

impl LinkCollector {
    pub fn new(filter: ListingUrlFilter) -> Result<Self> {
        Ok(Self {
            filter,
            anchor_selector: compile_selector("a[href]")?,
        })
    }

    pub fn from_site(site: &SiteConfig) -> Result<Self> {
        let filter = ListingUrlFilter::new(&ListingFilterConfig::from_site(site))?;
        Self::new(filter)
    }

    pub fn collect_html(&self, html: &str) -> CollectedLinks {
        let document = Html::parse_document(html);
        self.collect(&document)
    }

    pub fn collect(&self, document: &Html) -> CollectedLinks {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for href in document
            .select(&self.anchor_selector)
            .filter_map(|e| e.value().attr("href"))
        {
            if let Some(url) = self.filter.resolve(href) {
                let url = url.to_string();
                if seen.insert(url.clone()) {
                    urls.push(url);
                }
            }
        }

        // No listings usually means the layout changed or the results ran out
        if urls.is_empty() {
            ::log::error!("No listing links found on search page");
        } else {
            ::log::debug!(
                "First few listing links: {:?}",
                urls.iter().take(3).collect::<Vec<_>>()
            );
        }

        CollectedLinks { urls }
    }
}

/// Text of the highlighted page button on a search-results page
pub fn selected_page(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(element_text)
}
