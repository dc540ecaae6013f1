use super::crawler::BrowserSession;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::parsers::compile_selector;
use crate::parsers::listing::ListingExtractor;
use crate::parsers::search_page::{CollectedLinks, LinkCollector, selected_page};
use crate::results::{RawListing, SearchTarget};
use crate::storage::{self, RawListingWriter};
use crate::utils::random_delay;
use scraper::{Html, Selector};
use std::io::Write;
use url::Url;

/// Prefix `https://` when the URL carries no scheme
pub fn check_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(_) => url.to_string(),
        Err(_) => format!("https://{}", url),
    }
}

/// Walks the paginated search results of each state and scrapes every
/// listing it links to
pub struct CrawlController<'a> {
    config: &'a PipelineConfig,
    collector: LinkCollector,
    extractor: ListingExtractor,
    selected_page: Selector,
}

impl<'a> CrawlController<'a> {
    pub fn new(config: &'a PipelineConfig) -> Result<Self> {
        Ok(Self {
            config,
            collector: LinkCollector::from_site(&config.site)?,
            extractor: ListingExtractor::new(&config.site.listing)?,
            selected_page: compile_selector(&config.pagination.selected_page_css)?,
        })
    }

    /// Load one listing page and extract it. Never fails: a page that cannot
    /// be loaded yields an all-`NA` listing carrying its URL and state.
    pub async fn scrape_listing<B: BrowserSession>(
        &self,
        browser: &mut B,
        url: &str,
        search_state: &str,
    ) -> RawListing {
        let url = check_url(url);
        if let Err(e) = browser.goto(&url).await {
            ::log::error!("Requested url {} is unavailable: {}", url, e);
            return RawListing::unavailable(&url, search_state);
        }
        random_delay(self.config.delays.listing, "listing").await;

        // The company panel only renders once its tab is open
        if let Err(e) = browser.click_xpath(&self.config.site.company_tab_xpath).await {
            ::log::warn!("No company tab on {}: {}", url, e);
        }

        match browser.source().await {
            Ok(html) => self.extractor.extract_html(&html, &url, search_state),
            Err(e) => {
                ::log::error!("Could not read source of {}: {}", url, e);
                RawListing::unavailable(&url, search_state)
            }
        }
    }

    /// Navigate to a search page by clicking through the page buttons, then
    /// collect its listing links after checking the browser landed on it
    async fn open_search_page<B: BrowserSession>(
        &self,
        browser: &mut B,
        target: &SearchTarget,
        page_index: u32,
    ) -> Result<CollectedLinks> {
        let policy = &self.config.pagination;

        browser.goto(&target.url).await?;
        random_delay(self.config.delays.search_page, "search page").await;

        for page in policy.click_path(page_index) {
            browser.click_xpath(&policy.click_target(page)).await?;
            random_delay(self.config.delays.page_click, "page click").await;
        }

        let html = browser.source().await?;
        let document = Html::parse_document(&html);
        let expected = page_index.to_string();
        match selected_page(&document, &self.selected_page) {
            Some(found) if found == expected => Ok(self.collector.collect(&document)),
            found => Err(Error::PageMismatch {
                expected: page_index,
                found: found.unwrap_or_else(|| "no selected page".to_string()),
            }),
        }
    }

    /// Crawl one state until the listings processed reach its target count
    /// or a page has no links. Returns the number of listings processed.
    pub async fn crawl_state<B: BrowserSession, W: Write>(
        &self,
        browser: &mut B,
        target: &SearchTarget,
        writer: &mut RawListingWriter<W>,
    ) -> Result<usize> {
        let mut page_index = 1;
        let mut total = 0usize;

        while (total as u64) < target.target_count {
            let links = self.open_search_page(browser, target, page_index).await?;
            ::log::info!("Processing page index {}: {}", page_index, target.url);
            ::log::info!("Found {} links in page index {}", links.count(), page_index);

            if links.is_empty() {
                ::log::warn!(
                    "Stopping {} at page {}: no listing links",
                    target.state,
                    page_index
                );
                break;
            }

            let mut page = Vec::with_capacity(links.count());
            for url in &links.urls {
                page.push(self.scrape_listing(browser, url, &target.state).await);
            }
            writer.append_page(&page)?;

            total += links.count();
            ::log::info!(
                "Finished processing page index {}; total number of jobs processed: {}",
                page_index,
                total
            );
            page_index += 1;
        }

        Ok(total)
    }

    /// Crawl every target in order. A state that fails is logged and the
    /// crawl moves on to the next one. Returns the listings processed.
    pub async fn crawl_all<B: BrowserSession, W: Write>(
        &self,
        browser: &mut B,
        targets: &[SearchTarget],
        writer: &mut RawListingWriter<W>,
    ) -> usize {
        let mut total = 0;
        for (i, target) in targets.iter().enumerate() {
            ::log::info!("Scraping state No. {}: {}", i, target.state);
            match self.crawl_state(browser, target, writer).await {
                Ok(count) => total += count,
                Err(e) => {
                    ::log::error!("Crawl of {} failed: {}", target.state, e);
                    ::log::info!("Moving on to next state");
                }
            }
        }
        total
    }
}

/// Scrape stage: crawl the saved targets into the raw listings CSV
pub async fn run<B: BrowserSession>(browser: &mut B, config: &PipelineConfig) -> Result<usize> {
    let targets = storage::load_targets(&config.paths)?;
    let controller = CrawlController::new(config)?;
    let output = config.paths.raw_listings();
    let mut writer = RawListingWriter::open_append(&output)?;

    let start_time = std::time::Instant::now();
    let total = controller.crawl_all(browser, &targets, &mut writer).await;
    ::log::info!(
        "Crawling complete - {} listings from {} states in {:.2} seconds, written to {}",
        total,
        targets.len(),
        start_time.elapsed().as_secs_f64(),
        output.display()
    );
    Ok(total)
}
