//! Per-state search submission yielding a search URL and a result count.

use super::crawler::BrowserSession;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::results::SearchTarget;
use crate::storage;
use crate::utils::random_delay;
use regex::Regex;
use std::sync::LazyLock;

static FIRST_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// First integer in a results heading such as `1,234 data science jobs`
pub fn parse_job_count(text: &str) -> Option<u64> {
    let digits = text.replace(',', "");
    FIRST_INTEGER
        .find(&digits)
        .and_then(|m| m.as_str().parse().ok())
}

/// Submit one search and read back where it landed
pub async fn discover_state<B: BrowserSession>(
    browser: &mut B,
    config: &PipelineConfig,
    state: &str,
) -> Result<SearchTarget> {
    let site = &config.site;

    browser.goto(&site.search_index_url).await?;
    browser.fill_xpath(&site.keyword_input_xpath, &site.keyword).await?;
    browser.clear_xpath(&site.location_input_xpath).await?;
    browser.fill_xpath(&site.location_input_xpath, state).await?;
    browser.click_xpath(&site.submit_xpath).await?;
    random_delay(config.delays.discovery, "search submitted").await;
    browser.switch_to_newest_window().await?;

    let url = browser.current_url().await?;
    let heading = browser.text_xpath(&site.job_count_xpath).await?;
    let target_count = parse_job_count(&heading)
        .ok_or_else(|| Error::InvalidData(format!("no job count in `{}`", heading)))?;
    random_delay(config.delays.discovery, "job count read").await;

    Ok(SearchTarget {
        state: state.to_string(),
        url,
        target_count,
    })
}

/// Discover a target for every configured state. A state that fails is
/// logged and left out, so URLs and counts stay paired.
pub async fn discover_targets<B: BrowserSession>(
    browser: &mut B,
    config: &PipelineConfig,
) -> Vec<SearchTarget> {
    let mut targets = Vec::with_capacity(config.states.len());
    for (i, state) in config.states.iter().enumerate() {
        ::log::info!("Discovering state No. {}: {}", i, state);
        match discover_state(browser, config, state).await {
            Ok(target) => {
                ::log::info!("{}: {} jobs at {}", state, target.target_count, target.url);
                targets.push(target);
            }
            Err(e) => ::log::error!("Discovery failed for {}: {}", state, e),
        }
    }
    targets
}

/// Discovery stage: search every state and persist the targets
pub async fn run<B: BrowserSession>(browser: &mut B, config: &PipelineConfig) -> Result<usize> {
    let targets = discover_targets(browser, config).await;
    storage::save_targets(&config.paths, &targets)?;
    Ok(targets.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DelayConfig;
    use std::collections::HashMap;

    /// Answers discovery searches from a table of location -> heading text
    struct FakeSearch {
        headings: HashMap<String, String>,
        location: String,
        typed: Vec<(String, String)>,
    }

    impl FakeSearch {
        fn new(headings: &[(&str, &str)]) -> Self {
            Self {
                headings: headings
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                location: String::new(),
                typed: Vec::new(),
            }
        }
    }

    impl BrowserSession for FakeSearch {
        async fn goto(&mut self, _url: &str) -> Result<()> {
            self.location.clear();
            Ok(())
        }

        async fn source(&mut self) -> Result<String> {
            Ok(String::new())
        }

        async fn click_xpath(&mut self, _xpath: &str) -> Result<()> {
            Ok(())
        }

        async fn fill_xpath(&mut self, xpath: &str, text: &str) -> Result<()> {
            self.typed.push((xpath.to_string(), text.to_string()));
            if xpath.contains("LocationSearch") {
                self.location.push_str(text);
            }
            Ok(())
        }

        async fn clear_xpath(&mut self, _xpath: &str) -> Result<()> {
            self.location.clear();
            Ok(())
        }

        async fn text_xpath(&mut self, xpath: &str) -> Result<String> {
            self.headings
                .get(&self.location)
                .cloned()
                .ok_or_else(|| Error::MissingElement(xpath.to_string()))
        }

        async fn current_url(&mut self) -> Result<String> {
            Ok(format!("https://jobs.example.com/search?loc={}", self.location))
        }

        async fn switch_to_newest_window(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn config_for(states: &[&str]) -> PipelineConfig {
        PipelineConfig {
            states: states.iter().map(|s| s.to_string()).collect(),
            delays: DelayConfig::none(),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_parse_job_count() {
        assert_eq!(parse_job_count("1,234 data science jobs in Texas"), Some(1234));
        assert_eq!(parse_job_count("87 Jobs"), Some(87));
        assert_eq!(parse_job_count("Top jobs 2 of 40"), Some(2));
        assert_eq!(parse_job_count("No jobs"), None);
    }

    #[tokio::test]
    async fn test_failed_state_is_skipped() {
        let mut browser = FakeSearch::new(&[("TX", "1,020 jobs"), ("WY", "9 jobs")]);
        let config = config_for(&["TX", "Louisiana, US", "WY"]);

        let targets = discover_targets(&mut browser, &config).await;

        let states: Vec<_> = targets.iter().map(|t| t.state.as_str()).collect();
        assert_eq!(states, vec!["TX", "WY"]);
        assert_eq!(targets[0].target_count, 1020);
        assert_eq!(targets[1].url, "https://jobs.example.com/search?loc=WY");
    }

    #[tokio::test]
    async fn test_keyword_and_location_are_typed() {
        let mut browser = FakeSearch::new(&[("Louisiana, US", "15 jobs")]);
        let config = config_for(&["Louisiana, US"]);

        discover_targets(&mut browser, &config).await;

        assert_eq!(browser.typed[0].1, "data science");
        assert_eq!(browser.typed[1].1, "Louisiana, US");
    }

    #[tokio::test]
    async fn test_run_persists_targets() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(&["TX", "CA"]);
        config.paths.data_dir = dir.path().to_path_buf();
        let mut browser = FakeSearch::new(&[("TX", "120 jobs"), ("CA", "45 jobs")]);

        assert_eq!(run(&mut browser, &config).await.unwrap(), 2);

        let loaded = storage::load_targets(&config.paths).unwrap();
        assert_eq!(loaded[0].state, "TX");
        assert_eq!(loaded[1].target_count, 45);
    }
}
