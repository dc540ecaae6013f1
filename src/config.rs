use crate::crawlers::pagination::PaginationPolicy;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Top-level configuration for every pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// URL for the WebDriver instance
    pub webdriver_url: String,

    /// Run the browser without a visible window
    pub headless: bool,

    /// Locations searched during discovery, qualified where an abbreviation
    /// collides with a city name
    pub states: Vec<String>,

    /// Where persisted files are written
    pub paths: PathsConfig,

    /// Job site addresses and element locations
    pub site: SiteConfig,

    /// Randomized waits between browser actions
    pub delays: DelayConfig,

    /// How the crawler clicks through search result pages
    pub pagination: PaginationPolicy,

    /// Census API request settings
    pub census: CensusConfig,

    /// Image size, font and map selection for the plot stage
    pub plots: PlotConfig,

    /// External regression script
    pub regression: RegressionConfig,
}

/// File locations for persisted data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding scraped, census and cleaned data
    pub data_dir: PathBuf,

    /// Directory receiving each plot image and its data series
    pub plots_dir: PathBuf,
}

/// Job site addresses and the locations of the elements the scraper reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base used to absolutize listing links
    pub base_url: String,

    /// Page holding the keyword/location search form
    pub search_index_url: String,

    /// Job keyword typed into the search form
    pub keyword: String,

    pub keyword_input_xpath: String,
    pub location_input_xpath: String,
    pub submit_xpath: String,

    /// Heading that advertises the number of results
    pub job_count_xpath: String,

    /// Tab that reveals the company info panel on a listing page
    pub company_tab_xpath: String,

    /// Regex an href must match to count as a listing link
    pub listing_url_pattern: String,

    /// Regexes for listing hrefs to skip, e.g. sponsored placements
    pub listing_exclude_patterns: Vec<String>,

    /// CSS selectors for the listing page fields
    pub listing: ListingSelectorConfig,
}

/// CSS selectors locating each field of a listing page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectorConfig {
    pub banner: String,
    pub star_rating: String,
    pub company_name: String,
    pub offered_role: String,
    pub role_location: String,
    pub salary: String,
    pub info_fields: String,
    pub headquarters: String,
    pub founded: String,
    pub industry: String,
    pub revenue: String,
    pub size: String,
    pub company_type: String,
    pub sector: String,
}

/// Inclusive range of seconds a randomized wait is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// A range that never waits, used by tests
    pub const fn none() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Randomized waits inserted between browser actions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// After loading a state's search page
    pub search_page: DelayRange,

    /// After each pagination click
    pub page_click: DelayRange,

    /// After loading a listing page
    pub listing: DelayRange,

    /// After submitting a discovery search, and again after reading it back
    pub discovery: DelayRange,
}

impl DelayConfig {
    /// Zero-length waits everywhere
    pub fn none() -> Self {
        Self {
            search_page: DelayRange::none(),
            page_click: DelayRange::none(),
            listing: DelayRange::none(),
            discovery: DelayRange::none(),
        }
    }
}

/// One ACS profile variable and the column it is stored under
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CensusField {
    /// ACS variable code, e.g. `DP03_0062E`
    pub code: String,

    /// Column name in the census CSV
    pub column: String,

    /// Human-readable name used in plot titles
    pub title: String,
}

/// Census API request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusConfig {
    pub endpoint: String,
    pub year: u16,

    /// API key; overridden by `CENSUS_API_KEY` when set
    pub api_key: String,

    pub fields: Vec<CensusField>,
}

/// Rendering settings for the plot stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,

    /// TrueType/OpenType font for titles and labels. Plots are drawn
    /// without text when it is unset or unreadable.
    pub font_path: Option<PathBuf>,

    /// Census columns drawn as per-state maps, next to the salary map
    pub map_fields: Vec<String>,
}

/// External regression script run by the last stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    pub command: String,
    pub script: PathBuf,
}

impl PipelineConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise, then apply
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// `WEBDRIVER_URL` and `CENSUS_API_KEY` take precedence over the file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        if let Ok(key) = std::env::var("CENSUS_API_KEY") {
            if !key.is_empty() {
                self.census.api_key = key;
            }
        }
    }
}

impl PathsConfig {
    pub fn state_urls(&self) -> PathBuf {
        self.data_dir.join("state_url.txt")
    }

    pub fn state_counts(&self) -> PathBuf {
        self.data_dir.join("state_jobs_count.json")
    }

    pub fn raw_listings(&self) -> PathBuf {
        self.data_dir.join("job_search_data.csv")
    }

    pub fn cleaned(&self) -> PathBuf {
        self.data_dir.join("cleaned_data.csv")
    }

    pub fn census(&self) -> PathBuf {
        self.data_dir.join("ACS_data.csv")
    }
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Default search locations. LA, NY-style collisions with city names are
/// avoided by searching "<State>, US" instead.
fn default_states() -> Vec<String> {
    [
        "AK", "AL", "AR", "AZ", "CA", "CO", "CT", "DC", "Delaware, US", "FL", "GA", "HI", "IA",
        "Idaho, US", "IL", "Indiana, US", "Kansas, US", "KY", "Louisiana, US",
        "Massachusetts, US", "MD", "ME", "MI", "MN", "MO", "MS", "MT", "NC", "ND", "NE",
        "New Hampshire, US", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA",
        "Rhode Island, US", "SC", "South Dakota, US", "TN", "TX", "UT", "VA", "VT", "WA", "WI",
        "WV", "WY",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_census_fields() -> Vec<CensusField> {
    [
        ("DP02_0018E", "state_pop_in_hh", "Population in Households"),
        ("DP02_0068PE", "state_pct_college", "Percentage of College"),
        (
            "DP03_0039PE",
            "state_pct_emp_tech",
            "Percentage Employed in Information Industry",
        ),
        ("DP03_0062E", "state_med_income", "Median Income"),
        (
            "DP04_0101E",
            "state_med_owner_cost",
            "Median Monthly House Owner Cost",
        ),
        ("DP04_0134E", "state_med_rent", "Median Gross Rent"),
    ]
    .iter()
    .map(|(code, column, title)| CensusField {
        code: code.to_string(),
        column: column.to_string(),
        title: title.to_string(),
    })
    .collect()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
            states: default_states(),
            paths: PathsConfig::default(),
            site: SiteConfig::default(),
            delays: DelayConfig::default(),
            pagination: PaginationPolicy::default(),
            census: CensusConfig::default(),
            plots: PlotConfig::default(),
            regression: RegressionConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            plots_dir: PathBuf::from("plots"),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.glassdoor.com".to_string(),
            search_index_url: "https://www.glassdoor.com/Job/index.htm".to_string(),
            keyword: "data science".to_string(),
            keyword_input_xpath: r#"//input[@id="KeywordSearch"]"#.to_string(),
            location_input_xpath: r#"//input[@id="LocationSearch"]"#.to_string(),
            submit_xpath: r#"//button[@type="submit"]"#.to_string(),
            job_count_xpath: r#"//h1[@data-test="jobCount-H1title"]"#.to_string(),
            company_tab_xpath: "//*[text()='Company']".to_string(),
            listing_url_pattern: r"/partner/jobListing\.htm\?".to_string(),
            listing_exclude_patterns: Vec::new(),
            listing: ListingSelectorConfig::default(),
        }
    }
}

impl Default for ListingSelectorConfig {
    fn default() -> Self {
        Self {
            banner: "div.css-ur1szg.e11nt52q0".to_string(),
            star_rating: "span.css-1pmc6te.e11nt52q4".to_string(),
            company_name: "div.css-16nw49e.e11nt52q1".to_string(),
            offered_role: "div.css-17x2pwl.e11nt52q6".to_string(),
            role_location: "div.css-1v5elnn.e11nt52q2".to_string(),
            salary: "span.small.css-10zcshf.e1v3ed7e1".to_string(),
            info_fields: "div#InfoFields".to_string(),
            headquarters: r#"span[id="headquarters"]"#.to_string(),
            founded: r#"span[id="yearFounded"]"#.to_string(),
            industry: r#"span[id="primaryIndustry.industryName"]"#.to_string(),
            revenue: r#"span[id="revenue"]"#.to_string(),
            size: r#"span[id="size"]"#.to_string(),
            company_type: r#"span[id="type"]"#.to_string(),
            sector: r#"span[id="primaryIndustry.sectorName"]"#.to_string(),
        }
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            search_page: DelayRange::new(10.11, 14.86),
            page_click: DelayRange::new(3.0, 4.0),
            listing: DelayRange::new(10.23, 19.41),
            discovery: DelayRange::new(5.0, 5.0),
        }
    }
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.census.gov/data".to_string(),
            year: 2021,
            api_key: String::new(),
            fields: default_census_fields(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            font_path: Some(PathBuf::from(
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            )),
            map_fields: vec!["state_med_owner_cost".to_string()],
        }
    }
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            command: "Rscript".to_string(),
            script: PathBuf::from("Regressions.R"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let json = r#"{
            "webdriver_url": "http://localhost:9515",
            "paths": { "data_dir": "out" },
            "delays": { "listing": { "min_secs": 1.0, "max_secs": 2.0 } }
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert_eq!(config.paths.data_dir, PathBuf::from("out"));
        assert_eq!(config.paths.plots_dir, PathBuf::from("plots"));
        assert_eq!(config.delays.listing, DelayRange::new(1.0, 2.0));
        assert_eq!(config.delays.page_click, DelayRange::new(3.0, 4.0));
        assert_eq!(config.states.len(), 51);
        assert_eq!(config.census.fields.len(), 6);
        assert_eq!(config.pagination.first_jump, 5);
        assert_eq!(config.plots.map_fields, vec!["state_med_owner_cost"]);
        assert_eq!((config.plots.width, config.plots.height), (1000, 600));
    }

    #[test]
    fn test_paths_resolve_under_data_dir() {
        let paths = PathsConfig {
            data_dir: PathBuf::from("/tmp/run"),
            plots_dir: PathBuf::from("/tmp/plots"),
        };
        assert_eq!(paths.raw_listings(), PathBuf::from("/tmp/run/job_search_data.csv"));
        assert_eq!(paths.state_counts(), PathBuf::from("/tmp/run/state_jobs_count.json"));
    }

    #[test]
    fn test_ambiguous_states_are_qualified() {
        let states = default_states();
        assert!(states.contains(&"Louisiana, US".to_string()));
        assert!(!states.contains(&"LA".to_string()));
    }
}
