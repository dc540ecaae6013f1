pub mod analysis;
pub mod census;
pub mod clean;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod parsers;
pub mod plots;
pub mod results;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use results::{CleanedRecord, RawListing, SearchTarget};

/// Which pipeline stages to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stages {
    pub discover: bool,
    pub scrape: bool,
    pub census: bool,
    pub clean: bool,
    pub plot: bool,
    pub regress: bool,
}

impl Stages {
    pub fn all() -> Self {
        Self {
            discover: true,
            scrape: true,
            census: true,
            clean: true,
            plot: true,
            regress: true,
        }
    }

    /// Whether any selected stage drives the browser
    pub fn needs_browser(&self) -> bool {
        self.discover || self.scrape
    }
}

/// Runs the selected stages in order: discover, scrape, census, clean,
/// plot, regress
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self, stages: Stages) -> Result<()> {
        let config = &self.config;

        if stages.needs_browser() {
            let mut client =
                crawlers::web::connect(&config.webdriver_url, config.headless).await?;
            let result = self.run_browser_stages(&mut client, stages).await;
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
            result?;
        }

        if stages.census {
            ::log::info!("Running census fetch...");
            census::run(&config.census, &config.paths).await?;
        }
        if stages.clean {
            ::log::info!("Running data cleaner...");
            clean::run(&config.paths)?;
        }
        if stages.plot {
            ::log::info!("Rendering analysis plots...");
            analysis::run(config)?;
        }
        if stages.regress {
            ::log::info!("Running regression script...");
            analysis::run_external_regression(&config.regression).await?;
        }

        ::log::info!("Execution complete");
        Ok(())
    }

    async fn run_browser_stages<B: crawlers::BrowserSession>(
        &self,
        browser: &mut B,
        stages: Stages,
    ) -> Result<()> {
        if stages.discover {
            ::log::info!("Running URL and job count discovery...");
            let found = crawlers::discover::run(browser, &self.config).await?;
            ::log::info!("Discovered {} of {} states", found, self.config.states.len());
        }
        if stages.scrape {
            ::log::info!("Running listing scraper...");
            crawlers::controller::run(browser, &self.config).await?;
        }
        Ok(())
    }
}
