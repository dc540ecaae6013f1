use clap::Parser;
use env_logger::Env;
use salary_atlas::{Pipeline, PipelineConfig};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Parse command-line arguments
    let args = Args::parse();

    ::log::info!("Url job count scraper: {}", args.discover);
    ::log::info!("Listing scraper: {}", args.scrape);
    ::log::info!("ACS scraper: {}", args.census);
    ::log::info!("Data cleaner: {}", args.clean);
    ::log::info!("Analysis plotting: {}", args.plot);
    ::log::info!("Regression runner: {}", args.regress);

    let config = match PipelineConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let stages = args.stages();
    if stages.needs_browser() {
        ::log::info!(
            "Browser stages need a WebDriver server (e.g. ChromeDriver) at {}; set WEBDRIVER_URL to change it",
            config.webdriver_url
        );
    }

    let start_time = std::time::Instant::now();
    if let Err(e) = Pipeline::new(config).run(stages).await {
        ::log::error!("Pipeline failed: {}", e);
        std::process::exit(1);
    }
    ::log::info!(
        "Finished in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );
}
