use clap::Parser;
use salary_atlas::Stages;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "salary-atlas")]
#[command(about = "Collects data science job listings and census data, then cleans and analyzes them")]
#[command(version)]
pub struct Args {
    /// Discover search URLs and job counts per state (True/False)
    pub discover: String,

    /// Scrape listings from the discovered search pages (True/False)
    pub scrape: String,

    /// Fetch ACS census data (True/False)
    pub census: String,

    /// Clean the scraped listings (True/False)
    pub clean: String,

    /// Write plot data series and regression fits (True/False)
    pub plot: String,

    /// Run the external regression script (True/False)
    pub regress: String,

    /// JSON configuration file; defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// A stage runs only when its flag is exactly `True`
fn enabled(flag: &str) -> bool {
    flag == "True"
}

impl Args {
    pub fn stages(&self) -> Stages {
        Stages {
            discover: enabled(&self.discover),
            scrape: enabled(&self.scrape),
            census: enabled(&self.census),
            clean: enabled(&self.clean),
            plot: enabled(&self.plot),
            regress: enabled(&self.regress),
        }
    }
}
