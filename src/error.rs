use thiserror::Error;

/// Errors raised across the collection, cleaning and analysis stages
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("WebDriver session could not be created: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The salary text did not contain one or two amounts of a single kind
    #[error("cannot parse salary `{text}`: found {matches} amounts")]
    SalaryParse { text: String, matches: usize },

    #[error("expected search page {expected}, browser shows {found}")]
    PageMismatch { expected: u32, found: String },

    #[error("element not found: {0}")]
    MissingElement(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("census response: {0}")]
    Census(String),

    #[error("plot rendering: {0}")]
    Plot(String),

    #[error("regression runner: {0}")]
    Regression(String),
}

pub type Result<T> = std::result::Result<T, Error>;
