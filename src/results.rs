use serde::{Deserialize, Serialize};
use std::fmt;

/// Value stored in any listing field that could not be extracted
pub const NA: &str = "NA";

/// Column header of the raw listings CSV
pub const RAW_HEADER: [&str; 14] = [
    "companyName",
    "company_starRating",
    "company_offeredRole",
    "company_roleLocation",
    "company_salary",
    "companyHQ",
    "company_founded",
    "company_industry",
    "company_revenue",
    "company_size",
    "company_type",
    "company_sector",
    "requested_url",
    "search_state",
];

/// One scraped job listing, every field as the page showed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "company_starRating")]
    pub star_rating: String,
    #[serde(rename = "company_offeredRole")]
    pub offered_role: String,
    #[serde(rename = "company_roleLocation")]
    pub role_location: String,
    #[serde(rename = "company_salary")]
    pub salary: String,
    #[serde(rename = "companyHQ")]
    pub headquarters: String,
    #[serde(rename = "company_founded")]
    pub founded: String,
    #[serde(rename = "company_industry")]
    pub industry: String,
    #[serde(rename = "company_revenue")]
    pub revenue: String,
    #[serde(rename = "company_size")]
    pub size: String,
    #[serde(rename = "company_type")]
    pub company_type: String,
    #[serde(rename = "company_sector")]
    pub sector: String,
    #[serde(rename = "requested_url")]
    pub source_url: String,
    pub search_state: String,
}

impl RawListing {
    /// A listing whose page could not be read: every scraped field is `NA`
    pub fn unavailable(source_url: &str, search_state: &str) -> Self {
        Self {
            company_name: NA.to_string(),
            star_rating: NA.to_string(),
            offered_role: NA.to_string(),
            role_location: NA.to_string(),
            salary: NA.to_string(),
            headquarters: NA.to_string(),
            founded: NA.to_string(),
            industry: NA.to_string(),
            revenue: NA.to_string(),
            size: NA.to_string(),
            company_type: NA.to_string(),
            sector: NA.to_string(),
            source_url: source_url.to_string(),
            search_state: search_state.to_string(),
        }
    }

    /// Every field except the source URL; two listings with equal keys are duplicates
    pub fn dedup_key(&self) -> [&str; 13] {
        [
            self.company_name.as_str(),
            self.star_rating.as_str(),
            self.offered_role.as_str(),
            self.role_location.as_str(),
            self.salary.as_str(),
            self.headquarters.as_str(),
            self.founded.as_str(),
            self.industry.as_str(),
            self.revenue.as_str(),
            self.size.as_str(),
            self.company_type.as_str(),
            self.sector.as_str(),
            self.search_state.as_str(),
        ]
    }

    fn fields(&self) -> [&str; 14] {
        [
            self.company_name.as_str(),
            self.star_rating.as_str(),
            self.offered_role.as_str(),
            self.role_location.as_str(),
            self.salary.as_str(),
            self.headquarters.as_str(),
            self.founded.as_str(),
            self.industry.as_str(),
            self.revenue.as_str(),
            self.size.as_str(),
            self.company_type.as_str(),
            self.sector.as_str(),
            self.source_url.as_str(),
            self.search_state.as_str(),
        ]
    }
}

/// A state-level search to crawl: where it starts and how many listings it advertised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTarget {
    pub state: String,
    pub url: String,
    pub target_count: u64,
}

/// Seniority bucket derived from the offered role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Seniority {
    #[serde(rename = "senior")]
    Senior,
    #[serde(rename = "junior")]
    Junior,
    #[serde(rename = "intern")]
    Intern,
    #[serde(rename = "no prefix")]
    NoPrefix,
}

impl Seniority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Senior => "senior",
            Seniority::Junior => "junior",
            Seniority::Intern => "intern",
            Seniority::NoPrefix => "no prefix",
        }
    }
}

/// Job title family derived from the offered role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TitleFamily {
    #[serde(rename = "professor")]
    Professor,
    #[serde(rename = "research_scientist")]
    ResearchScientist,
    #[serde(rename = "machine_learning_engineer")]
    MachineLearningEngineer,
    #[serde(rename = "business_analytics")]
    BusinessAnalytics,
    #[serde(rename = "software_engineer")]
    SoftwareEngineer,
    #[serde(rename = "data_engineer")]
    DataEngineer,
    #[serde(rename = "data_analytics")]
    DataAnalytics,
    #[serde(rename = "data_science")]
    DataScience,
    #[serde(rename = "other title")]
    Other,
}

impl TitleFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            TitleFamily::Professor => "professor",
            TitleFamily::ResearchScientist => "research_scientist",
            TitleFamily::MachineLearningEngineer => "machine_learning_engineer",
            TitleFamily::BusinessAnalytics => "business_analytics",
            TitleFamily::SoftwareEngineer => "software_engineer",
            TitleFamily::DataEngineer => "data_engineer",
            TitleFamily::DataAnalytics => "data_analytics",
            TitleFamily::DataScience => "data_science",
            TitleFamily::Other => "other title",
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TitleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column header of the cleaned CSV
pub const CLEANED_HEADER: [&str; 18] = [
    "companyName",
    "company_starRating",
    "company_offeredRole",
    "company_roleLocation",
    "company_salary_raw",
    "companyHQ",
    "company_founded",
    "company_industry",
    "company_revenue",
    "company_size",
    "company_type",
    "company_sector",
    "requested_url",
    "search_state",
    "state_code",
    "company_salary",
    "job_seniority",
    "job_title",
];

/// A listing that survived cleaning, with its derived fields
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub listing: RawListing,

    /// Two-letter state; `None` only when no earlier record had one to carry forward
    pub state_code: Option<String>,

    /// Annual salary in thousands of USD
    pub salary: f64,

    pub seniority: Seniority,
    pub title: TitleFamily,
}

impl CleanedRecord {
    /// Fields in `CLEANED_HEADER` order
    pub fn to_row(&self) -> Vec<String> {
        let mut row: Vec<String> = self.listing.fields().iter().map(|s| s.to_string()).collect();
        row.push(self.state_code.clone().unwrap_or_default());
        row.push(self.salary.to_string());
        row.push(self.seniority.to_string());
        row.push(self.title.to_string());
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_listing_keeps_url_and_state() {
        let listing = RawListing::unavailable("https://example.com/x", "TX");
        assert_eq!(listing.company_name, NA);
        assert_eq!(listing.salary, NA);
        assert_eq!(listing.source_url, "https://example.com/x");
        assert_eq!(listing.search_state, "TX");
    }

    #[test]
    fn test_dedup_key_ignores_source_url() {
        let a = RawListing::unavailable("https://example.com/a", "TX");
        let b = RawListing::unavailable("https://example.com/b", "TX");
        let c = RawListing::unavailable("https://example.com/a", "CA");
        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_ne!(a.dedup_key(), c.dedup_key());
    }

    #[test]
    fn test_cleaned_row_matches_header() {
        let record = CleanedRecord {
            listing: RawListing::unavailable("u", "TX"),
            state_code: Some("TX".to_string()),
            salary: 120.5,
            seniority: Seniority::NoPrefix,
            title: TitleFamily::Other,
        };
        let row = record.to_row();
        assert_eq!(row.len(), CLEANED_HEADER.len());
        assert_eq!(row[14], "TX");
        assert_eq!(row[15], "120.5");
        assert_eq!(row[16], "no prefix");
        assert_eq!(row[17], "other title");
    }
}
