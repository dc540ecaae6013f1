use super::{compile_selector, first_text};
use crate::config::ListingSelectorConfig;
use crate::error::Result;
use crate::results::{NA, RawListing};
use scraper::{Html, Selector};

/// Compiled selectors for every field of a listing page
struct ListingSelectors {
    banner: Selector,
    star_rating: Selector,
    company_name: Selector,
    offered_role: Selector,
    role_location: Selector,
    salary: Selector,
    info_fields: Selector,
    headquarters: Selector,
    founded: Selector,
    industry: Selector,
    revenue: Selector,
    size: Selector,
    company_type: Selector,
    sector: Selector,
}

/// Fields read from the listing banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerFields {
    pub company_name: String,
    pub star_rating: String,
    pub offered_role: String,
    pub role_location: String,
    pub salary: String,
}

/// Fields read from the company info panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyInfo {
    pub headquarters: String,
    pub founded: String,
    pub industry: String,
    pub revenue: String,
    pub size: String,
    pub company_type: String,
    pub sector: String,
}

impl BannerFields {
    fn missing() -> Self {
        Self {
            company_name: NA.to_string(),
            star_rating: NA.to_string(),
            offered_role: NA.to_string(),
            role_location: NA.to_string(),
            salary: NA.to_string(),
        }
    }
}

impl CompanyInfo {
    fn missing() -> Self {
        Self {
            headquarters: NA.to_string(),
            founded: NA.to_string(),
            industry: NA.to_string(),
            revenue: NA.to_string(),
            size: NA.to_string(),
            company_type: NA.to_string(),
            sector: NA.to_string(),
        }
    }
}

/// Turns a listing page into a `RawListing`.
///
/// Every field is looked up on its own: a field whose element is absent
/// becomes `NA` and the remaining fields are still read.
pub struct ListingExtractor {
    selectors: ListingSelectors,
}

impl ListingExtractor {
    pub fn new(config: &ListingSelectorConfig) -> Result<Self> {
        Ok(Self {
            selectors: ListingSelectors {
                banner: compile_selector(&config.banner)?,
                star_rating: compile_selector(&config.star_rating)?,
                company_name: compile_selector(&config.company_name)?,
                offered_role: compile_selector(&config.offered_role)?,
                role_location: compile_selector(&config.role_location)?,
                salary: compile_selector(&config.salary)?,
                info_fields: compile_selector(&config.info_fields)?,
                headquarters: compile_selector(&config.headquarters)?,
                founded: compile_selector(&config.founded)?,
                industry: compile_selector(&config.industry)?,
                revenue: compile_selector(&config.revenue)?,
                size: compile_selector(&config.size)?,
                company_type: compile_selector(&config.company_type)?,
                sector: compile_selector(&config.sector)?,
            },
        })
    }

    /// Parse page source and extract a listing from it
    pub fn extract_html(&self, html: &str, source_url: &str, search_state: &str) -> RawListing {
        let document = Html::parse_document(html);
        self.extract(&document, source_url, search_state)
    }

    pub fn extract(&self, document: &Html, source_url: &str, search_state: &str) -> RawListing {
        let banner = self.extract_banner(document);
        let info = self.extract_company_info(document);

        RawListing {
            company_name: banner.company_name,
            star_rating: banner.star_rating,
            offered_role: banner.offered_role,
            role_location: banner.role_location,
            salary: banner.salary,
            headquarters: info.headquarters,
            founded: info.founded,
            industry: info.industry,
            revenue: info.revenue,
            size: info.size,
            company_type: info.company_type,
            sector: info.sector,
            source_url: source_url.to_string(),
            search_state: search_state.to_string(),
        }
    }

    pub fn extract_banner(&self, document: &Html) -> BannerFields {
        let s = &self.selectors;
        let Some(banner) = document.select(&s.banner).next() else {
            ::log::error!("Listing banner not found");
            return BannerFields::missing();
        };

        let name_text = first_text(banner, &s.company_name);
        let (company_name, star_rating) = match first_text(banner, &s.star_rating) {
            Some(rating) => match name_text {
                Some(name) => split_rating(&name, &rating),
                None => (NA.to_string(), strip_rating_glyph(&rating)),
            },
            None => (name_text.unwrap_or_else(na), NA.to_string()),
        };

        BannerFields {
            company_name,
            star_rating,
            offered_role: first_text(banner, &s.offered_role).unwrap_or_else(na),
            role_location: first_text(banner, &s.role_location).unwrap_or_else(na),
            salary: first_text(banner, &s.salary).unwrap_or_else(na),
        }
    }

    pub fn extract_company_info(&self, document: &Html) -> CompanyInfo {
        let s = &self.selectors;
        let Some(panel) = document.select(&s.info_fields).next() else {
            ::log::warn!("Company info panel not found");
            return CompanyInfo::missing();
        };

        CompanyInfo {
            headquarters: first_text(panel, &s.headquarters).unwrap_or_else(na),
            founded: first_text(panel, &s.founded).unwrap_or_else(na),
            industry: first_text(panel, &s.industry).unwrap_or_else(na),
            revenue: first_text(panel, &s.revenue).unwrap_or_else(na),
            size: first_text(panel, &s.size).unwrap_or_else(na),
            company_type: first_text(panel, &s.company_type).unwrap_or_else(na),
            sector: first_text(panel, &s.sector).unwrap_or_else(na),
        }
    }
}

fn na() -> String {
    NA.to_string()
}

/// The banner renders the rating inside the company name element, so the
/// name text reads e.g. `Acme Analytics 4.1★`. Returns `(name, rating)` with
/// the rating removed from the name and the rating glyph dropped.
pub fn split_rating(name_text: &str, rating_text: &str) -> (String, String) {
    let rating_text = rating_text.trim();
    let name = if rating_text.is_empty() {
        name_text.trim().to_string()
    } else {
        name_text.replace(rating_text, "").trim().to_string()
    };
    (name, strip_rating_glyph(rating_text))
}

/// `4.1★` -> `4.1`
pub fn strip_rating_glyph(rating_text: &str) -> String {
    rating_text
        .trim()
        .trim_end_matches(|c: char| !c.is_ascii_digit())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_rating() {
        assert_eq!(
            split_rating("Acme Analytics 4.1★", "4.1★"),
            ("Acme Analytics".to_string(), "4.1".to_string())
        );
        assert_eq!(
            split_rating("Acme Analytics4.1★", "4.1★"),
            ("Acme Analytics".to_string(), "4.1".to_string())
        );
    }

    #[test]
    fn test_strip_rating_glyph() {
        assert_eq!(strip_rating_glyph("3.9 ★"), "3.9");
        assert_eq!(strip_rating_glyph("5"), "5");
    }
}
