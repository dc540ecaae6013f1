//! Fixed lookup tables used by the normalizers.
//!
//! Keyword tables are ordered: classification walks them front to back, so
//! an entry's position is part of its meaning.

use crate::results::{Seniority, TitleFamily};

/// Ordered category -> keywords mapping. Keywords are stored lower-cased and
/// matched as substrings of lower-cased text.
#[derive(Debug, Clone)]
pub struct KeywordTable<K> {
    entries: Vec<(K, Vec<String>)>,
}

impl<K: Copy> KeywordTable<K> {
    pub fn new(entries: Vec<(K, Vec<&str>)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, words)| (key, words.into_iter().map(str::to_lowercase).collect()))
                .collect(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (K, &[String])> {
        self.entries.iter().map(|(key, words)| (*key, words.as_slice()))
    }

    /// Earliest category with a keyword in `text`; the scan stops there
    pub fn first_match(&self, text: &str) -> Option<K> {
        let text = text.to_lowercase();
        self.entries
            .iter()
            .find(|(_, words)| words.iter().any(|w| text.contains(w.as_str())))
            .map(|(key, _)| *key)
    }

    /// Latest category with a keyword in `text`; every entry is scanned and a
    /// later match replaces an earlier one
    pub fn last_match(&self, text: &str) -> Option<K> {
        let text = text.to_lowercase();
        let mut found = None;
        for (key, words) in &self.entries {
            if words.iter().any(|w| text.contains(w.as_str())) {
                found = Some(*key);
            }
        }
        found
    }
}

/// Title families in priority order
pub fn title_families() -> KeywordTable<TitleFamily> {
    KeywordTable::new(vec![
        (TitleFamily::Professor, vec!["professor", "prof.", "instructor", "teacher"]),
        (TitleFamily::ResearchScientist, vec!["research scientist"]),
        (
            TitleFamily::MachineLearningEngineer,
            vec!["machine learning", "ml ", "mle ", "ai ", "deep learning"],
        ),
        (
            TitleFamily::BusinessAnalytics,
            vec![
                "business analytics",
                "business analyst",
                "business data analyst",
                "business intelligence",
                "bi ",
            ],
        ),
        (
            TitleFamily::SoftwareEngineer,
            vec!["software engineer", "software developer", "sde"],
        ),
        (TitleFamily::DataEngineer, vec!["data engineer", "data architect"]),
        (
            TitleFamily::DataAnalytics,
            vec!["data analytics", "data analyst", "data analysis"],
        ),
        (TitleFamily::DataScience, vec!["data science", "data scientist"]),
    ])
}

/// Seniority buckets in scan order
pub fn seniority_levels() -> KeywordTable<Seniority> {
    KeywordTable::new(vec![
        (
            Seniority::Senior,
            vec!["senior", "sr", "manager", "director", "principal", "staff", "lead", "founding"],
        ),
        (Seniority::Junior, vec!["junior", "jr"]),
        (Seniority::Intern, vec!["intern", "co-op"]),
    ])
}

/// Locations mapped to a state before any other location rule runs
pub const LOCATION_OVERRIDES: [(&str, &str); 1] = [("Montgomery", "AL")];

/// Full state name -> two-letter abbreviation
pub const STATE_ABBREVIATIONS: [(&str, &str); 51] = [
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
    ("District of Columbia", "DC"),
];

/// Census FIPS state code -> two-letter abbreviation
pub const STATE_FIPS: [(&str, &str); 52] = [
    ("01", "AL"),
    ("02", "AK"),
    ("04", "AZ"),
    ("05", "AR"),
    ("06", "CA"),
    ("08", "CO"),
    ("09", "CT"),
    ("10", "DE"),
    ("11", "DC"),
    ("12", "FL"),
    ("13", "GA"),
    ("15", "HI"),
    ("16", "ID"),
    ("17", "IL"),
    ("18", "IN"),
    ("19", "IA"),
    ("20", "KS"),
    ("21", "KY"),
    ("22", "LA"),
    ("23", "ME"),
    ("24", "MD"),
    ("25", "MA"),
    ("26", "MI"),
    ("27", "MN"),
    ("28", "MS"),
    ("29", "MO"),
    ("30", "MT"),
    ("31", "NE"),
    ("32", "NV"),
    ("33", "NH"),
    ("34", "NJ"),
    ("35", "NM"),
    ("36", "NY"),
    ("37", "NC"),
    ("38", "ND"),
    ("39", "OH"),
    ("40", "OK"),
    ("41", "OR"),
    ("42", "PA"),
    ("44", "RI"),
    ("45", "SC"),
    ("46", "SD"),
    ("47", "TN"),
    ("48", "TX"),
    ("49", "UT"),
    ("50", "VT"),
    ("51", "VA"),
    ("53", "WA"),
    ("54", "WV"),
    ("55", "WI"),
    ("56", "WY"),
    ("72", "PR"),
];

pub fn state_abbreviation(name: &str) -> Option<&'static str> {
    STATE_ABBREVIATIONS
        .iter()
        .find(|(full, _)| *full == name)
        .map(|(_, abbrev)| *abbrev)
}

pub fn location_override(location: &str) -> Option<&'static str> {
    LOCATION_OVERRIDES
        .iter()
        .find(|(place, _)| *place == location)
        .map(|(_, abbrev)| *abbrev)
}

pub fn fips_abbreviation(code: &str) -> Option<&'static str> {
    STATE_FIPS
        .iter()
        .find(|(fips, _)| *fips == code)
        .map(|(_, abbrev)| *abbrev)
}
