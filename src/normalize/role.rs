use super::tables::{KeywordTable, seniority_levels, title_families};
use crate::results::{Seniority, TitleFamily};

/// Classifies offered-role text into a (seniority, title family) pair.
///
/// The title scan stops at the first family with a matching keyword. The
/// seniority scan runs over the whole table, so the last matching bucket wins.
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    titles: KeywordTable<TitleFamily>,
    seniority: KeywordTable<Seniority>,
}

impl RoleClassifier {
    pub fn new(titles: KeywordTable<TitleFamily>, seniority: KeywordTable<Seniority>) -> Self {
        Self { titles, seniority }
    }

    pub fn classify(&self, role: &str) -> (Seniority, TitleFamily) {
        (self.seniority(role), self.title(role))
    }

    pub fn title(&self, role: &str) -> TitleFamily {
        self.titles.first_match(role).unwrap_or(TitleFamily::Other)
    }

    pub fn seniority(&self, role: &str) -> Seniority {
        self.seniority.last_match(role).unwrap_or(Seniority::NoPrefix)
    }
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self::new(title_families(), seniority_levels())
    }
}
