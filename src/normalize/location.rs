use super::tables::{location_override, state_abbreviation};

/// Map a listing location to a state code.
///
/// `"Austin, TX"` gives `TX`, a bare full state name gives its abbreviation,
/// and anything else is unknown (`None`) and left for carry-forward fill.
pub fn normalize_location(location: &str) -> Option<String> {
    let location = location.trim();
    if let Some(state) = location_override(location) {
        return Some(state.to_string());
    }

    let segments: Vec<&str> = location.split(',').map(str::trim).collect();
    if segments.len() > 1 {
        let state = segments[1];
        return (!state.is_empty()).then(|| state.to_string());
    }

    state_abbreviation(segments[0]).map(str::to_string)
}

/// Replaces unknown values with the most recent known one, in record order
#[derive(Debug, Default)]
pub struct CarryForward {
    last: Option<String>,
}

impl CarryForward {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(&mut self, value: Option<String>) -> Option<String> {
        match value {
            Some(value) => {
                self.last = Some(value.clone());
                Some(value)
            }
            None => self.last.clone(),
        }
    }
}
