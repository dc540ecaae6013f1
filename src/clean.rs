use crate::config::PathsConfig;
use crate::error::Result;
use crate::normalize::{CarryForward, MIN_ANNUAL_SALARY, RoleClassifier, normalize_location, normalize_salary};
use crate::results::{CleanedRecord, NA, RawListing};
use crate::storage;
use std::collections::HashSet;

/// Locations that name no workplace; listings there are excluded
const EXCLUDED_LOCATIONS: [&str; 2] = ["Remote", "United States"];

/// How many records each cleaning step removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub input: usize,
    pub duplicates: usize,
    pub missing_salary: usize,
    pub excluded_location: usize,
    pub unparsable_salary: usize,
    pub below_minimum: usize,
    pub unlocated: usize,
    pub output: usize,
}

/// Drop duplicates, listings without a salary, and listings with no
/// designated workplace. Order is preserved.
pub fn pre_process(listings: Vec<RawListing>, report: &mut CleanReport) -> Vec<RawListing> {
    let mut seen: HashSet<[String; 13]> = HashSet::new();
    let mut kept = Vec::with_capacity(listings.len());

    for listing in listings {
        let key = listing.dedup_key().map(str::to_string);
        if !seen.insert(key) {
            report.duplicates += 1;
            continue;
        }
        let salary = listing.salary.trim();
        if salary.is_empty() || salary == NA {
            report.missing_salary += 1;
            continue;
        }
        if EXCLUDED_LOCATIONS.contains(&listing.role_location.trim()) {
            report.excluded_location += 1;
            continue;
        }
        kept.push(listing);
    }

    kept
}

/// Turn raw listings into cleaned records.
///
/// State codes are resolved and carried forward over every pre-processed
/// listing before any salary filtering, so a listing dropped for its salary
/// still passes its state on to the next one.
pub fn clean_listings(
    listings: Vec<RawListing>,
    classifier: &RoleClassifier,
) -> (Vec<CleanedRecord>, CleanReport) {
    let mut report = CleanReport {
        input: listings.len(),
        ..CleanReport::default()
    };

    let listings = pre_process(listings, &mut report);

    let mut fill = CarryForward::new();
    let located: Vec<(RawListing, Option<String>)> = listings
        .into_iter()
        .map(|listing| {
            let state = fill.fill(normalize_location(&listing.role_location));
            (listing, state)
        })
        .collect();

    let mut records = Vec::with_capacity(located.len());
    for (listing, state_code) in located {
        let salary = match normalize_salary(&listing.salary) {
            Ok(salary) => salary,
            Err(e) => {
                ::log::error!("Dropping {}: {}", listing.source_url, e);
                report.unparsable_salary += 1;
                continue;
            }
        };
        if salary < MIN_ANNUAL_SALARY {
            ::log::debug!(
                "Dropping {}: salary {:.2}K below minimum wage",
                listing.source_url,
                salary
            );
            report.below_minimum += 1;
            continue;
        }
        if state_code.is_none() {
            report.unlocated += 1;
        }

        let (seniority, title) = classifier.classify(&listing.offered_role);
        records.push(CleanedRecord {
            listing,
            state_code,
            salary,
            seniority,
            title,
        });
    }

    report.output = records.len();
    (records, report)
}

/// Read the raw listings CSV, clean it and write the cleaned CSV
pub fn run(paths: &PathsConfig) -> Result<CleanReport> {
    let raw_path = paths.raw_listings();
    ::log::info!("Cleaning {}", raw_path.display());

    let listings = storage::read_raw_listings(&raw_path)?;
    let (records, report) = clean_listings(listings, &RoleClassifier::default());

    storage::write_cleaned(&paths.cleaned(), &records)?;
    ::log::info!(
        "Cleaned {} of {} listings ({} duplicates, {} without salary, {} remote, {} unparsable salary, {} below minimum wage)",
        report.output,
        report.input,
        report.duplicates,
        report.missing_salary,
        report.excluded_location,
        report.unparsable_salary,
        report.below_minimum
    );
    if report.unlocated > 0 {
        ::log::warn!("{} cleaned records have no state code", report.unlocated);
    }
    Ok(report)
}
