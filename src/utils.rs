use crate::config::DelayRange;
use rand::Rng;
use std::time::Duration;

/// Draw a wait from `range`, log it under `label` and sleep for it
pub async fn random_delay(range: DelayRange, label: &str) {
    let wait = pick_delay(range);
    if wait.is_zero() {
        return;
    }
    ::log::debug!("Waiting {:.2}s ({})", wait.as_secs_f64(), label);
    tokio::time::sleep(wait).await;
}

/// Draw a duration uniformly from `range`; an inverted range collapses to its minimum
pub fn pick_delay(range: DelayRange) -> Duration {
    let min = range.min_secs.max(0.0);
    let max = range.max_secs.max(min);
    let secs = rand::thread_rng().gen_range(min..=max);
    Duration::from_secs_f64(secs)
}

/// Convert a plot title to a sanitized filename
pub fn sanitize_filename(title: &str) -> String {
    let mut name = title.trim().replace(['/', ':', '?', '&', '=', '#', '%', '\\'], "_");
    name = name.replace(char::is_whitespace, "_");

    // Limit filename length
    if name.chars().count() > 100 {
        name.chars().take(100).collect()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_delay_stays_in_range() {
        let range = DelayRange::new(3.0, 4.0);
        for _ in 0..50 {
            let secs = pick_delay(range).as_secs_f64();
            assert!((3.0..=4.0).contains(&secs), "{} outside range", secs);
        }
    }

    #[test]
    fn test_pick_delay_degenerate_ranges() {
        assert!(pick_delay(DelayRange::none()).is_zero());
        assert_eq!(pick_delay(DelayRange::new(5.0, 5.0)), Duration::from_secs(5));
        assert_eq!(pick_delay(DelayRange::new(2.0, 1.0)), Duration::from_secs(2));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("Avg Salary of DS Jobs and Median Income"),
            "Avg_Salary_of_DS_Jobs_and_Median_Income"
        );
        assert_eq!(sanitize_filename("a/b:c?d"), "a_b_c_d");
        assert_eq!(sanitize_filename(&"x".repeat(150)).len(), 100);
    }
}
