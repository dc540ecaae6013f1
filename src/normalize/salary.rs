use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// `$120K`: annual pay in thousands
static ANNUAL_AMOUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\d+)K").unwrap());

/// `$45.50`: hourly pay
static HOURLY_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+\.\d+)").unwrap());

/// 40 hours a week, 52 weeks a year
pub const HOURS_PER_YEAR: f64 = 40.0 * 52.0;

pub const FEDERAL_MINIMUM_WAGE: f64 = 7.25;

/// Federal minimum wage as annual pay in thousands (about 15.08)
pub const MIN_ANNUAL_SALARY: f64 = FEDERAL_MINIMUM_WAGE * HOURS_PER_YEAR / 1000.0;

/// Convert salary text to annual pay in thousands of USD.
///
/// Annual amounts (`$NK`) are used when present, hourly amounts otherwise.
/// One amount is taken as is and two are averaged; any other count is an
/// error because the figure cannot be inferred.
pub fn normalize_salary(text: &str) -> Result<f64> {
    let annual = amounts(&ANNUAL_AMOUNT, text);
    if !annual.is_empty() {
        return point_value(&annual, text);
    }

    let hourly = amounts(&HOURLY_AMOUNT, text);
    let rate = point_value(&hourly, text)?;
    Ok(rate * HOURS_PER_YEAR / 1000.0)
}

fn amounts(pattern: &Regex, text: &str) -> Vec<f64> {
    pattern
        .captures_iter(text)
        .filter_map(|cap| cap.get(1)?.as_str().parse().ok())
        .collect()
}

/// Single amounts pass through, ranges collapse to their midpoint
fn point_value(amounts: &[f64], text: &str) -> Result<f64> {
    match amounts {
        [value] => Ok(*value),
        [low, high] => Ok((low + high) / 2.0),
        _ => Err(Error::SalaryParse {
            text: text.to_string(),
            matches: amounts.len(),
        }),
    }
}
