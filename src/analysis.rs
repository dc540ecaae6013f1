//! Aggregates cleaned listings against the census data, renders each plot
//! with its data series, and writes the weighted regression fits.

use crate::config::{CensusField, PathsConfig, PipelineConfig, RegressionConfig};
use crate::error::{Error, Result};
use crate::plots::{self, PlotStyle};
use crate::storage;
use crate::utils::sanitize_filename;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// The columns of the cleaned CSV the analysis reads
#[derive(Debug, Clone, Deserialize)]
pub struct SalaryRecord {
    pub state_code: Option<String>,
    #[serde(rename = "company_salary")]
    pub salary: f64,
    pub job_title: String,
    pub job_seniority: String,
}

/// Mean salary and listing count for one state
#[derive(Debug, Clone, PartialEq)]
pub struct StateSummary {
    pub state: String,
    pub mean_salary: f64,
    pub count: usize,
}

/// Mean salary of one category
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub group: String,
    pub mean_salary: f64,
}

/// A state summary joined with that state's census values
#[derive(Debug, Clone, PartialEq)]
pub struct StateProfile {
    pub summary: StateSummary,
    /// One value per census field, `None` where the census reported nothing
    pub census: Vec<Option<f64>>,
}

/// Weighted least-squares line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedFit {
    pub slope: f64,
    pub intercept: f64,
}

impl WeightedFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Regression of state mean salary on one census variable, weighted by
/// listing count
#[derive(Debug, Clone, Serialize)]
pub struct RegressionResult {
    pub variable: String,
    pub title: String,
    pub observations: usize,
    pub fit: Option<WeightedFit>,
}

/// Five-number summary plus mean, as a box plot shows it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Group salaries by state code; listings without one are left out.
/// States come back in alphabetical order.
pub fn summarize_states(records: &[SalaryRecord]) -> Vec<StateSummary> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in records {
        if let Some(state) = record.state_code.as_deref().filter(|s| !s.is_empty()) {
            let entry = groups.entry(state).or_default();
            entry.0 += record.salary;
            entry.1 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(state, (sum, count))| StateSummary {
            state: state.to_string(),
            mean_salary: sum / count as f64,
            count,
        })
        .collect()
}

/// Mean salary per category, lowest first
pub fn mean_by<F>(records: &[SalaryRecord], key: F) -> Vec<GroupMean>
where
    F: Fn(&SalaryRecord) -> &str,
{
    let mut groups: HashMap<&str, (f64, usize)> = HashMap::new();
    for record in records {
        let entry = groups.entry(key(record)).or_default();
        entry.0 += record.salary;
        entry.1 += 1;
    }
    let mut means: Vec<GroupMean> = groups
        .into_iter()
        .map(|(group, (sum, count))| GroupMean {
            group: group.to_string(),
            mean_salary: sum / count as f64,
        })
        .collect();
    means.sort_by(|a, b| {
        a.mean_salary
            .total_cmp(&b.mean_salary)
            .then_with(|| a.group.cmp(&b.group))
    });
    means
}

/// Weighted least squares of `y` on `x`. `None` when the weights sum to zero
/// or `x` does not vary.
pub fn weighted_fit(x: &[f64], y: &[f64], w: &[f64]) -> Option<WeightedFit> {
    let n = x.len().min(y.len()).min(w.len());
    let total: f64 = w[..n].iter().sum();
    if n == 0 || total <= 0.0 {
        return None;
    }
    let x_mean = (0..n).map(|i| w[i] * x[i]).sum::<f64>() / total;
    let y_mean = (0..n).map(|i| w[i] * y[i]).sum::<f64>() / total;
    let sxx: f64 = (0..n).map(|i| w[i] * (x[i] - x_mean).powi(2)).sum();
    if sxx <= f64::EPSILON {
        return None;
    }
    let sxy: f64 = (0..n).map(|i| w[i] * (x[i] - x_mean) * (y[i] - y_mean)).sum();
    let slope = sxy / sxx;
    Some(WeightedFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Linear-interpolated quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

pub fn distribution(values: &[f64]) -> Option<Distribution> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(Distribution {
        count: sorted.len(),
        mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

pub fn read_salary_records(path: &Path) -> Result<Vec<SalaryRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Census values by state abbreviation, one slot per field
pub fn read_census(path: &Path, fields: &[CensusField]) -> Result<HashMap<String, Vec<Option<f64>>>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::InvalidData(format!("{} has no column {}", path.display(), name)))
    };
    let state_col = column("state")?;
    let field_cols = fields
        .iter()
        .map(|f| column(&f.column))
        .collect::<Result<Vec<_>>>()?;

    let mut census = HashMap::new();
    for row in reader.records() {
        let row = row?;
        let values = field_cols
            .iter()
            .map(|&i| row.get(i).and_then(|v| v.trim().parse().ok()))
            .collect();
        census.insert(row.get(state_col).unwrap_or_default().to_string(), values);
    }
    Ok(census)
}

/// Inner join of state summaries with census values, in summary order
pub fn join_census(
    summaries: &[StateSummary],
    census: &HashMap<String, Vec<Option<f64>>>,
) -> Vec<StateProfile> {
    summaries
        .iter()
        .filter_map(|summary| {
            census.get(&summary.state).map(|values| StateProfile {
                summary: summary.clone(),
                census: values.clone(),
            })
        })
        .collect()
}

/// Regress state mean salary on census field `index`, skipping states
/// without a value for it
pub fn census_regression(profiles: &[StateProfile], index: usize, field: &CensusField) -> RegressionResult {
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut w = Vec::new();
    for profile in profiles {
        if let Some(value) = profile.census.get(index).copied().flatten() {
            x.push(value);
            y.push(profile.summary.mean_salary);
            w.push(profile.summary.count as f64);
        }
    }
    RegressionResult {
        variable: field.column.clone(),
        title: field.title.clone(),
        observations: x.len(),
        fit: weighted_fit(&x, &y, &w),
    }
}

/// Write a plot's data series as CSV, then render it to PNG next to it.
/// Returns the number of files written.
fn write_plot<F>(plots_dir: &Path, title: &str, header: &[&str], rows: Vec<Vec<String>>, render: F) -> Result<usize>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let name = sanitize_filename(title);
    let series = plots_dir.join(format!("{}.csv", name));
    storage::write_table(&series, header, &rows)?;
    let image = plots_dir.join(format!("{}.png", name));
    render(&image)?;
    ::log::debug!("Wrote {} ({} rows)", image.display(), rows.len());
    Ok(2)
}

fn group_rows(means: &[GroupMean]) -> Vec<Vec<String>> {
    means
        .iter()
        .map(|m| vec![m.group.clone(), m.mean_salary.to_string()])
        .collect()
}

fn group_bars(means: &[GroupMean]) -> Vec<(String, f64)> {
    means.iter().map(|m| (m.group.clone(), m.mean_salary)).collect()
}

fn pair_rows(pairs: &[(String, f64)]) -> Vec<Vec<String>> {
    pairs.iter().map(|(k, v)| vec![k.clone(), v.to_string()]).collect()
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Plot stage: render every plot with its data series, then the regression
/// fits. Returns the number of files written.
pub fn run(config: &PipelineConfig) -> Result<usize> {
    let paths: &PathsConfig = &config.paths;
    let fields = &config.census.fields;
    let plots_dir = &paths.plots_dir;
    fs::create_dir_all(plots_dir)?;
    let style = PlotStyle::from_config(&config.plots);

    let records = read_salary_records(&paths.cleaned())?;
    let census = read_census(&paths.census(), fields)?;
    ::log::info!("Analyzing {} cleaned listings", records.len());

    let states = summarize_states(&records);
    let profiles = join_census(&states, &census);
    let mut written = 0;

    let title = "Avg Salary of Data Science Jobs for each State";
    let salaries: Vec<(String, f64)> = states.iter().map(|s| (s.state.clone(), s.mean_salary)).collect();
    written += write_plot(plots_dir, title, &["state", "avg_salary"], pair_rows(&salaries), |path| {
        plots::bar_chart(path, &style, title, ("States", "Avg Salary"), &salaries)
    })?;

    let title = "Number of Data Science Jobs for each State";
    let counts: Vec<(String, f64)> = profiles
        .iter()
        .map(|p| (p.summary.state.clone(), p.summary.count as f64))
        .collect();
    let count_rows = profiles
        .iter()
        .map(|p| vec![p.summary.state.clone(), p.summary.count.to_string()])
        .collect();
    written += write_plot(plots_dir, title, &["state", "count"], count_rows, |path| {
        plots::bar_chart(path, &style, title, ("States", "Number of DS jobs"), &counts)
    })?;

    let mut regressions = Vec::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        let values: Vec<f64> = profiles.iter().filter_map(|p| p.census.get(i).copied().flatten()).collect();
        let stats = distribution(&values);
        let stat_rows: Vec<Vec<String>> = match stats {
            Some(d) => vec![
                ("count", d.count as f64),
                ("mean", d.mean),
                ("min", d.min),
                ("25%", d.q1),
                ("50%", d.median),
                ("75%", d.q3),
                ("max", d.max),
            ]
            .into_iter()
            .map(|(name, v)| vec![name.to_string(), v.to_string()])
            .collect(),
            None => Vec::new(),
        };
        let title = format!("Descriptive Statistics for {}", field.title);
        written += write_plot(plots_dir, &title, &["statistic", field.column.as_str()], stat_rows, |path| {
            plots::box_plot(path, &style, &title, &field.title, stats.as_ref())
        })?;

        let regression = census_regression(&profiles, i, field);
        let points: Vec<(f64, f64, f64)> = profiles
            .iter()
            .filter_map(|p| {
                let x = p.census.get(i).copied().flatten()?;
                Some((x, p.summary.mean_salary, p.summary.count as f64))
            })
            .collect();
        let fit_rows = profiles
            .iter()
            .map(|p| {
                let x = p.census.get(i).copied().flatten();
                let fitted = x.zip(regression.fit).map(|(x, fit)| fit.predict(x));
                vec![
                    p.summary.state.clone(),
                    optional(x),
                    p.summary.mean_salary.to_string(),
                    p.summary.count.to_string(),
                    optional(fitted),
                ]
            })
            .collect();
        let title = format!("Avg Salary of DS Jobs and {}", field.title);
        written += write_plot(
            plots_dir,
            &title,
            &["state", field.column.as_str(), "avg_salary", "count", "fitted"],
            fit_rows,
            |path| {
                plots::scatter_with_fit(path, &style, &title, (field.title.as_str(), "Avg Salary"), &points, regression.fit)
            },
        )?;

        match regression.fit {
            Some(fit) => ::log::info!(
                "{}: slope {:.4}, intercept {:.2} over {} states",
                field.title,
                fit.slope,
                fit.intercept,
                regression.observations
            ),
            None => ::log::warn!("{}: not enough variation to fit", field.title),
        }
        regressions.push(regression);
    }

    let title = "Avg Salary by Job Title";
    let by_title = mean_by(&records, |r| r.job_title.as_str());
    written += write_plot(plots_dir, title, &["job_title", "avg_salary"], group_rows(&by_title), |path| {
        plots::horizontal_bar_chart(path, &style, title, ("Avg Salary", "Job Title"), &group_bars(&by_title))
    })?;

    let title = "Avg Salary by Job Level Prefix";
    let by_seniority = mean_by(&records, |r| r.job_seniority.as_str());
    written += write_plot(
        plots_dir,
        title,
        &["job_seniority", "avg_salary"],
        group_rows(&by_seniority),
        |path| {
            plots::horizontal_bar_chart(path, &style, title, ("Avg Salary", "Job Level"), &group_bars(&by_seniority))
        },
    )?;

    let title = "US Data Science Jobs Avg Salary";
    let mapped: Vec<(String, f64)> = profiles
        .iter()
        .map(|p| (p.summary.state.clone(), p.summary.mean_salary))
        .collect();
    written += write_plot(plots_dir, title, &["state", "avg_salary"], pair_rows(&mapped), |path| {
        plots::state_map(path, &style, title, &mapped)
    })?;

    for column in &config.plots.map_fields {
        let Some(i) = fields.iter().position(|f| &f.column == column) else {
            ::log::warn!("No census field {} to map", column);
            continue;
        };
        let mapped: Vec<(String, f64)> = profiles
            .iter()
            .filter_map(|p| Some((p.summary.state.clone(), p.census.get(i).copied().flatten()?)))
            .collect();
        let title = format!("{} US {}", config.census.year, fields[i].title);
        written += write_plot(plots_dir, &title, &["state", column.as_str()], pair_rows(&mapped), |path| {
            plots::state_map(path, &style, &title, &mapped)
        })?;
    }

    let mut out = BufWriter::new(File::create(plots_dir.join("regressions.json"))?);
    serde_json::to_writer_pretty(&mut out, &regressions)?;
    out.flush()?;
    written += 1;

    ::log::info!("Wrote {} plot files to {}", written, plots_dir.display());
    Ok(written)
}

/// Regression stage: run the external regression script
pub async fn run_external_regression(config: &RegressionConfig) -> Result<()> {
    ::log::info!("Running {} {}", config.command, config.script.display());
    let output = tokio::process::Command::new(&config.command)
        .arg(&config.script)
        .output()
        .await?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        ::log::info!("{}", stdout.trim_end());
    }
    if !output.status.success() {
        return Err(Error::Regression(format!(
            "{} exited with {}: {}",
            config.command,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}
