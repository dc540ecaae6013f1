//! State-level ACS profile data from the census API.

use crate::config::{CensusConfig, CensusField, PathsConfig};
use crate::error::{Error, Result};
use crate::normalize::tables::fips_abbreviation;
use crate::storage;
use serde_json::Value;

/// Census data for one state, values kept as the API reported them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CensusRow {
    pub state_name: String,
    pub values: Vec<String>,
    pub fips: String,
    pub state: String,
}

impl CensusRow {
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.values.len() + 3);
        row.push(self.state_name.clone());
        row.extend(self.values.iter().cloned());
        row.push(self.fips.clone());
        row.push(self.state.clone());
        row
    }
}

/// Column header of the census CSV
pub fn census_header(fields: &[CensusField]) -> Vec<String> {
    let mut header = vec!["state_name".to_string()];
    header.extend(fields.iter().map(|f| f.column.clone()));
    header.push("state_code".to_string());
    header.push("state".to_string());
    header
}

/// Profile query for every state
pub fn census_url(config: &CensusConfig) -> String {
    let codes: Vec<&str> = config.fields.iter().map(|f| f.code.as_str()).collect();
    let mut url = format!(
        "{}/{}/acs/acs1/profile?get=NAME,{}&for=state:*",
        config.endpoint.trim_end_matches('/'),
        config.year,
        codes.join(",")
    );
    if !config.api_key.is_empty() {
        url.push_str("&key=");
        url.push_str(&config.api_key);
    }
    url
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turn the API's array-of-arrays response into rows, keeping only states
/// with a known FIPS code. The first array is the header.
pub fn parse_census_response(
    response: &[Vec<Value>],
    fields: &[CensusField],
) -> Result<Vec<CensusRow>> {
    let (header, body) = response
        .split_first()
        .ok_or_else(|| Error::Census("empty response".to_string()))?;
    let header: Vec<String> = header.iter().map(cell_text).collect();
    let position = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::Census(format!("missing column {}", name)))
    };

    let name_col = position("NAME")?;
    let fips_col = position("state")?;
    let field_cols = fields
        .iter()
        .map(|f| position(&f.code))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(body.len());
    for record in body {
        let cell = |i: usize| record.get(i).map(cell_text).unwrap_or_default();
        let fips = cell(fips_col);
        let Some(state) = fips_abbreviation(&fips) else {
            ::log::debug!("Skipping census row with unknown FIPS code {}", fips);
            continue;
        };
        rows.push(CensusRow {
            state_name: cell(name_col),
            values: field_cols.iter().map(|&i| cell(i)).collect(),
            fips,
            state: state.to_string(),
        });
    }
    Ok(rows)
}

/// Request the profile data for every state
pub async fn fetch(config: &CensusConfig) -> Result<Vec<CensusRow>> {
    let url = census_url(config);
    ::log::info!("Requesting ACS {} profile data", config.year);

    let client = reqwest::Client::new();
    let response: Vec<Vec<Value>> = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    parse_census_response(&response, &config.fields)
}

/// Census stage: fetch the profile data and write the census CSV
pub async fn run(config: &CensusConfig, paths: &PathsConfig) -> Result<usize> {
    let rows = fetch(config).await?;
    let table: Vec<Vec<String>> = rows.iter().map(CensusRow::to_row).collect();
    let output = paths.census();
    storage::write_table(&output, &census_header(&config.fields), &table)?;
    ::log::info!("Wrote census data for {} states to {}", rows.len(), output.display());
    Ok(rows.len())
}
