//! Persisted files shared between pipeline stages.

use crate::config::PathsConfig;
use crate::error::{Error, Result};
use crate::results::{CLEANED_HEADER, CleanedRecord, RAW_HEADER, RawListing, SearchTarget};
use serde_json::{Map, Value};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write discovered targets as a URL list plus an ordered state -> count map
pub fn save_targets(paths: &PathsConfig, targets: &[SearchTarget]) -> Result<()> {
    let url_path = paths.state_urls();
    ensure_parent(&url_path)?;
    let mut urls = BufWriter::new(File::create(&url_path)?);
    for target in targets {
        writeln!(urls, "{}", target.url)?;
    }
    urls.flush()?;

    let counts: Map<String, Value> = targets
        .iter()
        .map(|t| (t.state.clone(), Value::from(t.target_count)))
        .collect();
    let mut count_file = BufWriter::new(File::create(paths.state_counts())?);
    serde_json::to_writer_pretty(&mut count_file, &counts)?;
    count_file.flush()?;

    ::log::info!(
        "Saved {} search targets to {} and {}",
        targets.len(),
        url_path.display(),
        paths.state_counts().display()
    );
    Ok(())
}

/// Pair the saved URL list with the saved counts, in file order
pub fn load_targets(paths: &PathsConfig) -> Result<Vec<SearchTarget>> {
    let urls: Vec<String> = BufReader::new(File::open(paths.state_urls())?)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    let counts: Map<String, Value> =
        serde_json::from_reader(BufReader::new(File::open(paths.state_counts())?))?;

    if urls.len() != counts.len() {
        ::log::warn!(
            "{} search URLs but {} state counts; pairing the first {}",
            urls.len(),
            counts.len(),
            urls.len().min(counts.len())
        );
    }

    urls.into_iter()
        .zip(counts)
        .map(|(url, (state, count))| {
            let target_count = parse_count(&count)
                .ok_or_else(|| Error::InvalidData(format!("bad job count for {}: {}", state, count)))?;
            Ok(SearchTarget {
                state,
                url,
                target_count,
            })
        })
        .collect()
}

/// Counts may have been saved as numbers or numeric strings
fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Appends raw listings to a CSV, one flush per page
pub struct RawListingWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl RawListingWriter<File> {
    /// Open the raw listings file for appending, writing the header only
    /// when the file is new or empty
    pub fn open_append(path: &Path) -> Result<Self> {
        ensure_parent(path)?;
        let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Self::new(file, is_new)
    }
}

impl<W: Write> RawListingWriter<W> {
    pub fn new(inner: W, write_header: bool) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        if write_header {
            writer.write_record(RAW_HEADER)?;
            writer.flush()?;
        }
        Ok(Self { writer })
    }

    /// Write one page of listings and flush so the page survives a later crash
    pub fn append_page(&mut self, listings: &[RawListing]) -> Result<()> {
        for listing in listings {
            if let Err(e) = self.writer.serialize(listing) {
                ::log::warn!("Failed to write listing {}: {}", listing.source_url, e);
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

/// Read every raw listing, skipping malformed rows and repeated header rows
pub fn read_raw_listings(path: &Path) -> Result<Vec<RawListing>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut listings = Vec::new();
    for (row, result) in reader.deserialize::<RawListing>().enumerate() {
        match result {
            Ok(listing) if is_header_row(&listing) => {}
            Ok(listing) => listings.push(listing),
            Err(e) => ::log::warn!("Skipping malformed row {} of {}: {}", row + 2, path.display(), e),
        }
    }
    Ok(listings)
}

fn is_header_row(listing: &RawListing) -> bool {
    listing.company_name == RAW_HEADER[0] && listing.source_url == RAW_HEADER[12]
}

pub fn write_cleaned(path: &Path, records: &[CleanedRecord]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CLEANED_HEADER)?;
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a header and rows to a fresh CSV file
pub fn write_table<H, R>(path: &Path, header: &[H], rows: &[R]) -> Result<()>
where
    H: AsRef<str>,
    R: AsRef<[String]>,
{
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header.iter().map(|h| h.as_ref()))?;
    for row in rows {
        writer.write_record(row.as_ref())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{NA, Seniority, TitleFamily};
    use std::path::PathBuf;

    fn paths_in(dir: &Path) -> PathsConfig {
        PathsConfig {
            data_dir: dir.join("data"),
            plots_dir: dir.join("plots"),
        }
    }

    fn target(state: &str, url: &str, count: u64) -> SearchTarget {
        SearchTarget {
            state: state.to_string(),
            url: url.to_string(),
            target_count: count,
        }
    }

    #[test]
    fn test_targets_survive_save_and_load_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        let targets = vec![
            target("WY", "https://jobs.example.com/wy", 12),
            target("AK", "https://jobs.example.com/ak", 30),
            target("Louisiana, US", "https://jobs.example.com/la", 7),
        ];

        save_targets(&paths, &targets).unwrap();
        assert_eq!(load_targets(&paths).unwrap(), targets);
    }

    #[test]
    fn test_load_targets_accepts_string_counts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        fs::create_dir_all(&paths.data_dir).unwrap();
        fs::write(paths.state_urls(), "https://a\nhttps://b\n\n").unwrap();
        fs::write(paths.state_counts(), r#"{"TX": "120", "CA": 45}"#).unwrap();

        let targets = load_targets(&paths).unwrap();
        assert_eq!(targets, vec![target("TX", "https://a", 120), target("CA", "https://b", 45)]);
    }

    #[test]
    fn test_raw_writer_header_once_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("data").join("job_search_data.csv");

        let mut writer = RawListingWriter::open_append(&path).unwrap();
        writer
            .append_page(&[RawListing::unavailable("https://a", "TX")])
            .unwrap();
        drop(writer);

        let mut writer = RawListingWriter::open_append(&path).unwrap();
        writer
            .append_page(&[RawListing::unavailable("https://b", "CA")])
            .unwrap();
        drop(writer);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("companyName").count(), 1);

        let listings = read_raw_listings(&path).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].source_url, "https://a");
        assert_eq!(listings[1].search_state, "CA");
        assert_eq!(listings[1].salary, NA);
    }

    #[test]
    fn test_writer_into_memory() {
        let mut writer = RawListingWriter::new(Vec::new(), true).unwrap();
        let mut listing = RawListing::unavailable("https://a", "TX");
        listing.company_name = "Comma, Inc".to_string();
        writer.append_page(&[listing]).unwrap();

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), RAW_HEADER.join(","));
        assert!(lines.next().unwrap().starts_with("\"Comma, Inc\",NA"));
    }

    #[test]
    fn test_repeated_header_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        let header = RAW_HEADER.join(",");
        let row = "Acme,4.0,Data Scientist,\"Austin, TX\",$100K,NA,NA,NA,NA,NA,NA,NA,https://a,TX";
        fs::write(&path, format!("{}\n{}\n{}\n{}\n", header, row, header, row)).unwrap();

        let listings = read_raw_listings(&path).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].role_location, "Austin, TX");
    }

    #[test]
    fn test_write_cleaned_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned.csv");
        let record = CleanedRecord {
            listing: RawListing::unavailable("https://a", "TX"),
            state_code: Some("TX".to_string()),
            salary: 101.5,
            seniority: Seniority::Junior,
            title: TitleFamily::DataEngineer,
        };
        write_cleaned(&path, &[record]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CLEANED_HEADER.to_vec());
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[15], "101.5");
        assert_eq!(&row[17], "data_engineer");
    }
}
