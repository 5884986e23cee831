#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reads yearly incident exports and appends them into one working table.
//!
//! Each source is a CSV file on disk or at an `http(s)` URL. Sources are
//! parsed by header, so exports whose column sets differ can still be
//! stacked: the combined [`Table`] carries the union of all columns, with
//! nulls where a source lacked one.
//!
//! No validation happens here. The only failure is a source that cannot
//! be read or parsed, and it aborts the whole load.

pub mod csv_source;
pub mod progress;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crime_dash_report_models::Table;

use crate::csv_source::parse_csv;
use crate::progress::ProgressCallback;

/// Errors that can occur while reading a source.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("Failed to read {source_id}: {error}")]
    Io {
        /// The source being read.
        source_id: String,
        /// Underlying I/O error.
        #[source]
        error: std::io::Error,
    },

    /// The document is not valid CSV.
    #[error("Failed to parse {source_id}: {error}")]
    Csv {
        /// The source being parsed.
        source_id: String,
        /// Underlying CSV error.
        #[source]
        error: csv::Error,
    },

    /// The download failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The document has no header row.
    #[error("{source_id} has no header row")]
    NoHeader {
        /// The source being parsed.
        source_id: String,
    },
}

impl LoadError {
    pub(crate) fn csv(source_id: &str, error: csv::Error) -> Self {
        Self::Csv {
            source_id: source_id.to_owned(),
            error,
        }
    }
}

/// Where a raw export lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceId {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// A remote file fetched over HTTP(S).
    Url(String),
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_owned())
        } else {
            Self::Path(PathBuf::from(s))
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Accumulates sources into a single table.
///
/// Each `append_*` call consumes the builder and returns a new one, so a
/// partially built table is never visible through a shared reference.
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    table: Table,
    sources: Vec<String>,
}

impl TableBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an already-parsed table.
    #[must_use]
    pub fn append_table(self, label: &str, table: Table) -> Self {
        log::info!("Loaded {} rows from {label}", table.len());
        let mut sources = self.sources;
        sources.push(label.to_owned());
        Self {
            table: self.table.append(table),
            sources,
        }
    }

    /// Parses CSV from `reader` and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the CSV cannot be parsed.
    pub fn append_reader<R: std::io::Read>(self, label: &str, reader: R) -> Result<Self, LoadError> {
        let table = parse_csv(label, reader)?;
        Ok(self.append_table(label, table))
    }

    /// Reads the CSV file at `path` and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be opened or parsed.
    pub fn append_path(self, path: &Path) -> Result<Self, LoadError> {
        let label = path.display().to_string();
        let file = std::fs::File::open(path).map_err(|error| LoadError::Io {
            source_id: label.clone(),
            error,
        })?;
        self.append_reader(&label, std::io::BufReader::new(file))
    }

    /// Downloads the CSV at `url` and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the download or parse fails.
    pub async fn append_url(self, url: &str) -> Result<Self, LoadError> {
        let response = reqwest::get(url).await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::debug!("Downloaded {} bytes from {url}", bytes.len());
        self.append_reader(url, bytes.as_ref())
    }

    /// Appends a source of either kind.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the source cannot be read or parsed.
    pub async fn append_source(self, source: &SourceId) -> Result<Self, LoadError> {
        match source {
            SourceId::Path(path) => self.append_path(path),
            SourceId::Url(url) => self.append_url(url).await,
        }
    }

    /// Labels of the sources appended so far, in order.
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Finishes the build.
    #[must_use]
    pub fn build(self) -> Table {
        self.table
    }
}

/// Loads every source in order into one table.
///
/// # Errors
///
/// Returns the first [`LoadError`]; no partial table is returned.
pub async fn load_sources(
    sources: &[SourceId],
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Table, LoadError> {
    progress.set_total(sources.len() as u64);

    let mut builder = TableBuilder::new();
    for source in sources {
        progress.set_message(format!("Loading {source}"));
        builder = builder.append_source(source).await?;
        progress.inc(1);
    }

    let table = builder.build();
    log::info!(
        "Loaded {} rows from {} sources",
        table.len(),
        sources.len()
    );
    progress.finish(format!("loaded {} rows", table.len()));

    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    use super::*;
    use crate::progress::null_progress;

    const Y2018: &str = "INCIDENT_NUMBER,OFFENSE_CODE,YEAR\nI1,3115,2018\n";
    const Y2019: &str = "INCIDENT_NUMBER,OFFENSE_CODE,YEAR,SHOOTING\nI2,3115,2019,Y\n";

    #[test]
    fn classifies_source_ids() {
        assert_eq!(
            SourceId::from("https://data.boston.gov/crime.csv"),
            SourceId::Url("https://data.boston.gov/crime.csv".to_string())
        );
        assert_eq!(
            SourceId::from("crime_2019.csv"),
            SourceId::Path(PathBuf::from("crime_2019.csv"))
        );
    }

    #[test]
    fn appends_in_order_with_column_union() {
        let table = TableBuilder::new()
            .append_reader("2018", Y2018.as_bytes())
            .unwrap()
            .append_reader("2019", Y2019.as_bytes())
            .unwrap()
            .build();

        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "INCIDENT_NUMBER"), Some("I1"));
        assert_eq!(table.value(1, "INCIDENT_NUMBER"), Some("I2"));
        assert_eq!(table.value(0, "SHOOTING"), None);
        assert_eq!(table.value(1, "SHOOTING"), Some("Y"));
    }

    #[test]
    fn column_union_is_order_independent() {
        let forward = TableBuilder::new()
            .append_reader("2018", Y2018.as_bytes())
            .unwrap()
            .append_reader("2019", Y2019.as_bytes())
            .unwrap()
            .build();
        let reverse = TableBuilder::new()
            .append_reader("2019", Y2019.as_bytes())
            .unwrap()
            .append_reader("2018", Y2018.as_bytes())
            .unwrap()
            .build();

        let mut a: Vec<&str> = forward.column_names().collect();
        let mut b: Vec<&str> = reverse.column_names().collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn records_source_labels() {
        let builder = TableBuilder::new()
            .append_reader("2018", Y2018.as_bytes())
            .unwrap();
        assert_eq!(builder.sources(), &["2018".to_string()]);
    }

    #[test]
    fn reads_from_disk() {
        let path = std::env::temp_dir().join("crime_dash_loader_reads_from_disk.csv");
        std::fs::write(&path, Y2019).unwrap();

        let table = TableBuilder::new().append_path(&path).unwrap().build();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "YEAR"), Some("2019"));
    }

    struct CountingProgress {
        total: AtomicU64,
        done: AtomicU64,
        finished: AtomicBool,
    }

    impl ProgressCallback for CountingProgress {
        fn set_total(&self, total: u64) {
            self.total.store(total, Ordering::SeqCst);
        }
        fn inc(&self, delta: u64) {
            self.done.fetch_add(delta, Ordering::SeqCst);
        }
        fn set_message(&self, _msg: String) {}
        fn finish(&self, _msg: String) {
            self.finished.store(true, Ordering::SeqCst);
        }
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn load_sources_appends_files_in_order() {
        let first = write_temp("crime_dash_load_sources_2018.csv", Y2018);
        let second = write_temp("crime_dash_load_sources_2019.csv", Y2019);
        let sources = vec![SourceId::Path(first.clone()), SourceId::Path(second.clone())];

        let table = load_sources(&sources, &null_progress()).await;
        std::fs::remove_file(&first).ok();
        std::fs::remove_file(&second).ok();
        let table = table.unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "INCIDENT_NUMBER"), Some("I1"));
        assert_eq!(table.value(1, "INCIDENT_NUMBER"), Some("I2"));
        assert_eq!(table.value(1, "SHOOTING"), Some("Y"));
    }

    #[tokio::test]
    async fn load_sources_reports_one_step_per_source() {
        let path = write_temp("crime_dash_load_sources_progress.csv", Y2019);
        let counting = Arc::new(CountingProgress {
            total: AtomicU64::new(0),
            done: AtomicU64::new(0),
            finished: AtomicBool::new(false),
        });
        let progress: Arc<dyn ProgressCallback> = counting.clone();

        let result = load_sources(&[SourceId::Path(path.clone())], &progress).await;
        std::fs::remove_file(&path).ok();

        assert_eq!(result.unwrap().len(), 1);
        assert_eq!(counting.total.load(Ordering::SeqCst), 1);
        assert_eq!(counting.done.load(Ordering::SeqCst), 1);
        assert!(counting.finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn load_sources_fails_on_unreadable_source() {
        let sources = [SourceId::Path(PathBuf::from("/nonexistent/crime_2015.csv"))];
        let err = load_sources(&sources, &null_progress()).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }), "{err}");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = TableBuilder::new()
            .append_path(Path::new("/nonexistent/crime_2015.csv"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }), "{err}");
    }
}
