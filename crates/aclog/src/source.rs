//! Loading a log from disk and turning it into reports.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::{self, AnalysisReport, SensorReport, Spectrogram, SpectralExecutor};
use crate::config::Config;
use crate::dataset::{Dataset, DatasetMap, Provenance};
use crate::error::Result;
use crate::parser::{FrameScanner, LogHeader, ParseResult, ParseStats};

/// A log file read fully into memory.
#[derive(Debug, Clone)]
pub struct LogSource {
    path: PathBuf,
    bytes: Vec<u8>,
    digest: blake3::Hash,
    modified: Option<DateTime<Local>>,
}

impl LogSource {
    /// Read `path` and fingerprint it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let modified = std::fs::metadata(path)?
            .modified()
            .ok()
            .map(DateTime::<Local>::from);
        Ok(Self::from_bytes(path, bytes, modified))
    }

    /// Wrap bytes that are already in memory.
    #[must_use]
    pub fn from_bytes(
        path: impl Into<PathBuf>,
        bytes: Vec<u8>,
        modified: Option<DateTime<Local>>,
    ) -> Self {
        let digest = blake3::hash(&bytes);
        Self {
            path: path.into(),
            bytes,
            digest,
            modified,
        }
    }

    /// Where the log was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw log bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex blake3 digest of the bytes.
    #[must_use]
    pub fn digest(&self) -> String {
        self.digest.to_hex().to_string()
    }

    /// File modification time, if the platform reports one.
    #[must_use]
    pub fn modified(&self) -> Option<DateTime<Local>> {
        self.modified
    }

    /// Parse the log in `config.parser.step_budget` sized steps, logging
    /// progress after each step.
    ///
    /// # Errors
    ///
    /// Returns header format errors and the frame-limit error.
    pub fn parse(&self, config: &Config) -> Result<ParseResult> {
        let mut scanner =
            FrameScanner::with_options(&self.bytes, config.parser.scan_options());
        scanner.parse_header()?;

        let mut last_percent = 0;
        loop {
            let progress = scanner.parse_step(config.parser.step_budget)?;
            let percent = (progress * 100.0) as u32;
            if percent >= last_percent + 10 || progress >= 1.0 {
                debug!(
                    file = %self.path.display(),
                    percent,
                    frames = scanner.stats().total_frames,
                    "Parsing"
                );
                last_percent = percent;
            }
            if progress >= 1.0 {
                break;
            }
        }

        let result = scanner.take_result()?;
        info!(
            file = %self.path.display(),
            frames = result.stats.total_frames,
            unknown = result.stats.unknown_frames,
            datasets = result.datasets.len(),
            "Parsed log"
        );
        Ok(result)
    }

    /// Parse the log and run the derived analyses.
    ///
    /// # Errors
    ///
    /// Returns parse errors and executor failures.
    pub async fn load(
        &self,
        config: &Config,
        executor: &dyn SpectralExecutor,
    ) -> Result<(ParseResult, AnalysisReport)> {
        let mut result = self.parse(config)?;
        let report = analysis::run_with(&mut result.datasets, &config.analysis, executor).await?;
        Ok((result, report))
    }
}

/// Header, statistics and fingerprint of a log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Source path.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: usize,
    /// Hex blake3 digest.
    pub digest: String,
    /// Modification time.
    pub modified: Option<DateTime<Local>>,
    /// The file header.
    pub header: LogHeader,
    /// Frame counters.
    pub stats: ParseStats,
    /// Frame counts labelled with type names.
    pub frame_types: Vec<FrameTypeCount>,
}

/// Frame count for one type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameTypeCount {
    /// Wire tag.
    pub tag: u8,
    /// Registered type name, or `Unknown`.
    pub name: &'static str,
    /// Frames seen.
    pub count: u64,
}

impl Summary {
    /// Summarise a parsed log.
    #[must_use]
    pub fn new(source: &LogSource, result: &ParseResult) -> Self {
        Self {
            path: source.path().to_path_buf(),
            size: source.bytes().len(),
            digest: source.digest(),
            modified: source.modified(),
            header: result.header.clone(),
            stats: result.stats.clone(),
            frame_types: result
                .stats
                .labelled_counts()
                .into_iter()
                .map(|(tag, name, count)| FrameTypeCount { tag, name, count })
                .collect(),
        }
    }
}

/// One line of a dataset listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetListing {
    /// Dataset key.
    pub key: String,
    /// Display title.
    pub title: String,
    /// Producing stage.
    pub provenance: Provenance,
    /// Row count.
    pub rows: usize,
    /// Field names.
    pub fields: Vec<String>,
    /// Whether the dataset can be plotted.
    pub renderable: bool,
}

impl From<&Dataset> for DatasetListing {
    fn from(dataset: &Dataset) -> Self {
        Self {
            key: dataset.key().to_string(),
            title: dataset.title().to_string(),
            provenance: dataset.provenance(),
            rows: dataset.rows(),
            fields: dataset.field_names().map(str::to_string).collect(),
            renderable: dataset.is_renderable(),
        }
    }
}

/// List every dataset, optionally only raw ones.
#[must_use]
pub fn list_datasets(datasets: &DatasetMap, raw_only: bool) -> Vec<DatasetListing> {
    datasets
        .values()
        .filter(|d| !raw_only || d.provenance() == Provenance::Raw)
        .map(DatasetListing::from)
        .collect()
}

/// Everything the `export` command writes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    /// The file header.
    pub header: &'a LogHeader,
    /// Frame counters.
    pub stats: &'a ParseStats,
    /// Selected datasets.
    pub datasets: DatasetMap,
    /// Spectrogram, if computed and not filtered out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectrogram: Option<&'a Spectrogram>,
    /// Sensor classifications.
    pub sensors: &'a [SensorReport],
}

impl<'a> ExportDocument<'a> {
    /// Build an export of `result`, keeping only the datasets named in
    /// `selection` (all of them when empty). The spectrogram is selected by
    /// its own key.
    #[must_use]
    pub fn new(result: &'a ParseResult, report: &'a AnalysisReport, selection: &[String]) -> Self {
        let wanted = |key: &str| selection.is_empty() || selection.iter().any(|s| s == key);
        Self {
            header: &result.header,
            stats: &result.stats,
            datasets: result
                .datasets
                .iter()
                .filter(|(key, _)| wanted(key.as_str()))
                .map(|(key, dataset)| (key.clone(), dataset.clone()))
                .collect(),
            spectrogram: report
                .spectrogram
                .as_ref()
                .filter(|_| wanted(analysis::spectrogram::SPECTROGRAM_KEY)),
            sensors: &report.sensors,
        }
    }

    /// Selected keys that matched nothing.
    #[must_use]
    pub fn missing<'s>(&self, selection: &'s [String]) -> Vec<&'s str> {
        selection
            .iter()
            .map(String::as_str)
            .filter(|key| {
                !self.datasets.contains_key(*key)
                    && !(*key == analysis::spectrogram::SPECTROGRAM_KEY && self.spectrogram.is_some())
            })
            .collect()
    }
}
