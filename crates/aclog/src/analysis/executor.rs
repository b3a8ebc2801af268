//! Where the spectral analyses run.
//!
//! The FFT and spectrogram are the expensive part of the analysis stage. They
//! take owned input arrays and return an owned result, so they can run on the
//! calling thread or be shipped to tokio's blocking pool without sharing any
//! state. Both executors produce identical output.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};

use super::fft::AccSpectrum;
use super::spectrogram::{Spectrogram, SpectrogramParams};

/// Input for the spectral analyses: the acceleration time base and axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralInput {
    /// Sample timestamps in seconds.
    pub time: Vec<f64>,
    /// X, Y and Z acceleration.
    pub axes: [Vec<f64>; 3],
}

impl SpectralInput {
    fn axis_slices(&self) -> [&[f64]; 3] {
        let [x, y, z] = &self.axes;
        [x, y, z]
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Tuning for the spectral analyses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralParams {
    /// Welch segment length.
    pub fft_size: usize,
    /// Spectrogram window sizing.
    pub spectrogram: SpectrogramParams,
}

impl Default for SpectralParams {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

impl From<&AnalysisConfig> for SpectralParams {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            fft_size: config.fft_size,
            spectrogram: SpectrogramParams {
                window_secs: config.spectrogram_window_secs,
                min_fft: config.spectrogram_min_fft,
                max_fft: config.spectrogram_max_fft,
            },
        }
    }
}

/// Result of the spectral analyses. Either part is absent when the input was
/// too short for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectralOutput {
    /// Welch magnitude spectrum.
    pub fft: Option<AccSpectrum>,
    /// Combined-power spectrogram.
    pub spectrogram: Option<Spectrogram>,
}

/// Run both spectral analyses on the current thread.
#[must_use]
pub fn compute(input: &SpectralInput, params: &SpectralParams) -> SpectralOutput {
    let axes = input.axis_slices();
    SpectralOutput {
        fft: AccSpectrum::compute(&input.time, axes, params.fft_size),
        spectrogram: Spectrogram::compute(&input.time, axes, &params.spectrogram),
    }
}

/// Runs the spectral analyses somewhere.
#[async_trait::async_trait]
pub trait SpectralExecutor: Send + Sync + std::fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Compute the spectral analyses of `input`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Worker`] if the computation could not be completed.
    async fn execute(&self, input: SpectralInput, params: SpectralParams) -> Result<SpectralOutput>;
}

/// Computes on the calling task.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

#[async_trait::async_trait]
impl SpectralExecutor for InlineExecutor {
    fn name(&self) -> &'static str {
        "inline"
    }

    async fn execute(&self, input: SpectralInput, params: SpectralParams) -> Result<SpectralOutput> {
        Ok(compute(&input, &params))
    }
}

/// Computes on tokio's blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingPoolExecutor;

#[async_trait::async_trait]
impl SpectralExecutor for BlockingPoolExecutor {
    fn name(&self) -> &'static str {
        "blocking-pool"
    }

    async fn execute(&self, input: SpectralInput, params: SpectralParams) -> Result<SpectralOutput> {
        tokio::task::spawn_blocking(move || compute(&input, &params))
            .await
            .map_err(|e| Error::worker(e.to_string()))
    }
}

/// The executor selected by `config.offload`.
#[must_use]
pub fn executor_for(config: &AnalysisConfig) -> Box<dyn SpectralExecutor> {
    if config.offload {
        Box::new(BlockingPoolExecutor)
    } else {
        Box::new(InlineExecutor)
    }
}
