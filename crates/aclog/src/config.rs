//! Configuration management for aclog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::codec::Endian;
use crate::error::{Error, Result};
use crate::parser::{ScanOptions, DEFAULT_MAX_FRAMES};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "aclog";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "ACLOG_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ACLOG_`, sections separated by
///    a double underscore, e.g. `ACLOG_PARSER__STEP_BUDGET`)
/// 2. TOML config file at `~/.config/aclog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame scanner configuration.
    pub parser: ParserConfig,
    /// Derived analysis configuration.
    pub analysis: AnalysisConfig,
}

/// Frame scanner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Bytes scanned per step before yielding for a progress update.
    pub step_budget: usize,
    /// Frames allowed per log before it is rejected as corrupt.
    pub max_frames: u64,
    /// Byte order of multi-byte record fields.
    pub endian: Endian,
}

/// Derived analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run derived analyses after parsing.
    pub enabled: bool,
    /// Trailing window of the acceleration noise analysis, in seconds.
    pub noise_window_secs: f64,
    /// Segment length of the Welch spectrum. Must be a power of two.
    pub fft_size: usize,
    /// Target window of the spectrogram, in seconds.
    pub spectrogram_window_secs: f64,
    /// Smallest spectrogram FFT size. Must be a power of two.
    pub spectrogram_min_fft: usize,
    /// Largest spectrogram FFT size. Must be a power of two.
    pub spectrogram_max_fft: usize,
    /// Run the spectral analyses on the blocking worker pool.
    pub offload: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            step_budget: 500_000,
            max_frames: DEFAULT_MAX_FRAMES,
            endian: Endian::Little,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            noise_window_secs: 0.1,
            fft_size: 4096,
            spectrogram_window_secs: 1.0,
            spectrogram_min_fft: 256,
            spectrogram_max_fft: 2048,
            offload: true,
        }
    }
}

impl ParserConfig {
    /// Scanner options derived from this configuration.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            endian: self.endian,
            max_frames: self.max_frames,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails, or if the
    /// loaded values do not pass [`Config::validate`].
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.parser.step_budget == 0 {
            return Err(Error::config_validation(
                "step_budget must be greater than 0",
            ));
        }
        if self.parser.max_frames == 0 {
            return Err(Error::config_validation("max_frames must be greater than 0"));
        }

        let analysis = &self.analysis;
        for (name, secs) in [
            ("noise_window_secs", analysis.noise_window_secs),
            ("spectrogram_window_secs", analysis.spectrogram_window_secs),
        ] {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(Error::config_validation(format!(
                    "{name} must be a positive number of seconds, got {secs}"
                )));
            }
        }

        for (name, size) in [
            ("fft_size", analysis.fft_size),
            ("spectrogram_min_fft", analysis.spectrogram_min_fft),
            ("spectrogram_max_fft", analysis.spectrogram_max_fft),
        ] {
            if size < 2 || !size.is_power_of_two() {
                return Err(Error::config_validation(format!(
                    "{name} must be a power of two of at least 2, got {size}"
                )));
            }
        }

        if analysis.spectrogram_min_fft > analysis.spectrogram_max_fft {
            return Err(Error::config_validation(format!(
                "spectrogram_min_fft ({}) cannot be greater than spectrogram_max_fft ({})",
                analysis.spectrogram_min_fft, analysis.spectrogram_max_fft
            )));
        }

        Ok(())
    }
}
