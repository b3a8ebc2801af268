//! Derived analyses over a parsed log.
//!
//! Every analysis reads finished datasets and adds new ones under the same
//! namespace. An analysis that lacks its inputs, or has too few samples,
//! declines quietly; it never fails the others.
//!
//! | analysis             | input                                  | output                              |
//! |----------------------|----------------------------------------|-------------------------------------|
//! | noise range/variance | `LocalPosition_Acc`                    | `IMU_Noise_Range`, `IMU_Noise_Var`  |
//! | Welch spectrum       | `LocalPosition_Acc`                    | `IMU_Acc_FFT`                       |
//! | spectrogram          | `LocalPosition_Acc`                    | [`Spectrogram`] in the report       |
//! | sensor comparison    | `PosSensor_*`, `LocalPosition_Pos/Vel` | `<sensor>_Inspect_<axis>`           |
//! | used sensor          | `LocalPosition_Pos`, `PosSensor_*`     | `FC_UsedSensors_Pos`, `..._Inspect_<axis>` |

pub mod compare;
pub mod executor;
pub mod fft;
pub mod noise;
pub mod spectrogram;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::dataset::{Dataset, DatasetMap};
use crate::error::Result;

pub use compare::{SensorCategory, SensorReport};
pub use executor::{
    BlockingPoolExecutor, InlineExecutor, SpectralExecutor, SpectralInput, SpectralOutput,
    SpectralParams,
};
pub use fft::AccSpectrum;
pub use spectrogram::Spectrogram;

/// Estimator acceleration dataset the noise and spectral analyses read.
pub const ACC_DATASET: &str = "LocalPosition_Acc";

/// Acceleration axes, in order.
pub const ACC_AXES: [&str; 3] = ["AccX", "AccY", "AccZ"];

/// What the analysis stage produced besides datasets.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Keys of the datasets added, in the order they were added.
    pub added: Vec<String>,
    /// The spectrogram grid, if there were enough samples.
    pub spectrogram: Option<Spectrogram>,
    /// One entry per compared sensor.
    pub sensors: Vec<SensorReport>,
}

impl AnalysisReport {
    fn add(&mut self, datasets: &mut DatasetMap, dataset: Dataset) {
        let key = dataset.key().to_string();
        self.added.push(key.clone());
        datasets.insert(key, dataset);
    }
}

/// Copy the acceleration arrays out for a spectral executor.
#[must_use]
pub fn spectral_input(datasets: &DatasetMap) -> Option<SpectralInput> {
    let acc = datasets.get(ACC_DATASET)?;
    let time = acc.time()?.to_vec();
    let [x, y, z] = ACC_AXES.map(|axis| acc.field(axis).map(|c| c.to_vec()));
    Some(SpectralInput {
        time,
        axes: [x?, y?, z?],
    })
}

/// Run every analysis on the current thread.
pub fn run(datasets: &mut DatasetMap, config: &AnalysisConfig) -> AnalysisReport {
    let mut report = AnalysisReport::default();
    if !config.enabled {
        return report;
    }
    run_noise(datasets, config, &mut report);
    if let Some(input) = spectral_input(datasets) {
        let output = executor::compute(&input, &SpectralParams::from(config));
        apply_spectral(datasets, output, &mut report);
    }
    run_comparisons(datasets, &mut report);
    finish(&report);
    report
}

/// Run every analysis, handing the spectral part to `executor`.
///
/// # Errors
///
/// Returns [`crate::Error::Worker`] if the executor fails.
pub async fn run_with(
    datasets: &mut DatasetMap,
    config: &AnalysisConfig,
    executor: &dyn SpectralExecutor,
) -> Result<AnalysisReport> {
    let mut report = AnalysisReport::default();
    if !config.enabled {
        return Ok(report);
    }
    run_noise(datasets, config, &mut report);
    if let Some(input) = spectral_input(datasets) {
        debug!(executor = executor.name(), samples = input.len(), "Running spectral analyses");
        let output = executor.execute(input, SpectralParams::from(config)).await?;
        apply_spectral(datasets, output, &mut report);
    }
    run_comparisons(datasets, &mut report);
    finish(&report);
    Ok(report)
}

fn run_noise(datasets: &mut DatasetMap, config: &AnalysisConfig, report: &mut AnalysisReport) {
    let Some(acc) = datasets.get(ACC_DATASET) else {
        debug!("No {ACC_DATASET} dataset; skipping noise analysis");
        return;
    };
    if let Some((range, variance)) = noise::noise_datasets(acc, config.noise_window_secs) {
        report.add(datasets, range);
        report.add(datasets, variance);
    }
}

fn apply_spectral(datasets: &mut DatasetMap, output: SpectralOutput, report: &mut AnalysisReport) {
    if let Some(fft) = output.fft {
        report.add(datasets, fft.to_dataset());
    }
    report.spectrogram = output.spectrogram;
}

fn run_comparisons(datasets: &mut DatasetMap, report: &mut AnalysisReport) {
    let (inspections, sensors) = compare::compare_sensors(datasets);
    for dataset in inspections {
        report.add(datasets, dataset);
    }
    report.sensors = sensors;

    if let Some(used) = compare::used_sensor_dataset(datasets) {
        let inspections = compare::used_sensor_inspections(&used, datasets);
        report.add(datasets, used);
        for dataset in inspections {
            report.add(datasets, dataset);
        }
    }
}

fn finish(report: &AnalysisReport) {
    info!(
        datasets = report.added.len(),
        sensors = report.sensors.len(),
        spectrogram = report.spectrogram.is_some(),
        "Derived analyses complete"
    );
}
