//! Short-time power spectrum of the combined acceleration axes.

use serde::{Deserialize, Serialize};

use super::fft::{estimate_sample_rate, fft_in_place, hann_periodic};

/// Key under which the spectrogram is reported.
pub const SPECTROGRAM_KEY: &str = "IMU_Spectrogram";

/// Fewest samples considered, regardless of the chosen FFT size.
pub const MIN_SAMPLES: usize = 512;

/// Power floor applied before taking the logarithm.
pub const POWER_FLOOR: f64 = 1e-10;

/// Window sizing for [`Spectrogram::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrogramParams {
    /// Target window duration in seconds.
    pub window_secs: f64,
    /// Smallest FFT size.
    pub min_fft: usize,
    /// Largest FFT size.
    pub max_fft: usize,
}

impl Default for SpectrogramParams {
    fn default() -> Self {
        Self {
            window_secs: 1.0,
            min_fft: 256,
            max_fft: 2048,
        }
    }
}

impl SpectrogramParams {
    /// FFT size whose window covers about `window_secs` at `sample_rate`:
    /// the nearest power of two, clamped to `[min_fft, max_fft]`.
    #[must_use]
    pub fn fft_size(&self, sample_rate: f64) -> usize {
        let target = sample_rate * self.window_secs;
        if !(target.is_finite() && target >= 1.0) {
            return self.min_fft;
        }
        let exponent = target.log2().round().clamp(0.0, 62.0);
        let size = 1usize << (exponent as u32);
        size.clamp(self.min_fft, self.max_fft.max(self.min_fft))
    }
}

/// A time by frequency grid of combined power in dB.
///
/// `power_db` is frame-major: the value for frame `f`, bin `k` lives at
/// `f * bins + k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spectrogram {
    /// Display title.
    pub title: String,
    /// Estimated sample rate in Hz.
    pub sample_rate: f64,
    /// Transform length.
    pub fft_size: usize,
    /// Samples between consecutive frames.
    pub hop: usize,
    /// Centre time of each frame.
    pub times: Vec<f64>,
    /// Frequency of each bin.
    pub frequencies: Vec<f64>,
    /// Power in dB, frame-major.
    pub power_db: Vec<f64>,
    /// Largest value in `power_db`, for colour-scale normalisation.
    pub max_db: f64,
}

impl Spectrogram {
    /// Compute the spectrogram of three equally long axes sampled at `time`.
    ///
    /// Each frame is de-meaned per axis, Hann-windowed and transformed; the
    /// squared magnitudes of the three axes are summed per bin and converted
    /// to `10 * log10(max(power, 1e-10))`. Consecutive frames overlap by 75%.
    ///
    /// Returns `None` with too few samples, a non-positive duration or
    /// mismatched lengths.
    #[must_use]
    pub fn compute(time: &[f64], axes: [&[f64]; 3], params: &SpectrogramParams) -> Option<Self> {
        let len = time.len();
        if axes.iter().any(|a| a.len() != len) {
            return None;
        }
        let sample_rate = estimate_sample_rate(time)?;
        let fft_size = params.fft_size(sample_rate);
        if len < MIN_SAMPLES.max(fft_size) {
            tracing::debug!(samples = len, fft_size, "Not enough samples for spectrogram");
            return None;
        }

        let hop = (fft_size / 4).max(1);
        let bins = fft_size / 2;
        let frames = (len - fft_size) / hop + 1;
        let window = hann_periodic(fft_size);

        let mut times = Vec::with_capacity(frames);
        let mut power_db = Vec::with_capacity(frames * bins);
        let mut power = vec![0.0; bins];
        let mut re = vec![0.0; fft_size];
        let mut im = vec![0.0; fft_size];
        let mut max_db = f64::NEG_INFINITY;

        for frame in 0..frames {
            let start = frame * hop;
            power.fill(0.0);
            for axis in axes {
                let segment = &axis[start..start + fft_size];
                let mean = segment.iter().sum::<f64>() / fft_size as f64;
                for ((r, v), w) in re.iter_mut().zip(segment).zip(&window) {
                    *r = (v - mean) * w;
                }
                im.fill(0.0);
                fft_in_place(&mut re, &mut im);
                for (p, (r, i)) in power.iter_mut().zip(re.iter().zip(&im)) {
                    *p += r * r + i * i;
                }
            }
            for p in &power {
                let db = 10.0 * p.max(POWER_FLOOR).log10();
                max_db = max_db.max(db);
                power_db.push(db);
            }
            times.push(time[start + fft_size / 2]);
        }

        let df = sample_rate / fft_size as f64;
        Some(Self {
            title: format!("IMU Acc Spectrogram (FFT {fft_size}, Fs: {sample_rate:.1}Hz)"),
            sample_rate,
            fft_size,
            hop,
            times,
            frequencies: (0..bins).map(|k| k as f64 * df).collect(),
            power_db,
            max_db,
        })
    }

    /// Number of frames (columns along time).
    #[must_use]
    pub fn frames(&self) -> usize {
        self.times.len()
    }

    /// Number of frequency bins per frame.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.frequencies.len()
    }

    /// The dB values of one frame.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&[f64]> {
        let bins = self.bins();
        self.power_db.get(index * bins..(index + 1) * bins)
    }

    /// The dB value at (`frame`, `bin`).
    #[must_use]
    pub fn db(&self, frame: usize, bin: usize) -> Option<f64> {
        if bin >= self.bins() {
            return None;
        }
        self.power_db.get(frame * self.bins() + bin).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(fs: f64, n: usize, freq: f64, amplitude: f64) -> (Vec<f64>, Vec<f64>) {
        let time: Vec<f64> = (0..n).map(|i| i as f64 / fs).collect();
        let values = time
            .iter()
            .map(|t| amplitude * (2.0 * PI * freq * t).sin())
            .collect();
        (time, values)
    }

    #[test]
    fn test_fft_size_selection() {
        let params = SpectrogramParams::default();
        assert_eq!(params.fft_size(200.0), 256);
        assert_eq!(params.fft_size(400.0), 512);
        assert_eq!(params.fft_size(1000.0), 1024);
        assert_eq!(params.fft_size(50.0), 256);
        assert_eq!(params.fft_size(10_000.0), 2048);
        assert_eq!(params.fft_size(f64::NAN), 256);
    }

    #[test]
    fn test_grid_shape() {
        let (time, x) = sine(200.0, 4000, 25.0, 1.0);
        let spec = Spectrogram::compute(&time, [&x, &x, &x], &SpectrogramParams::default()).unwrap();

        assert_eq!(spec.fft_size, 256);
        assert_eq!(spec.hop, 64);
        assert_eq!(spec.frames(), (4000 - 256) / 64 + 1);
        assert_eq!(spec.bins(), 128);
        assert_eq!(spec.power_db.len(), spec.frames() * spec.bins());
        assert_eq!(spec.times[0], time[128]);
        assert!(spec.times.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(spec.frame(1).unwrap().len(), 128);
        assert!(spec.frame(spec.frames()).is_none());
        assert!(spec.db(0, 128).is_none());
    }

    #[test]
    fn test_constant_sinusoid_power_is_flat() {
        let (time, x) = sine(200.0, 4000, 25.0, 1.0);
        let quiet = vec![0.0; x.len()];
        let spec =
            Spectrogram::compute(&time, [&x, &quiet, &quiet], &SpectrogramParams::default())
                .unwrap();

        let totals: Vec<f64> = (0..spec.frames())
            .map(|f| {
                spec.frame(f)
                    .unwrap()
                    .iter()
                    .map(|db| 10f64.powf(db / 10.0))
                    .sum()
            })
            .collect();
        let mean = totals.iter().sum::<f64>() / totals.len() as f64;
        for total in &totals {
            assert!((total - mean).abs() / mean < 1e-3);
        }

        // 25 Hz at 200 Hz with 256 points lands on bin 32.
        let peak_db = spec.db(3, 32).unwrap();
        assert!((peak_db - spec.max_db).abs() < 1e-6);
    }

    #[test]
    fn test_silence_hits_the_floor() {
        let time: Vec<f64> = (0..1024).map(|i| f64::from(i) / 200.0).collect();
        let flat = vec![3.0; 1024];
        let spec =
            Spectrogram::compute(&time, [&flat, &flat, &flat], &SpectrogramParams::default())
                .unwrap();
        assert!(spec.power_db.iter().all(|db| (*db + 100.0).abs() < 1e-9));
        assert!((spec.max_db + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_declines_on_short_input() {
        let (time, x) = sine(200.0, 511, 10.0, 1.0);
        assert!(Spectrogram::compute(&time, [&x, &x, &x], &SpectrogramParams::default()).is_none());

        let (time, x) = sine(2000.0, 1500, 10.0, 1.0);
        // 2 kHz selects 2048 points, more than the 1500 available.
        assert!(Spectrogram::compute(&time, [&x, &x, &x], &SpectrogramParams::default()).is_none());
    }

    #[test]
    fn test_deterministic() {
        let (time, x) = sine(300.0, 3000, 40.0, 0.7);
        let params = SpectrogramParams::default();
        let a = Spectrogram::compute(&time, [&x, &x, &x], &params).unwrap();
        let b = Spectrogram::compute(&time, [&x, &x, &x], &params).unwrap();
        assert_eq!(a, b);
    }
}
