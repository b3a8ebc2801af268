//! Welch-averaged magnitude spectrum of the estimator acceleration.
//!
//! Segments of `fft_size` samples overlap by half, are Hann-windowed and
//! transformed with an in-place radix-2 FFT. Magnitudes are averaged across
//! segments and scaled by `4 / fft_size`, which maps a sinusoid of amplitude
//! `A` to a peak of roughly `A` (one-sided spectrum, Hann coherent gain 0.5).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::dataset::{AxisKind, Dataset, Provenance, TIME_FIELD};

/// Key of the spectrum dataset.
pub const FFT_DATASET: &str = "IMU_Acc_FFT";

/// Fewer samples than this and no sample-rate estimate is attempted.
pub const MIN_SAMPLES: usize = 128;

/// Periodic Hann window of length `n`.
#[must_use]
pub fn hann_periodic(n: usize) -> Vec<f64> {
    let len = n as f64;
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / len).cos()))
        .collect()
}

/// Average sample rate implied by a timestamp column: `(n - 1) / duration`.
///
/// Returns `None` for fewer than two samples or a non-positive duration.
#[must_use]
pub fn estimate_sample_rate(time: &[f64]) -> Option<f64> {
    let (first, last) = (time.first()?, time.last()?);
    let duration = last - first;
    if time.len() < 2 || duration.is_nan() || duration <= 0.0 {
        return None;
    }
    Some((time.len() - 1) as f64 / duration)
}

/// In-place iterative radix-2 Cooley-Tukey FFT.
///
/// `re` and `im` must have the same power-of-two length; other lengths are
/// left untouched.
pub fn fft_in_place(re: &mut [f64], im: &mut [f64]) {
    let n = re.len();
    if n < 2 || !n.is_power_of_two() || im.len() != n {
        return;
    }

    let bits = n.trailing_zeros();
    for i in 0..n {
        let rev = i.reverse_bits() >> (usize::BITS - bits);
        if rev > i {
            re.swap(i, rev);
            im.swap(i, rev);
        }
    }

    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let step = -2.0 * PI / size as f64;
        for start in (0..n).step_by(size) {
            for j in 0..half {
                let (w_im, w_re) = (step * j as f64).sin_cos();
                let even = start + j;
                let odd = even + half;
                let t_re = w_re * re[odd] - w_im * im[odd];
                let t_im = w_re * im[odd] + w_im * re[odd];
                re[odd] = re[even] - t_re;
                im[odd] = im[even] - t_im;
                re[even] += t_re;
                im[even] += t_im;
            }
        }
        size *= 2;
    }
}

/// Number of half-overlapping segments of `fft_size` in `len` samples.
#[must_use]
pub fn segment_count(len: usize, fft_size: usize) -> usize {
    if fft_size == 0 || len < fft_size {
        return 0;
    }
    (len - fft_size) / (fft_size / 2).max(1) + 1
}

/// Welch-averaged, normalised one-sided magnitude of `signal`.
///
/// Returns `fft_size / 2` bins with the DC bin forced to zero, or `None` if
/// the signal is shorter than one segment.
#[must_use]
pub fn welch_magnitude(signal: &[f64], fft_size: usize, window: &[f64]) -> Option<Vec<f64>> {
    let segments = segment_count(signal.len(), fft_size);
    if segments == 0 || window.len() != fft_size {
        return None;
    }
    let hop = (fft_size / 2).max(1);
    let bins = fft_size / 2;

    let mut spectrum = vec![0.0; bins];
    let mut re = vec![0.0; fft_size];
    let mut im = vec![0.0; fft_size];
    for segment in 0..segments {
        let start = segment * hop;
        for (j, (r, w)) in re.iter_mut().zip(window).enumerate() {
            *r = signal[start + j] * w;
        }
        im.fill(0.0);
        fft_in_place(&mut re, &mut im);
        for (acc, (r, i)) in spectrum.iter_mut().zip(re.iter().zip(&im)) {
            *acc += r.hypot(*i);
        }
    }

    let norm = 4.0 / fft_size as f64 / segments as f64;
    for value in &mut spectrum {
        *value *= norm;
    }
    if let Some(dc) = spectrum.first_mut() {
        *dc = 0.0;
    }
    Some(spectrum)
}

/// Magnitude spectra of the three acceleration axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccSpectrum {
    /// Estimated average sample rate in Hz.
    pub sample_rate: f64,
    /// Segment length used.
    pub fft_size: usize,
    /// Number of averaged segments.
    pub segments: usize,
    /// Bin centre frequencies, 0 up to (not including) Nyquist.
    pub frequencies: Vec<f64>,
    /// Per-axis magnitudes, X then Y then Z.
    pub magnitudes: [Vec<f64>; 3],
}

impl AccSpectrum {
    /// Compute the spectrum of three equally long axes sampled at `time`.
    ///
    /// Declines (returns `None`) with fewer than [`MIN_SAMPLES`] or
    /// `fft_size` samples, a non-positive duration, or mismatched lengths.
    #[must_use]
    pub fn compute(time: &[f64], axes: [&[f64]; 3], fft_size: usize) -> Option<Self> {
        let len = time.len();
        if len < MIN_SAMPLES || axes.iter().any(|a| a.len() != len) {
            return None;
        }
        let sample_rate = estimate_sample_rate(time)?;
        if len < fft_size || !fft_size.is_power_of_two() {
            tracing::debug!(samples = len, fft_size, "Not enough samples for FFT");
            return None;
        }

        let window = hann_periodic(fft_size);
        let [x, y, z] = axes;
        let magnitudes = [
            welch_magnitude(x, fft_size, &window)?,
            welch_magnitude(y, fft_size, &window)?,
            welch_magnitude(z, fft_size, &window)?,
        ];
        let df = sample_rate / fft_size as f64;
        let frequencies = (0..fft_size / 2).map(|i| i as f64 * df).collect();

        Some(Self {
            sample_rate,
            fft_size,
            segments: segment_count(len, fft_size),
            frequencies,
            magnitudes,
        })
    }

    /// Bin index and frequency of the largest magnitude on `axis` (0..3).
    #[must_use]
    pub fn peak(&self, axis: usize) -> Option<(usize, f64)> {
        let mags = self.magnitudes.get(axis)?;
        let (bin, _) = mags
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        Some((bin, self.frequencies[bin]))
    }

    /// The spectrum as a frequency-axis dataset.
    #[must_use]
    pub fn to_dataset(&self) -> Dataset {
        let [x, y, z] = &self.magnitudes;
        Dataset::new(FFT_DATASET, Provenance::Fft)
            .with_title(format!(
                "IMU Acc FFT Analysis (Avg Fs: {:.1}Hz)",
                self.sample_rate
            ))
            .with_x_axis(AxisKind::Frequency)
            .with_field(TIME_FIELD, self.frequencies.clone())
            .with_field("FFT_AccX", x.clone())
            .with_field("FFT_AccY", y.clone())
            .with_field("FFT_AccZ", z.clone())
    }
}
