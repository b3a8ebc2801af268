//! Sliding-window acceleration noise: peak-to-peak range and variance over a
//! trailing time window.

use std::collections::VecDeque;

use crate::dataset::{Dataset, Provenance, TIME_FIELD};

use super::{ACC_AXES, ACC_DATASET};

/// Key of the range dataset.
pub const RANGE_DATASET: &str = "IMU_Noise_Range";

/// Key of the variance dataset.
pub const VARIANCE_DATASET: &str = "IMU_Noise_Var";

/// Fewest samples for which a window statistic means anything.
pub const MIN_SAMPLES: usize = 2;

/// Peak-to-peak range of `values` over the trailing `window` seconds ending at
/// each sample.
///
/// The window at index `r` spans every `l <= r` with `time[r] - time[l] <=
/// window`. Two monotonic deques hold the min and max candidates, so each
/// sample is pushed and popped at most once.
#[must_use]
pub fn sliding_range(time: &[f64], values: &[f64], window: f64) -> Vec<f64> {
    let len = time.len().min(values.len());
    let mut out = Vec::with_capacity(len);
    let mut maxima: VecDeque<usize> = VecDeque::new();
    let mut minima: VecDeque<usize> = VecDeque::new();
    let mut left = 0;

    for right in 0..len {
        let v = values[right];
        while maxima.back().is_some_and(|&i| values[i] <= v) {
            maxima.pop_back();
        }
        maxima.push_back(right);
        while minima.back().is_some_and(|&i| values[i] >= v) {
            minima.pop_back();
        }
        minima.push_back(right);

        while time[right] - time[left] > window {
            left += 1;
        }
        while maxima.front().is_some_and(|&i| i < left) {
            maxima.pop_front();
        }
        while minima.front().is_some_and(|&i| i < left) {
            minima.pop_front();
        }

        let range = match (maxima.front(), minima.front()) {
            (Some(&hi), Some(&lo)) => values[hi] - values[lo],
            _ => 0.0,
        };
        out.push(range);
    }
    out
}

/// Population variance of `values` over the trailing `window` seconds ending
/// at each sample.
///
/// Running sums are updated as samples enter and leave the window. A window
/// holding a single sample has variance zero, and cancellation never yields a
/// negative result.
#[must_use]
pub fn sliding_variance(time: &[f64], values: &[f64], window: f64) -> Vec<f64> {
    let len = time.len().min(values.len());
    let mut out = Vec::with_capacity(len);
    let mut left = 0;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;

    for right in 0..len {
        let v = values[right];
        sum += v;
        sum_sq += v * v;

        while time[right] - time[left] > window {
            let gone = values[left];
            sum -= gone;
            sum_sq -= gone * gone;
            left += 1;
        }

        let count = (right - left + 1) as f64;
        let variance = if right > left {
            ((sum_sq - sum * sum / count) / count).max(0.0)
        } else {
            0.0
        };
        out.push(variance);
    }
    out
}

/// Compute the range and variance datasets from an acceleration dataset.
///
/// Returns `None` when the dataset lacks `Time` or an axis, has inconsistent
/// columns, or holds fewer than [`MIN_SAMPLES`] rows.
#[must_use]
pub fn noise_datasets(acc: &Dataset, window: f64) -> Option<(Dataset, Dataset)> {
    let time = acc.time()?;
    let axes = ACC_AXES
        .iter()
        .map(|axis| acc.field(axis))
        .collect::<Option<Vec<_>>>()?;
    if acc.validate().is_err() || time.len() < MIN_SAMPLES {
        tracing::debug!(
            dataset = ACC_DATASET,
            rows = time.len(),
            "Skipping noise analysis"
        );
        return None;
    }

    let mut range = Dataset::new(RANGE_DATASET, Provenance::Noise)
        .with_title(format!("IMU Noise Analysis ({window}s Range/Peak-to-Peak)"))
        .with_field(TIME_FIELD, time.clone());
    let mut variance = Dataset::new(VARIANCE_DATASET, Provenance::Noise)
        .with_title(format!("IMU Noise Analysis ({window}s Variance)"))
        .with_field(TIME_FIELD, time.clone());

    for (axis, values) in ["X", "Y", "Z"].into_iter().zip(axes) {
        range.insert(format!("Range{axis}"), sliding_range(time, values, window));
        variance.insert(format!("Var{axis}"), sliding_variance(time, values, window));
    }
    Some((range, variance))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: f64 = 0.1;

    fn brute_window(time: &[f64], r: usize, window: f64) -> usize {
        (0..=r).find(|&l| time[r] - time[l] <= window).unwrap_or(r)
    }

    fn brute_range(time: &[f64], values: &[f64], window: f64) -> Vec<f64> {
        (0..time.len())
            .map(|r| {
                let slice = &values[brute_window(time, r, window)..=r];
                let hi = slice.iter().copied().fold(f64::MIN, f64::max);
                let lo = slice.iter().copied().fold(f64::MAX, f64::min);
                hi - lo
            })
            .collect()
    }

    fn brute_variance(time: &[f64], values: &[f64], window: f64) -> Vec<f64> {
        (0..time.len())
            .map(|r| {
                let slice = &values[brute_window(time, r, window)..=r];
                if slice.len() < 2 {
                    return 0.0;
                }
                let n = slice.len() as f64;
                let mean = slice.iter().sum::<f64>() / n;
                slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
            })
            .collect()
    }

    /// 400 Hz samples of a slow sine with a few injected spikes.
    fn signal() -> (Vec<f64>, Vec<f64>) {
        let time: Vec<f64> = (0..2000).map(|i| f64::from(i) * 0.0025).collect();
        let mut values: Vec<f64> = time.iter().map(|t| (t * 7.0).sin() * 0.3).collect();
        for (i, spike) in [(150, 5.0), (151, -4.0), (777, 9.5), (1600, -12.0)] {
            values[i] += spike;
        }
        (time, values)
    }

    #[test]
    fn test_range_matches_brute_force() {
        let (time, values) = signal();
        let fast = sliding_range(&time, &values, WINDOW);
        let slow = brute_range(&time, &values, WINDOW);
        assert_eq!(fast.len(), slow.len());
        for (a, b) in fast.iter().zip(&slow) {
            assert!((a - b).abs() < 1e-12, "{a} vs {b}");
        }
    }

    #[test]
    fn test_variance_matches_brute_force() {
        let (time, values) = signal();
        let fast = sliding_variance(&time, &values, WINDOW);
        let slow = brute_variance(&time, &values, WINDOW);
        for (a, b) in fast.iter().zip(&slow) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn test_spike_dominates_its_window_only() {
        let (time, values) = signal();
        let range = sliding_range(&time, &values, WINDOW);
        // The spike at index 777 stays in the window for 40 more samples.
        assert!(range[777] > 9.0);
        assert!(range[817] > 9.0);
        assert!(range[818] < 1.0);
    }

    #[test]
    fn test_irregular_timestamps() {
        let time = [0.0, 0.01, 0.05, 0.2, 0.21, 0.5];
        let values = [1.0, 3.0, -2.0, 4.0, 4.0, 0.0];
        assert_eq!(
            sliding_range(&time, &values, WINDOW),
            brute_range(&time, &values, WINDOW)
        );
        let var = sliding_variance(&time, &values, WINDOW);
        assert_eq!(var[0], 0.0);
        assert_eq!(var[3], 0.0);
        assert_eq!(var[4], 0.0);
        assert_eq!(var[5], 0.0);
    }

    #[test]
    fn test_variance_never_negative() {
        let time: Vec<f64> = (0..500).map(|i| f64::from(i) * 0.001).collect();
        let values = vec![1e8 + 0.1; 500];
        assert!(sliding_variance(&time, &values, WINDOW)
            .iter()
            .all(|v| *v >= 0.0));
    }

    #[test]
    fn test_noise_datasets_share_time() {
        let (time, values) = signal();
        let acc = Dataset::new(ACC_DATASET, Provenance::Raw)
            .with_field(TIME_FIELD, time)
            .with_field("AccX", values.clone())
            .with_field("AccY", values.clone())
            .with_field("AccZ", values);

        let (range, variance) = noise_datasets(&acc, WINDOW).unwrap();
        assert_eq!(range.key(), RANGE_DATASET);
        assert_eq!(range.title(), "IMU Noise Analysis (0.1s Range/Peak-to-Peak)");
        assert_eq!(variance.title(), "IMU Noise Analysis (0.1s Variance)");
        assert_eq!(
            range.field_names().collect::<Vec<_>>(),
            ["Time", "RangeX", "RangeY", "RangeZ"]
        );
        assert_eq!(
            variance.field_names().collect::<Vec<_>>(),
            ["Time", "VarX", "VarY", "VarZ"]
        );
        assert_eq!(
            range.time().unwrap().as_ptr(),
            acc.time().unwrap().as_ptr()
        );
        assert!(range.is_renderable());
        assert_eq!(range.provenance(), Provenance::Noise);
    }

    #[test]
    fn test_noise_declines_without_axes_or_samples() {
        let partial = Dataset::new(ACC_DATASET, Provenance::Raw)
            .with_field(TIME_FIELD, vec![0.0, 0.1])
            .with_field("AccX", vec![0.0, 1.0]);
        assert!(noise_datasets(&partial, WINDOW).is_none());

        let single = Dataset::new(ACC_DATASET, Provenance::Raw)
            .with_field(TIME_FIELD, vec![0.0])
            .with_field("AccX", vec![0.0])
            .with_field("AccY", vec![0.0])
            .with_field("AccZ", vec![0.0]);
        assert!(noise_datasets(&single, WINDOW).is_none());
    }

    #[test]
    fn test_backward_time_keeps_every_sample() {
        let time = [0.0, 0.05, 0.02, 0.3, 0.1, -1.0, 0.4];
        let values = [1.0, -2.0, 4.0, 0.5, 3.0, -6.0, 2.0];

        let range = sliding_range(&time, &values, WINDOW);
        let variance = sliding_variance(&time, &values, WINDOW);
        assert_eq!(range.len(), values.len());
        assert_eq!(variance.len(), values.len());
        assert!(range.iter().all(|r| r.is_finite() && *r >= 0.0));
        assert!(variance.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn test_strictly_decreasing_time_never_shrinks_window() {
        let time: Vec<f64> = (0..50).map(|i| 5.0 - f64::from(i) * 0.1).collect();
        let values: Vec<f64> = (0..50).map(|i| f64::from(i % 7)).collect();

        let range = sliding_range(&time, &values, WINDOW);
        assert_eq!(range.len(), 50);
        // Every earlier sample looks "later", so the window only grows.
        assert_eq!(range[49], 6.0);
        assert!(range.windows(2).all(|w| w[1] >= w[0]));

        let acc = Dataset::new(ACC_DATASET, Provenance::Raw)
            .with_field(TIME_FIELD, time)
            .with_field("AccX", values.clone())
            .with_field("AccY", values.clone())
            .with_field("AccZ", values);
        let (range, variance) = noise_datasets(&acc, WINDOW).unwrap();
        assert_eq!(range.rows(), 50);
        assert!(variance.is_renderable());
    }
}
