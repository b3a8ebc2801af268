//! Append-only numeric column used while a log is being scanned.

use crate::dataset::Column;

/// Capacity reserved for a fresh series.
pub const INITIAL_CAPACITY: usize = 10_000;

/// An append-only buffer of `f64` samples.
///
/// Capacity grows by half of its current size whenever it fills up, so pushes
/// are amortised O(1) and earlier samples are never moved out of order.
/// [`DynamicSeries::trimmed`] exposes exactly the pushed values, and
/// [`DynamicSeries::freeze`] hands the storage to a read-only [`Column`]
/// without copying it.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicSeries {
    data: Vec<f64>,
}

impl Default for DynamicSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicSeries {
    /// Create a series with the default initial capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Create a series with a specific initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity.max(1)),
        }
    }

    /// Append one sample.
    pub fn push(&mut self, value: f64) {
        if self.data.len() == self.data.capacity() {
            let current = self.data.capacity();
            let grow_by = current.div_ceil(2).max(1);
            self.data.reserve_exact(grow_by);
        }
        self.data.push(value);
    }

    /// Number of pushed samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been pushed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Currently allocated capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The pushed samples, without any trailing spare capacity.
    #[must_use]
    pub fn trimmed(&self) -> &[f64] {
        &self.data
    }

    /// Freeze into a read-only column, reusing the backing allocation.
    #[must_use]
    pub fn freeze(self) -> Column {
        Column::from(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_trim() {
        let mut series = DynamicSeries::with_capacity(2);
        for i in 0..5 {
            series.push(f64::from(i));
        }
        assert_eq!(series.len(), 5);
        assert_eq!(series.trimmed(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_growth_is_geometric() {
        let mut series = DynamicSeries::with_capacity(10);
        for i in 0..11 {
            series.push(f64::from(i));
        }
        assert!(series.capacity() >= 15);
        assert_eq!(series.trimmed()[10], 10.0);
    }

    #[test]
    fn test_tiny_capacity_still_grows() {
        let mut series = DynamicSeries::with_capacity(0);
        series.push(1.0);
        series.push(2.0);
        series.push(3.0);
        assert_eq!(series.trimmed(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_ten_million_pushes_preserve_order() {
        const N: usize = 10_000_000;
        let mut series = DynamicSeries::new();
        for i in 0..N {
            series.push(i as f64);
        }
        let view = series.trimmed();
        assert_eq!(view.len(), N);
        assert!(view.iter().enumerate().all(|(i, &v)| v == i as f64));
    }

    #[test]
    fn test_freeze_reuses_storage() {
        let mut series = DynamicSeries::with_capacity(4);
        series.push(1.0);
        series.push(2.0);
        let ptr = series.trimmed().as_ptr();
        let column = series.freeze();
        assert_eq!(column.as_ptr(), ptr);
        assert_eq!(&*column, &[1.0, 2.0]);
    }

    #[test]
    fn test_empty_series() {
        let series = DynamicSeries::default();
        assert!(series.is_empty());
        assert!(series.trimmed().is_empty());
        assert!(series.capacity() >= INITIAL_CAPACITY);
    }
}
