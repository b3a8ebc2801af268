//! Named tables of equal-length numeric columns.
//!
//! Raw datasets come out of the scanner; derived datasets are added by the
//! analysis stage under the same namespace and tagged with their
//! [`Provenance`].

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::series::DynamicSeries;

/// Name of the column every dataset is keyed on.
pub const TIME_FIELD: &str = "Time";

/// All datasets of a parsed log, keyed by dataset name.
pub type DatasetMap = BTreeMap<String, Dataset>;

/// A frozen, read-only column of samples.
///
/// Cloning is cheap: derived datasets share the `Time` column of the dataset
/// they were computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column(Arc<Vec<f64>>);

impl Deref for Column {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Self(Arc::new(values))
    }
}

impl FromIterator<f64> for Column {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.as_slice().serialize(serializer)
    }
}

/// Which stage produced a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Decoded directly from log records.
    Raw,
    /// Sliding-window range or variance.
    Noise,
    /// Welch-averaged magnitude spectrum.
    Fft,
    /// Short-time Fourier power grid.
    Spectrogram,
    /// Sensor-versus-estimator comparison.
    Comparison,
    /// Reconstruction of the sensor the estimator was using.
    UsedSensor,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Noise => write!(f, "noise"),
            Self::Fft => write!(f, "fft"),
            Self::Spectrogram => write!(f, "spectrogram"),
            Self::Comparison => write!(f, "comparison"),
            Self::UsedSensor => write!(f, "used_sensor"),
        }
    }
}

/// Meaning of the `Time` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    /// Seconds since boot.
    #[default]
    Time,
    /// Hertz; used by spectra, which store their frequency axis in `Time`.
    Frequency,
}

/// A named table of columns sharing one row index.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    key: String,
    title: String,
    provenance: Provenance,
    x_axis: AxisKind,
    fields: Vec<(String, Column)>,
}

impl Dataset {
    /// Create an empty dataset whose title equals its key.
    #[must_use]
    pub fn new(key: impl Into<String>, provenance: Provenance) -> Self {
        let key = key.into();
        Self {
            title: key.clone(),
            key,
            provenance,
            x_axis: AxisKind::Time,
            fields: Vec::new(),
        }
    }

    /// Set a display title distinct from the key.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the meaning of the `Time` column.
    #[must_use]
    pub fn with_x_axis(mut self, x_axis: AxisKind) -> Self {
        self.x_axis = x_axis;
        self
    }

    /// Add or replace a column, keeping first-insertion order.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, column: impl Into<Column>) -> Self {
        self.insert(name, column);
        self
    }

    /// Add or replace a column, keeping first-insertion order.
    pub fn insert(&mut self, name: impl Into<String>, column: impl Into<Column>) {
        let name = name.into();
        let column = column.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column,
            None => self.fields.push((name, column)),
        }
    }

    /// Dataset key in the namespace.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human-readable title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Stage that produced this dataset.
    #[must_use]
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Meaning of the `Time` column.
    #[must_use]
    pub fn x_axis(&self) -> AxisKind {
        self.x_axis
    }

    /// Look up a column by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Column> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// The `Time` column, if present.
    #[must_use]
    pub fn time(&self) -> Option<&Column> {
        self.field(TIME_FIELD)
    }

    /// Whether a column with this name exists.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Column names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Columns in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.fields.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Number of rows, taken from the `Time` column (or the first column).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.time()
            .or_else(|| self.fields.first().map(|(_, c)| c))
            .map_or(0, |c| c.len())
    }

    /// Check that every column has the same length as `Time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InconsistentLengths`] naming the first offending
    /// column.
    pub fn validate(&self) -> Result<usize> {
        let expected = self.rows();
        for (name, column) in &self.fields {
            if column.len() != expected {
                return Err(Error::InconsistentLengths {
                    dataset: self.key.clone(),
                    field: name.clone(),
                    expected,
                    actual: column.len(),
                });
            }
        }
        Ok(expected)
    }

    /// Whether a renderer can plot this dataset: it has a non-empty `Time`
    /// column, at least one other column, and consistent lengths.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.time().is_some_and(|t| !t.is_empty())
            && self.fields.len() > 1
            && self.validate().is_ok()
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Fields<'a>(&'a [(String, Column)]);

        impl Serialize for Fields<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (name, column) in self.0 {
                    map.serialize_entry(name, column)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("name", &self.title)?;
        map.serialize_entry("provenance", &self.provenance)?;
        map.serialize_entry("xAxis", &self.x_axis)?;
        map.serialize_entry("data", &Fields(&self.fields))?;
        map.end()
    }
}

/// A dataset under construction: columns are discovered lazily and grow one
/// sample at a time.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    fields: Vec<(String, DynamicSeries)>,
}

impl DatasetBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to column `field`, allocating the column on first sight.
    pub fn push(&mut self, field: &str, value: f64) {
        if let Some((_, series)) = self.fields.iter_mut().find(|(n, _)| n == field) {
            series.push(value);
            return;
        }
        let mut series = DynamicSeries::new();
        series.push(value);
        self.fields.push((field.to_string(), series));
    }

    /// Number of columns discovered so far.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Freeze every column into a raw [`Dataset`].
    #[must_use]
    pub fn freeze(self, key: &str) -> Dataset {
        let mut dataset = Dataset::new(key, Provenance::Raw);
        for (name, series) in self.fields {
            dataset.fields.push((name, series.freeze()));
        }
        dataset
    }
}
