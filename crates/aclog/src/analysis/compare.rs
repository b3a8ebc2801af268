//! Sensor-versus-estimator comparisons.
//!
//! Raw `PosSensor_*` datasets are aligned to the estimator by nearest time and
//! differenced per active axis. The same alignment reconstructs which sensor
//! the estimator was fusing at each instant from its selector fields.

use std::collections::HashMap;

use serde::Serialize;

use crate::dataset::{Column, Dataset, DatasetMap, Provenance, TIME_FIELD};

/// Prefix shared by all raw position sensor datasets.
pub const SENSOR_PREFIX: &str = "PosSensor_";

/// Estimator position dataset.
pub const ESTIMATOR_POS: &str = "LocalPosition_Pos";

/// Estimator velocity dataset.
pub const ESTIMATOR_VEL: &str = "LocalPosition_Vel";

/// Reconstructed used-sensor dataset.
pub const USED_SENSOR_DATASET: &str = "FC_UsedSensors_Pos";

/// Position axes, in order.
pub const POS_AXES: [&str; 3] = ["PosX", "PosY", "PosZ"];

/// Velocity axes, in order.
pub const VEL_AXES: [&str; 3] = ["VelX", "VelY", "VelZ"];

/// Index of the estimator sample nearest in time to `t`.
///
/// `times` must be sorted. When `t` is exactly halfway between two samples
/// the later one wins. Returns `None` for an empty series.
#[must_use]
pub fn nearest_index(times: &[f64], t: f64) -> Option<usize> {
    if times.is_empty() {
        return None;
    }
    let i = times.partition_point(|&x| x < t);
    if i == 0 {
        return Some(0);
    }
    if i == times.len() {
        return Some(i - 1);
    }
    if t - times[i - 1] < times[i] - t {
        Some(i - 1)
    } else {
        Some(i)
    }
}

/// Values of `reference` sampled at the nearest `reference_time` to each of
/// `times`. Missing references yield NaN.
#[must_use]
pub fn align_nearest(times: &[f64], reference_time: &[f64], reference: &[f64]) -> Vec<f64> {
    times
        .iter()
        .map(|&t| {
            nearest_index(reference_time, t)
                .and_then(|i| reference.get(i).copied())
                .unwrap_or(f64::NAN)
        })
        .collect()
}

/// Which axes of a sensor dataset carry data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActiveAxes {
    /// `PosX`, `PosY`, `PosZ`.
    pub pos: [bool; 3],
    /// `VelX`, `VelY`, `VelZ`.
    pub vel: [bool; 3],
}

impl ActiveAxes {
    /// Inspect a dataset: an axis is active if its field exists and is not
    /// all zero.
    #[must_use]
    pub fn of(dataset: &Dataset) -> Self {
        let active = |name: &str| {
            dataset
                .field(name)
                .is_some_and(|column| column.iter().any(|v| *v != 0.0))
        };
        Self {
            pos: POS_AXES.map(active),
            vel: VEL_AXES.map(active),
        }
    }

    /// Whether no axis is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.pos.iter().chain(&self.vel).any(|a| *a)
    }

    /// Names of the active axes, positions first.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        POS_AXES
            .iter()
            .zip(self.pos)
            .chain(VEL_AXES.iter().zip(self.vel))
            .filter(|(_, active)| *active)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Classify the sensor by its active axis combination.
    #[must_use]
    pub fn category(&self) -> SensorCategory {
        let [px, py, pz] = self.pos;
        let [vx, vy, vz] = self.vel;
        let pos_xy = px && py;
        let vel_xy = vx && vy;
        let pos_3d = pos_xy && pz;
        let vel_3d = vel_xy && vz;
        let any_xy = px || py || vx || vy;

        if pos_3d && vel_3d {
            SensorCategory::Position3dVelocity
        } else if pos_3d {
            SensorCategory::Position3d
        } else if vel_3d && !pos_xy {
            SensorCategory::Velocity3d
        } else if pz || vz {
            if any_xy {
                SensorCategory::Unclassified
            } else {
                SensorCategory::Altitude
            }
        } else if pos_xy && vel_xy {
            SensorCategory::HorizontalPositionVelocity
        } else if pos_xy {
            SensorCategory::HorizontalPosition
        } else if vel_xy {
            SensorCategory::HorizontalVelocity
        } else {
            SensorCategory::Unclassified
        }
    }
}

/// What a sensor measures, judged from its active axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SensorCategory {
    /// X and Y position.
    HorizontalPosition,
    /// X and Y velocity.
    HorizontalVelocity,
    /// X and Y position and velocity.
    HorizontalPositionVelocity,
    /// Z only.
    Altitude,
    /// X, Y and Z position.
    Position3d,
    /// X, Y and Z position and velocity.
    Position3dVelocity,
    /// X, Y and Z velocity.
    Velocity3d,
    /// Any other combination.
    Unclassified,
}

impl SensorCategory {
    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::HorizontalPosition => "Horizontal Position",
            Self::HorizontalVelocity => "Horizontal Velocity",
            Self::HorizontalPositionVelocity => "Horizontal Position+Velocity",
            Self::Altitude => "Altitude",
            Self::Position3d => "3D Position",
            Self::Position3dVelocity => "3D Position+Velocity",
            Self::Velocity3d => "3D Velocity",
            Self::Unclassified => "Unclassified",
        }
    }
}

impl std::fmt::Display for SensorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Summary of one compared sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReport {
    /// Sensor dataset key.
    pub key: String,
    /// Classification of the sensor.
    pub category: SensorCategory,
    /// Active axis names.
    pub axes: Vec<&'static str>,
}

fn estimator_for(axis: &str) -> (&'static str, &'static str) {
    if axis.starts_with("Vel") {
        (ESTIMATOR_VEL, "Velocity")
    } else {
        (ESTIMATOR_POS, "Position")
    }
}

/// Build a comparison dataset of `values` at `time` against the estimator
/// field `axis`, or `None` if the estimator lacks it.
fn inspection(
    key: String,
    title: String,
    time: &Column,
    values: Column,
    estimator: &Dataset,
    axis: &str,
) -> Option<Dataset> {
    let est_time = estimator.time()?;
    let est_values = estimator.field(axis)?;
    let aligned = align_nearest(time, est_time, est_values);
    let error: Vec<f64> = values.iter().zip(&aligned).map(|(s, e)| s - e).collect();
    Some(
        Dataset::new(key, Provenance::Comparison)
            .with_title(title)
            .with_field(TIME_FIELD, time.clone())
            .with_field("Sensor", values)
            .with_field("Estimator", aligned)
            .with_field("Error", error),
    )
}

/// Compare every raw sensor dataset with an active axis to the estimator.
///
/// Produces one `<sensor>_Inspect_<axis>` dataset per active axis whose
/// estimator counterpart exists, and a report per sensor.
#[must_use]
pub fn compare_sensors(datasets: &DatasetMap) -> (Vec<Dataset>, Vec<SensorReport>) {
    let mut inspections = Vec::new();
    let mut reports = Vec::new();

    for (key, sensor) in datasets.range(SENSOR_PREFIX.to_string()..) {
        if !key.starts_with(SENSOR_PREFIX) {
            break;
        }
        if sensor.provenance() != Provenance::Raw || sensor.validate().is_err() {
            continue;
        }
        let Some(time) = sensor.time() else {
            continue;
        };
        let axes = ActiveAxes::of(sensor);
        if axes.is_empty() {
            continue;
        }

        let names = axes.names();
        for axis in &names {
            let (estimator_key, kind) = estimator_for(axis);
            let Some(estimator) = datasets.get(estimator_key) else {
                continue;
            };
            let Some(values) = sensor.field(axis) else {
                continue;
            };
            if let Some(dataset) = inspection(
                format!("{key}_Inspect_{axis}"),
                format!("Sensor {axis} vs Estimator {kind} {axis}"),
                time,
                values.clone(),
                estimator,
                axis,
            ) {
                inspections.push(dataset);
            }
        }
        reports.push(SensorReport {
            key: key.clone(),
            category: axes.category(),
            axes: names,
        });
    }
    (inspections, reports)
}

/// Finds the sensor dataset a selector id refers to, caching lookups.
struct SensorLookup<'a> {
    datasets: &'a DatasetMap,
    horizontal: HashMap<i64, Option<&'a Dataset>>,
    vertical: HashMap<i64, Option<&'a Dataset>>,
}

impl<'a> SensorLookup<'a> {
    fn new(datasets: &'a DatasetMap) -> Self {
        Self {
            datasets,
            horizontal: HashMap::new(),
            vertical: HashMap::new(),
        }
    }

    fn candidates(&self, id: i64) -> impl Iterator<Item = &'a Dataset> {
        let prefix = format!("{SENSOR_PREFIX}{id}_");
        self.datasets
            .range(prefix.clone()..)
            .take_while(move |(key, _)| key.starts_with(&prefix))
            .map(|(_, dataset)| dataset)
            .filter(|dataset| dataset.provenance() == Provenance::Raw)
    }

    /// Sensor `id` with both horizontal position axes active, falling back to
    /// any with a `PosX` field.
    fn horizontal(&mut self, id: i64) -> Option<&'a Dataset> {
        if let Some(hit) = self.horizontal.get(&id) {
            return *hit;
        }
        let found = self
            .candidates(id)
            .find(|d| {
                let axes = ActiveAxes::of(d);
                axes.pos[0] && axes.pos[1]
            })
            .or_else(|| self.candidates(id).find(|d| d.has_field("PosX")));
        self.horizontal.insert(id, found);
        found
    }

    /// Sensor `id` with an active `PosZ`, falling back to any with the field.
    fn vertical(&mut self, id: i64) -> Option<&'a Dataset> {
        if let Some(hit) = self.vertical.get(&id) {
            return *hit;
        }
        let found = self
            .candidates(id)
            .find(|d| ActiveAxes::of(d).pos[2])
            .or_else(|| self.candidates(id).find(|d| d.has_field("PosZ")));
        self.vertical.insert(id, found);
        found
    }
}

fn sample_at(dataset: Option<&Dataset>, field: &str, t: f64) -> f64 {
    dataset
        .and_then(|d| {
            let time = d.time()?;
            let values = d.field(field)?;
            values.get(nearest_index(time, t)?).copied()
        })
        .unwrap_or(f64::NAN)
}

fn selector(value: f64) -> Option<i64> {
    (value.is_finite() && value >= 0.0).then(|| value as i64)
}

/// Reconstruct the position of the sensor the estimator was using at each of
/// its samples.
///
/// Returns `None` without an estimator position dataset carrying `Time`,
/// `XYSensor` and `ZSensor`.
#[must_use]
pub fn used_sensor_dataset(datasets: &DatasetMap) -> Option<Dataset> {
    let estimator = datasets.get(ESTIMATOR_POS)?;
    let time = estimator.time()?;
    let xy_sensor = estimator.field("XYSensor")?;
    let z_sensor = estimator.field("ZSensor")?;
    if estimator.validate().is_err() {
        return None;
    }

    let mut lookup = SensorLookup::new(datasets);
    let rows = time.len();
    let mut pos_x = Vec::with_capacity(rows);
    let mut pos_y = Vec::with_capacity(rows);
    let mut pos_z = Vec::with_capacity(rows);

    for ((&t, &xy), &z) in time.iter().zip(xy_sensor.iter()).zip(z_sensor.iter()) {
        let horizontal = selector(xy).and_then(|id| lookup.horizontal(id));
        pos_x.push(sample_at(horizontal, "PosX", t));
        pos_y.push(sample_at(horizontal, "PosY", t));
        let vertical = selector(z).and_then(|id| lookup.vertical(id));
        pos_z.push(sample_at(vertical, "PosZ", t));
    }

    Some(
        Dataset::new(USED_SENSOR_DATASET, Provenance::UsedSensor)
            .with_title("Realtime Used Sensor Position")
            .with_field(TIME_FIELD, time.clone())
            .with_field("XYSensor", xy_sensor.clone())
            .with_field("ZSensor", z_sensor.clone())
            .with_field("PosX", pos_x)
            .with_field("PosY", pos_y)
            .with_field("PosZ", pos_z),
    )
}

/// Compare the reconstructed used sensor against the estimator, for every
/// axis with at least one resolved sample.
#[must_use]
pub fn used_sensor_inspections(used: &Dataset, datasets: &DatasetMap) -> Vec<Dataset> {
    let (Some(time), Some(estimator)) = (used.time(), datasets.get(ESTIMATOR_POS)) else {
        return Vec::new();
    };
    POS_AXES
        .iter()
        .filter_map(|axis| {
            let values = used.field(axis)?;
            if !values.iter().any(|v| v.is_finite()) {
                return None;
            }
            inspection(
                format!("FC_UsedSensors_Inspect_{axis}"),
                format!("Used Sensor {axis} vs Estimator Position {axis}"),
                time,
                values.clone(),
                estimator,
                axis,
            )
        })
        .collect()
}
