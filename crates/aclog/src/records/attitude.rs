//! `Attitude` (tag 30) and `AttitudeQuaternion` (tag 31).
//!
//! Angles and rates arrive in radians and are stored in degrees. The
//! quaternion form also gets Euler angles derived from `Q0..Q3`.

use std::f64::consts::FRAC_PI_2;

use super::{Entry, Payload, RAD_TO_DEG};

pub(super) fn decode_euler(p: &Payload<'_>) -> Vec<Entry> {
    let entry = Entry::new("Attitude")
        .with("Time", p.time(2))
        .with("Roll", p.f64(6) * RAD_TO_DEG)
        .with("Pitch", p.f64(14) * RAD_TO_DEG)
        .with("Yaw", p.f64(22) * RAD_TO_DEG)
        .with("RollRate", p.f64(30) * RAD_TO_DEG)
        .with("PitchRate", p.f64(38) * RAD_TO_DEG)
        .with("YawRate", p.f64(46) * RAD_TO_DEG);
    vec![entry]
}

/// Roll, pitch and yaw in radians for a unit quaternion `(w, x, y, z)`.
///
/// Pitch saturates at +/-90 degrees once `|sin(pitch)|` reaches 1.
#[must_use]
pub fn quaternion_to_euler(q0: f64, q1: f64, q2: f64, q3: f64) -> (f64, f64, f64) {
    let sinr_cosp = 2.0 * (q0 * q1 + q2 * q3);
    let cosr_cosp = 1.0 - 2.0 * (q1 * q1 + q2 * q2);
    let roll = sinr_cosp.atan2(cosr_cosp);

    let sinp = 2.0 * (q0 * q2 - q3 * q1);
    let pitch = if sinp.abs() >= 1.0 {
        FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    let siny_cosp = 2.0 * (q0 * q3 + q1 * q2);
    let cosy_cosp = 1.0 - 2.0 * (q2 * q2 + q3 * q3);
    let yaw = siny_cosp.atan2(cosy_cosp);

    (roll, pitch, yaw)
}

pub(super) fn decode_quaternion(p: &Payload<'_>) -> Vec<Entry> {
    let (q0, q1, q2, q3) = (p.f64(6), p.f64(14), p.f64(22), p.f64(30));
    let (roll, pitch, yaw) = quaternion_to_euler(q0, q1, q2, q3);
    let entry = Entry::new("AttitudeQuaternion")
        .with("Time", p.time(2))
        .with("Q0", q0)
        .with("Q1", q1)
        .with("Q2", q2)
        .with("Q3", q3)
        .with("Roll", roll * RAD_TO_DEG)
        .with("Pitch", pitch * RAD_TO_DEG)
        .with("Yaw", yaw * RAD_TO_DEG)
        .with("RollRate", p.f64(38) * RAD_TO_DEG)
        .with("PitchRate", p.f64(46) * RAD_TO_DEG)
        .with("YawRate", p.f64(54) * RAD_TO_DEG);
    vec![entry]
}
