//! `LocalPositionNED` (tag 32): the estimator's output.
//!
//! One record fans out into three datasets sharing the same `Time`:
//! position (with the XY/Z sensor selectors), velocity and acceleration.

use super::{Entry, Payload};

pub(super) fn decode(p: &Payload<'_>) -> Vec<Entry> {
    let time = p.time(2);
    vec![
        Entry::new("LocalPosition_Pos")
            .with("Time", time)
            .with("XYSensor", f64::from(p.i8(0)))
            .with("ZSensor", f64::from(p.i8(1)))
            .with("PosX", p.f64(6))
            .with("PosY", p.f64(14))
            .with("PosZ", p.f64(22)),
        Entry::new("LocalPosition_Vel")
            .with("Time", time)
            .with("VelX", p.f64(30))
            .with("VelY", p.f64(38))
            .with("VelZ", p.f64(46)),
        Entry::new("LocalPosition_Acc")
            .with("Time", time)
            .with("AccX", p.f64(54))
            .with("AccY", p.f64(62))
            .with("AccZ", p.f64(70)),
    ]
}
