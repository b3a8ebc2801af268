//! `IMU` (tag 27): one raw inertial, magnetic or dual-antenna sample.
//!
//! The sensor kind byte and index byte select the dataset, so every physical
//! sensor gets its own `IMU_<Kind>_<Index>` table.

use std::borrow::Cow;

use super::{Entry, Payload};

const KINDS: [&str; 5] = ["Unknown", "Accel", "Gyro", "Mag", "DualAnt"];

fn kind_name(kind: u8) -> Cow<'static, str> {
    match KINDS.get(usize::from(kind)) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(format!("Type{kind}")),
    }
}

pub(super) fn decode(p: &Payload<'_>) -> Vec<Entry> {
    let kind = p.u8(0);
    let index = p.u8(1);
    let entry = Entry::new(format!("IMU_{}_{index}", kind_name(kind)))
        .with("Time", p.time(2))
        .with("X", f64::from(p.f32(18)))
        .with("Y", f64::from(p.f32(22)))
        .with("Z", f64::from(p.f32(26)))
        .with("Rate", f64::from(p.f32(30)))
        .with("Temp", f64::from(p.f32(34)));
    vec![entry]
}
