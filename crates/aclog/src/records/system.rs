//! `SystemState` (tag 1): flight controller housekeeping.
//!
//! Layout: flags u16 @0, time u32 @2, CPU load u8 @6, RC status u8 @7,
//! battery percent u8 @8, battery id u8 @9, voltage f32 @10, current f32 @14,
//! RC channels 4 x f32 @18, temperature i8 @50, mode u8 @51.

use super::{Entry, Payload};

const RC_START: usize = 18;

pub(super) fn decode(p: &Payload<'_>) -> Vec<Entry> {
    let entry = Entry::new("SystemState")
        .with("Time", p.time(2))
        .with("Flags", f64::from(p.u16(0)))
        .with("CPULoad", f64::from(p.u8(6)))
        .with("BatPct", f64::from(p.u8(8)))
        .with("Voltage", f64::from(p.f32(10)))
        .with("Current", f64::from(p.f32(14)))
        .with("Temp", f64::from(p.i8(50)))
        .with("Mode", f64::from(p.u8(51)))
        .with("RC_Roll", f64::from(p.f32(RC_START)))
        .with("RC_Pitch", f64::from(p.f32(RC_START + 4)))
        .with("RC_Yaw", f64::from(p.f32(RC_START + 8)))
        .with("RC_Thr", f64::from(p.f32(RC_START + 12)));
    vec![entry]
}
