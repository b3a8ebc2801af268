//! `PosSensor` (tag 28): samples from position and velocity sensors.
//!
//! The payload length selects the shape:
//!
//! | payload | contents                        | suffix       |
//! |---------|---------------------------------|--------------|
//! | 38      | 3 x f64 @14, pos or vel by type | `Pos`/`Vel`  |
//! | 62      | 6 x f64 @14, pos then vel       | `PosVel`     |
//! | 70      | 3 x f64 @46, GPS position       | `GPS_Pos`    |
//! | 94      | 6 x f64 @46, GPS pos then vel   | `GPS_PosVel` |
//!
//! Any other length yields only `Time`, under a dataset with an empty suffix.

use super::{Entry, Payload};

/// Data type values below this carry position; the rest carry velocity.
const VELOCITY_DATA_TYPE: u8 = 8;

const POS_FIELDS: [&str; 3] = ["PosX", "PosY", "PosZ"];
const VEL_FIELDS: [&str; 3] = ["VelX", "VelY", "VelZ"];

fn push_triple(entry: &mut Entry, p: &Payload<'_>, fields: [&'static str; 3], offset: usize) {
    for (i, field) in fields.into_iter().enumerate() {
        entry.push(field, p.f64(offset + i * 8));
    }
}

pub(super) fn decode(p: &Payload<'_>) -> Vec<Entry> {
    let data_type = p.u8(1);
    let index = p.u8(6) & 0x7F;

    let mut entry = Entry::new("");
    entry.push("Time", p.time(2));

    let suffix = match p.len() {
        38 if data_type < VELOCITY_DATA_TYPE => {
            push_triple(&mut entry, p, POS_FIELDS, 14);
            "Pos"
        }
        38 => {
            push_triple(&mut entry, p, VEL_FIELDS, 14);
            "Vel"
        }
        62 => {
            push_triple(&mut entry, p, POS_FIELDS, 14);
            push_triple(&mut entry, p, VEL_FIELDS, 38);
            "PosVel"
        }
        70 => {
            push_triple(&mut entry, p, POS_FIELDS, 46);
            "GPS_Pos"
        }
        94 => {
            push_triple(&mut entry, p, POS_FIELDS, 46);
            push_triple(&mut entry, p, VEL_FIELDS, 70);
            "GPS_PosVel"
        }
        _ => "",
    };
    entry.dataset = format!("PosSensor_{index}_{suffix}").into();
    vec![entry]
}
