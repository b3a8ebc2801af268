//! `DebugVect` (tag 250): a named vector of doubles.
//!
//! Layout: time u32 @2, 10-byte name @6, doubles from @16. The number of
//! doubles is `(length - 2 - 16) / 8`. The name decides where the values go:
//!
//! - `dianji` → `MotorOutput` (`Motor1..Motor8`)
//! - `lingP` → `Bias` (`Bias0..BiasN`)
//! - `thr` → `ControlState_Thr` (five named fields, needs at least five values)
//! - `ESC<id>Sta<d>` → `ESC_<id>_Msg<d>` with per-message field names
//! - anything else → `Debug_<name>` (`V0..VN`)

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::{Entry, Payload};

const NAME_OFFSET: usize = 6;
const NAME_LEN: usize = 10;
const DATA_OFFSET: usize = 16;
const MAX_MOTORS: usize = 8;

const THR_FIELDS: [&str; 5] = ["Throttle", "HoverThr", "Force", "TgtAccZ", "EsoAccZ"];
const ESC_RPM_FIELDS: [&str; 3] = ["RPM", "PWM", "Status"];
const ESC_POWER_FIELDS: [&str; 3] = ["Voltage", "Current", "Temp"];
const ESC_TEMP_FIELDS: [&str; 3] = ["MosTemp", "CapTemp", "MotorTemp"];

static ESC_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ESC(\d+)Sta(\d)$").expect("ESC name pattern is valid"));

fn value(p: &Payload<'_>, i: usize) -> f64 {
    p.f64(DATA_OFFSET + i * 8)
}

fn push_named(entry: &mut Entry, p: &Payload<'_>, fields: &[&'static str]) {
    for (i, field) in fields.iter().enumerate() {
        entry.push(*field, value(p, i));
    }
}

fn push_numbered(entry: &mut Entry, p: &Payload<'_>, prefix: &str, first: usize, count: usize) {
    for i in 0..count {
        entry.push(format!("{prefix}{}", i + first), value(p, i));
    }
}

pub(super) fn decode(p: &Payload<'_>) -> Vec<Entry> {
    let name = p.string(NAME_OFFSET, NAME_LEN);
    let count = p.len().saturating_sub(DATA_OFFSET) / 8;

    let mut entry = Entry::new("");
    entry.push("Time", p.time(2));

    let dataset: Cow<'static, str> = match name.as_str() {
        "dianji" => {
            push_numbered(&mut entry, p, "Motor", 1, count.min(MAX_MOTORS));
            "MotorOutput".into()
        }
        "lingP" => {
            push_numbered(&mut entry, p, "Bias", 0, count);
            "Bias".into()
        }
        "thr" => {
            if count >= THR_FIELDS.len() {
                push_named(&mut entry, p, &THR_FIELDS);
            }
            "ControlState_Thr".into()
        }
        _ => match ESC_NAME.captures(&name) {
            Some(caps) => {
                let (id, msg) = (&caps[1], &caps[2]);
                match msg {
                    "1" => push_named(&mut entry, p, &ESC_RPM_FIELDS),
                    "2" => push_named(&mut entry, p, &ESC_POWER_FIELDS),
                    "3" => push_named(&mut entry, p, &ESC_TEMP_FIELDS),
                    _ => push_numbered(&mut entry, p, "V", 0, count),
                }
                format!("ESC_{id}_Msg{msg}").into()
            }
            None => {
                push_numbered(&mut entry, p, "V", 0, count);
                format!("Debug_{name}").into()
            }
        },
    };
    entry.dataset = dataset;
    vec![entry]
}
