//! Record type registry and per-type decoders.
//!
//! Each known type tag maps to a pure decoder that turns one payload into one
//! or more [`Entry`] values. A single wire record may fan out into several
//! datasets, and the dataset name itself may depend on payload contents.

mod attitude;
mod debug_vect;
mod imu;
mod local_position;
mod pos_sensor;
mod system;

use std::borrow::Cow;

pub use attitude::quaternion_to_euler;

use crate::codec::{Cursor, Endian};

/// Bytes of a record counted by its length field that precede the payload
/// (the type tag and the length byte itself).
pub const LENGTH_OVERHEAD: usize = 2;

/// Scale applied to the raw `u32` tick counter to get seconds.
pub const TIME_SCALE: f64 = 0.0001;

/// Radians to degrees, as used by the flight controller.
pub const RAD_TO_DEG: f64 = 57.295_779_5;

/// One (dataset, field values) result produced by a decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Dataset the values are appended to.
    pub dataset: Cow<'static, str>,
    /// Field name and value pairs, in a fixed order.
    pub values: Vec<(Cow<'static, str>, f64)>,
}

impl Entry {
    /// Start an entry for `dataset`.
    #[must_use]
    pub fn new(dataset: impl Into<Cow<'static, str>>) -> Self {
        Self {
            dataset: dataset.into(),
            values: Vec::with_capacity(12),
        }
    }

    /// Append a field value.
    #[must_use]
    pub fn with(mut self, field: impl Into<Cow<'static, str>>, value: f64) -> Self {
        self.push(field, value);
        self
    }

    /// Append a field value.
    pub fn push(&mut self, field: impl Into<Cow<'static, str>>, value: f64) {
        self.values.push((field.into(), value));
    }

    /// Look up a decoded value by field name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| *v)
    }
}

/// A record payload handed to a decoder.
///
/// Reads are relative to the payload start and bounded by the record's
/// declared length. A field that would extend past the payload reads as zero,
/// so a short but well-framed record yields zeroed values instead of pulling
/// bytes from the next frame.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    cursor: Cursor<'a>,
    start: usize,
    length: u8,
}

macro_rules! payload_read {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $width:expr) => {
        $(#[$doc])*
        #[must_use]
        pub fn $name(&self, offset: usize) -> $ty {
            if offset + $width > self.len() {
                return <$ty>::default();
            }
            self.cursor.$name(self.start + offset).unwrap_or_default()
        }
    };
}

impl<'a> Payload<'a> {
    /// Wrap the payload starting at `start` in `buf`.
    ///
    /// `length` is the record's length byte, which covers the type tag, the
    /// length byte and the payload.
    #[must_use]
    pub fn new(buf: &'a [u8], start: usize, endian: Endian, length: u8) -> Self {
        Self {
            cursor: Cursor::new(buf, endian),
            start,
            length,
        }
    }

    /// The record's declared length byte.
    #[must_use]
    pub fn declared_length(&self) -> u8 {
        self.length
    }

    /// Number of payload bytes (`length - 2`).
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.length).saturating_sub(LENGTH_OVERHEAD)
    }

    /// Whether the payload carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    payload_read!(
        /// Unsigned byte at `offset`, or zero past the payload.
        u8, u8, 1
    );
    payload_read!(
        /// Signed byte at `offset`, or zero past the payload.
        i8, i8, 1
    );
    payload_read!(
        /// Unsigned 16-bit value at `offset`, or zero past the payload.
        u16, u16, 2
    );
    payload_read!(
        /// Unsigned 32-bit value at `offset`, or zero past the payload.
        u32, u32, 4
    );
    payload_read!(
        /// 32-bit float at `offset`, or zero past the payload.
        f32, f32, 4
    );
    payload_read!(
        /// 64-bit float at `offset`, or zero past the payload.
        f64, f64, 8
    );

    /// Tick counter at `offset` scaled to seconds.
    #[must_use]
    pub fn time(&self, offset: usize) -> f64 {
        f64::from(self.u32(offset)) * TIME_SCALE
    }

    /// Null-terminated string of at most `max_len` bytes, clipped to the
    /// payload.
    #[must_use]
    pub fn string(&self, offset: usize, max_len: usize) -> String {
        let available = self.len().saturating_sub(offset).min(max_len);
        self.cursor
            .fixed_str(self.start + offset, available)
            .unwrap_or_default()
    }
}

/// Signature shared by every decoder.
pub type Decoder = fn(&Payload<'_>) -> Vec<Entry>;

/// Known record types, keyed by their wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordKind {
    /// Flight controller housekeeping.
    SystemState = 1,
    /// Raw inertial and magnetic sensor sample.
    Imu = 27,
    /// Position or velocity sensor sample.
    PosSensor = 28,
    /// Euler attitude and rates.
    Attitude = 30,
    /// Quaternion attitude and rates.
    AttitudeQuaternion = 31,
    /// Estimator position, velocity and acceleration.
    LocalPositionNed = 32,
    /// Named vector of doubles.
    DebugVect = 250,
}

impl RecordKind {
    /// Every registered record kind.
    pub const ALL: [Self; 7] = [
        Self::SystemState,
        Self::Imu,
        Self::PosSensor,
        Self::Attitude,
        Self::AttitudeQuaternion,
        Self::LocalPositionNed,
        Self::DebugVect,
    ];

    /// Look up the kind registered for a wire tag.
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::SystemState),
            27 => Some(Self::Imu),
            28 => Some(Self::PosSensor),
            30 => Some(Self::Attitude),
            31 => Some(Self::AttitudeQuaternion),
            32 => Some(Self::LocalPositionNed),
            250 => Some(Self::DebugVect),
            _ => None,
        }
    }

    /// The wire tag of this kind.
    #[must_use]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Type name used when labelling frame statistics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SystemState => "SystemState",
            Self::Imu => "IMU",
            Self::PosSensor => "PosSensor",
            Self::Attitude => "Attitude",
            Self::AttitudeQuaternion => "AttitudeQuaternion",
            Self::LocalPositionNed => "LocalPositionNED",
            Self::DebugVect => "DebugVect",
        }
    }

    /// The decoder registered for this kind.
    #[must_use]
    pub fn decoder(self) -> Decoder {
        match self {
            Self::SystemState => system::decode,
            Self::Imu => imu::decode,
            Self::PosSensor => pos_sensor::decode,
            Self::Attitude => attitude::decode_euler,
            Self::AttitudeQuaternion => attitude::decode_quaternion,
            Self::LocalPositionNed => local_position::decode,
            Self::DebugVect => debug_vect::decode,
        }
    }

    /// Decode one payload.
    #[must_use]
    pub fn decode(self, payload: &Payload<'_>) -> Vec<Entry> {
        (self.decoder())(payload)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Type name for a tag, or `None` if the tag is not registered.
#[must_use]
pub fn type_name(tag: u8) -> Option<&'static str> {
    RecordKind::from_tag(tag).map(RecordKind::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_round_trips_tags() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(RecordKind::from_tag(0), None);
        assert_eq!(RecordKind::from_tag(29), None);
        assert_eq!(RecordKind::from_tag(255), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(32), Some("LocalPositionNED"));
        assert_eq!(type_name(27), Some("IMU"));
        assert_eq!(type_name(99), None);
        assert_eq!(RecordKind::DebugVect.to_string(), "DebugVect");
    }

    #[test]
    fn test_payload_reads_are_bounded_by_length() {
        let mut buf = vec![0xAA, 0xBB];
        buf.extend_from_slice(&7u32.to_le_bytes());
        buf.extend_from_slice(&[0xFF; 8]);
        // Declared payload is 4 bytes; the trailing 0xFF bytes belong to
        // someone else.
        let payload = Payload::new(&buf, 2, Endian::Little, 6);

        assert_eq!(payload.len(), 4);
        assert_eq!(payload.u32(0), 7);
        assert_eq!(payload.u8(4), 0);
        assert_eq!(payload.f64(2), 0.0);
    }

    #[test]
    fn test_payload_never_reads_past_buffer() {
        let buf = [1u8, 2, 3];
        let payload = Payload::new(&buf, 0, Endian::Little, 200);
        assert_eq!(payload.u8(2), 3);
        assert_eq!(payload.u32(1), 0);
        assert_eq!(payload.string(0, 10), "");
    }

    #[test]
    fn test_payload_short_length_byte() {
        let buf = [0u8; 8];
        let payload = Payload::new(&buf, 0, Endian::Little, 1);
        assert!(payload.is_empty());
        assert_eq!(payload.u8(0), 0);
    }

    #[test]
    fn test_payload_time_scaling() {
        let mut buf = vec![0, 0];
        buf.extend_from_slice(&12_345u32.to_le_bytes());
        let payload = Payload::new(&buf, 0, Endian::Little, 8);
        assert!((payload.time(2) - 1.2345).abs() < 1e-12);
    }

    #[test]
    fn test_payload_string_clipped_to_payload() {
        let buf = b"\0\0\0\0\0\0thr\0\0\0\0\0\0\0";
        let payload = Payload::new(buf, 0, Endian::Little, 18);
        assert_eq!(payload.string(6, 10), "thr");
    }

    #[test]
    fn test_entry_builder() {
        let entry = Entry::new("SystemState").with("Time", 1.0).with("Mode", 3.0);
        assert_eq!(entry.dataset, "SystemState");
        assert_eq!(entry.get("Mode"), Some(3.0));
        assert_eq!(entry.get("Nope"), None);
    }
}
