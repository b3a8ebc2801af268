//! Byte-level builders for test logs.

use crate::parser::LogHeader;

/// Length byte for a payload of this size.
pub(crate) fn length_byte(payload: &[u8]) -> u8 {
    u8::try_from(payload.len() + 2).expect("payload too long for a record")
}

/// A 28-byte header with version 1.2.
pub(crate) fn header(description: &str) -> Vec<u8> {
    LogHeader::new(1, 2, description).encode().to_vec()
}

/// A complete frame: magic, tag, length, payload.
pub(crate) fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![b'A', b'C', tag, length_byte(payload)];
    out.extend_from_slice(payload);
    out
}

/// Fixed-size little-endian payload writer.
pub(crate) struct Bytes(Vec<u8>);

impl Bytes {
    pub(crate) fn new(len: usize) -> Self {
        Self(vec![0; len])
    }

    fn put(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.0[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub(crate) fn u8(self, offset: usize, v: u8) -> Self {
        self.put(offset, &[v])
    }

    pub(crate) fn i8(self, offset: usize, v: i8) -> Self {
        self.put(offset, &v.to_le_bytes())
    }

    pub(crate) fn u16(self, offset: usize, v: u16) -> Self {
        self.put(offset, &v.to_le_bytes())
    }

    pub(crate) fn u32(self, offset: usize, v: u32) -> Self {
        self.put(offset, &v.to_le_bytes())
    }

    pub(crate) fn f32(self, offset: usize, v: f32) -> Self {
        self.put(offset, &v.to_le_bytes())
    }

    pub(crate) fn f64(self, offset: usize, v: f64) -> Self {
        self.put(offset, &v.to_le_bytes())
    }

    pub(crate) fn f64s(mut self, offset: usize, values: &[f64]) -> Self {
        for (i, v) in values.iter().enumerate() {
            self = self.f64(offset + i * 8, *v);
        }
        self
    }

    pub(crate) fn str(self, offset: usize, s: &str) -> Self {
        self.put(offset, s.as_bytes())
    }

    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

/// Field values of a `SystemState` record.
#[derive(Debug, Clone, Default)]
pub(crate) struct SystemState {
    pub ticks: u32,
    pub flags: u16,
    pub cpu_load: u8,
    pub battery_pct: u8,
    pub voltage: f32,
    pub current: f32,
    pub rc: [f32; 4],
    pub temp: i8,
    pub mode: u8,
}

impl SystemState {
    pub(crate) fn encode(&self) -> Vec<u8> {
        Bytes::new(58)
            .u16(0, self.flags)
            .u32(2, self.ticks)
            .u8(6, self.cpu_load)
            .u8(8, self.battery_pct)
            .f32(10, self.voltage)
            .f32(14, self.current)
            .f32(18, self.rc[0])
            .f32(22, self.rc[1])
            .f32(26, self.rc[2])
            .f32(30, self.rc[3])
            .i8(50, self.temp)
            .u8(51, self.mode)
            .into_vec()
    }
}

/// Field values of a `LocalPositionNED` record.
#[derive(Debug, Clone, Default)]
pub(crate) struct LocalPosition {
    pub ticks: u32,
    pub xy_sensor: i8,
    pub z_sensor: i8,
    pub pos: [f64; 3],
    pub vel: [f64; 3],
    pub acc: [f64; 3],
}

impl LocalPosition {
    pub(crate) fn encode(&self) -> Vec<u8> {
        Bytes::new(78)
            .i8(0, self.xy_sensor)
            .i8(1, self.z_sensor)
            .u32(2, self.ticks)
            .f64s(6, &self.pos)
            .f64s(30, &self.vel)
            .f64s(54, &self.acc)
            .into_vec()
    }
}

/// A `PosSensor` payload of `len` bytes with `values` at the offset that
/// length implies.
pub(crate) fn pos_sensor(len: usize, data_type: u8, ticks: u32, sensor_byte: u8, values: &[f64]) -> Vec<u8> {
    let values_at = if len >= 70 { 46 } else { 14 };
    Bytes::new(len)
        .u8(0, 3)
        .u8(1, data_type)
        .u32(2, ticks)
        .u8(6, sensor_byte)
        .f64s(values_at, values)
        .into_vec()
}

/// An `IMU` payload.
pub(crate) fn imu(kind: u8, index: u8, ticks: u32, xyz: [f32; 3], rate: f32, temp: f32) -> Vec<u8> {
    Bytes::new(38)
        .u8(0, kind)
        .u8(1, index)
        .u32(2, ticks)
        .f32(18, xyz[0])
        .f32(22, xyz[1])
        .f32(26, xyz[2])
        .f32(30, rate)
        .f32(34, temp)
        .into_vec()
}

/// An `Attitude` payload: angles then rates, in radians.
pub(crate) fn attitude(ticks: u32, values: [f64; 6]) -> Vec<u8> {
    Bytes::new(54).u32(2, ticks).f64s(6, &values).into_vec()
}

/// An `AttitudeQuaternion` payload.
pub(crate) fn quaternion(ticks: u32, q: [f64; 4], rates: [f64; 3]) -> Vec<u8> {
    Bytes::new(62)
        .u32(2, ticks)
        .f64s(6, &q)
        .f64s(38, &rates)
        .into_vec()
}

/// A `DebugVect` payload carrying `values` under `name`.
pub(crate) fn debug_vect(ticks: u32, name: &str, values: &[f64]) -> Vec<u8> {
    Bytes::new(16 + values.len() * 8)
        .u32(2, ticks)
        .str(6, name)
        .f64s(16, values)
        .into_vec()
}
