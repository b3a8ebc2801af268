//! Primitive field reads over a byte buffer.
//!
//! A [`Cursor`] is a borrowed view of the log with a fixed byte order. Every
//! read takes an absolute offset and is side-effect free; reading past the end
//! of the buffer yields [`Error::OutOfRange`].

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Byte order of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endian {
    /// Least significant byte first. All `.aclog` files use this.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// Read-only view of a byte buffer with a selected byte order.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    endian: Endian,
}

macro_rules! read_multi {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $width:expr, $read:ident) => {
        $(#[$doc])*
        ///
        /// # Errors
        ///
        /// Returns [`Error::OutOfRange`] if the field extends past the buffer end.
        pub fn $name(&self, offset: usize) -> Result<$ty> {
            let bytes = self.bytes(offset, $width)?;
            Ok(match self.endian {
                Endian::Little => LittleEndian::$read(bytes),
                Endian::Big => BigEndian::$read(bytes),
            })
        }
    };
}

impl<'a> Cursor<'a> {
    /// Create a cursor over `buf`.
    #[must_use]
    pub fn new(buf: &'a [u8], endian: Endian) -> Self {
        Self { buf, endian }
    }

    /// The underlying buffer.
    #[must_use]
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// The byte order used for multi-byte reads.
    #[must_use]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Total length of the underlying buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the underlying buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn bytes(&self, offset: usize, width: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(width)
            .and_then(|end| self.buf.get(offset..end))
            .ok_or(Error::OutOfRange {
                offset,
                width,
                len: self.buf.len(),
            })
    }

    /// Read an unsigned byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `offset` is past the buffer end.
    pub fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.bytes(offset, 1)?[0])
    }

    /// Read a signed byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `offset` is past the buffer end.
    pub fn i8(&self, offset: usize) -> Result<i8> {
        Ok(i8::from_ne_bytes([self.u8(offset)?]))
    }

    read_multi!(
        /// Read an unsigned 16-bit integer.
        u16, u16, 2, read_u16
    );
    read_multi!(
        /// Read a signed 16-bit integer.
        i16, i16, 2, read_i16
    );
    read_multi!(
        /// Read an unsigned 32-bit integer.
        u32, u32, 4, read_u32
    );
    read_multi!(
        /// Read a signed 32-bit integer.
        i32, i32, 4, read_i32
    );
    read_multi!(
        /// Read a 32-bit IEEE float.
        f32, f32, 4, read_f32
    );
    read_multi!(
        /// Read a 64-bit IEEE float.
        f64, f64, 8, read_f64
    );

    /// Read a fixed-width, null-terminated string.
    ///
    /// Consumes at most `max_len` bytes, stopping at the first zero byte. Each
    /// byte maps to the character with the same code point (Latin-1); no
    /// multi-byte decoding is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the buffer ends before a terminator or
    /// `max_len` bytes have been read.
    pub fn fixed_str(&self, offset: usize, max_len: usize) -> Result<String> {
        let mut out = String::with_capacity(max_len);
        for i in 0..max_len {
            let code = self.u8(offset + i)?;
            if code == 0 {
                break;
            }
            out.push(char::from(code));
        }
        Ok(out)
    }
}
