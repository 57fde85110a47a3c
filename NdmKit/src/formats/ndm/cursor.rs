//! Bounds-checked big-endian reader over an in-memory buffer.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

/// Sequential big-endian reader.
///
/// Every read checks the remaining length first so that a short buffer
/// surfaces as [`Error::OutOfBounds`] with the failing offset, never as a panic.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    /// Create a cursor positioned at `offset`.
    #[must_use]
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        let mut cursor = Self::new(data);
        cursor.seek(offset);
        cursor
    }

    /// The underlying buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.inner.get_ref()
    }

    /// Current read position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    /// Move to an absolute offset. Seeking past the end is allowed; the next read fails.
    pub fn seek(&mut self, offset: usize) {
        self.inner.set_position(offset as u64);
    }

    /// Advance by `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.ensure(count)?;
        self.seek(self.position() + count);
        Ok(())
    }

    /// Total buffer length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// Bytes left after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let available = self.remaining();
        if available < needed {
            return Err(Error::OutOfBounds {
                offset: self.position(),
                needed,
                available,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.inner.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.inner.read_u16::<BigEndian>()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2)?;
        Ok(self.inner.read_i16::<BigEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.inner.read_u32::<BigEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.inner.read_f32::<BigEndian>()?)
    }

    /// Read three consecutive big-endian floats.
    pub fn read_vec3(&mut self) -> Result<[f32; 3]> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    /// Borrow the next `count` bytes and advance past them.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.ensure(count)?;
        let start = self.position();
        let bytes = &self.data()[start..start + count];
        self.seek(start + count);
        Ok(bytes)
    }

    /// Read a fixed-width, NUL-padded name field.
    pub fn read_fixed_name(&mut self, width: usize) -> Result<FixedName> {
        self.read_bytes(width).map(FixedName::from_field)
    }

    /// Peek at the byte at the current position without advancing.
    #[must_use]
    pub fn peek_u8(&self) -> Option<u8> {
        self.data().get(self.position()).copied()
    }
}

/// A name decoded from a fixed-width field.
///
/// `raw` holds the bytes up to the first NUL, or the whole field when no
/// terminator is present. Decoding never fails.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixedName {
    pub raw: Vec<u8>,
}

impl FixedName {
    #[must_use]
    pub fn from_field(field: &[u8]) -> Self {
        let len = field.iter().position(|&b| b == 0).unwrap_or(field.len());
        Self {
            raw: field[..len].to_vec(),
        }
    }

    /// Lossy text form of the name.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }

    /// Non-empty and printable ASCII only.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        !self.raw.is_empty() && self.raw.iter().all(|b| (0x20..0x7F).contains(b))
    }
}
