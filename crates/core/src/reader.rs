//! Bounds-checked little-endian reads at absolute offsets.
//!
//! Both formats address their structures by absolute offset rather than by
//! streaming through the file, so this is a random-access view instead of a
//! `Read` cursor. Every accessor fails with [`Error::UnexpectedEof`] instead
//! of panicking when the requested range is not fully inside the data.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Random-access view over a byte slice.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn bytes_at(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset.checked_add(len).ok_or(Error::UnexpectedEof {
            offset,
            needed: len,
            available: 0,
        })?;
        if end > self.data.len() {
            return Err(Error::UnexpectedEof {
                offset,
                needed: len,
                available: self.data.len().saturating_sub(offset),
            });
        }
        Ok(&self.data[offset..end])
    }

    /// Borrow everything from `offset` to the end of the data.
    pub fn tail(&self, offset: usize) -> Result<&'a [u8]> {
        if offset > self.data.len() {
            return Err(Error::UnexpectedEof { offset, needed: 0, available: 0 });
        }
        Ok(&self.data[offset..])
    }

    pub fn u8_at(&self, offset: usize) -> Result<u8> {
        Ok(self.bytes_at(offset, 1)?[0])
    }

    pub fn u16_at(&self, offset: usize) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.bytes_at(offset, 2)?))
    }

    pub fn u32_at(&self, offset: usize) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.bytes_at(offset, 4)?))
    }

    /// Read a `u32` and widen it for use as an offset or length.
    pub fn offset_at(&self, offset: usize) -> Result<usize> {
        Ok(self.u32_at(offset)? as usize)
    }

    /// True when the bytes at `offset` equal `pattern` (false if out of range).
    pub fn matches_at(&self, offset: usize, pattern: &[u8]) -> bool {
        self.bytes_at(offset, pattern.len()).map(|b| b == pattern).unwrap_or(false)
    }
}
