//! # Bounded little endian buffer writer
//!
//! Positional payload encoding for cluster library frames. The writer keeps
//! accepting values after an overflow but remembers that it happened, check
//! with `fit` or consume the writer with `finalize`.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::Error;
use crate::pack::Pack;

/// Writer with a fixed upper bound on the number of bytes
#[derive(Clone, Debug)]
pub struct BufferWriter {
    data: Vec<u8>,
    offset: usize,
    overflow: bool,
}

impl BufferWriter {
    /// Create a writer that accepts at most `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            offset: 0,
            overflow: false,
        }
    }

    fn reserve(&mut self, length: usize) -> Option<&mut [u8]> {
        if self.overflow || self.data.len() - self.offset < length {
            self.overflow = true;
            return None;
        }
        let start = self.offset;
        self.offset += length;
        Some(&mut self.data[start..start + length])
    }

    pub fn put8(&mut self, value: u8) -> &mut Self {
        if let Some(slot) = self.reserve(1) {
            slot[0] = value;
        }
        self
    }

    pub fn put16(&mut self, value: u16) -> &mut Self {
        if let Some(slot) = self.reserve(2) {
            LittleEndian::write_u16(slot, value);
        }
        self
    }

    pub fn put32(&mut self, value: u32) -> &mut Self {
        if let Some(slot) = self.reserve(4) {
            LittleEndian::write_u32(slot, value);
        }
        self
    }

    pub fn put64(&mut self, value: u64) -> &mut Self {
        if let Some(slot) = self.reserve(8) {
            LittleEndian::write_u64(slot, value);
        }
        self
    }

    pub fn put_bytes(&mut self, value: &[u8]) -> &mut Self {
        if let Some(slot) = self.reserve(value.len()) {
            slot.copy_from_slice(value);
        }
        self
    }

    /// Pack a structure at the current position
    pub fn put_pack<T, P: Pack<T, Error>>(&mut self, item: &P) -> Result<&mut Self, Error> {
        if self.overflow {
            return Err(Error::BufferTooSmall);
        }
        match item.pack(&mut self.data[self.offset..]) {
            Ok(used) => {
                self.offset += used;
                Ok(self)
            }
            Err(Error::WrongNumberOfBytes) | Err(Error::BufferTooSmall) => {
                self.overflow = true;
                Err(Error::BufferTooSmall)
            }
            Err(error) => Err(error),
        }
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }

    /// Everything written so far fitted in the buffer
    pub fn fit(&self) -> bool {
        !self.overflow
    }

    /// Written bytes, or `BufferTooSmall` if anything was dropped
    pub fn finalize(mut self) -> Result<Vec<u8>, Error> {
        if self.overflow {
            return Err(Error::BufferTooSmall);
        }
        self.data.truncate(self.offset);
        Ok(self.data)
    }
}
