//! Byte cursor over an in-memory replay buffer
//!
//! All multi-byte integers are little-endian. A read either consumes
//! exactly its width or fails without moving the cursor.

use bytes::{Buf, Bytes};

use super::error::{DecodeError, DecodeResult};

/// Longest encoding of a packed 32-bit integer
const MAX_PACKED_U32_LEN: usize = 5;

/// Read-only cursor over a shared byte buffer
///
/// Cloning a cursor is cheap: the underlying bytes are reference counted
/// and never copied.
#[derive(Debug, Clone)]
pub struct ByteCursor {
    /// Unread bytes
    data: Bytes,
    /// Absolute offset of the first byte this cursor was created over
    start: usize,
    /// Number of bytes this cursor was created over
    len: usize,
}

impl ByteCursor {
    /// Create a cursor positioned at the start of `buffer`
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self::with_offset(buffer.into(), 0)
    }

    /// Create a cursor over a slice that begins at `start` in the original buffer
    pub(crate) fn with_offset(data: Bytes, start: usize) -> Self {
        let len = data.len();
        Self { data, start, len }
    }

    /// Absolute offset of the next unread byte
    pub fn offset(&self) -> usize {
        self.start + self.position()
    }

    /// Number of bytes consumed by this cursor
    pub fn position(&self) -> usize {
        self.len - self.data.remaining()
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn ensure(&self, requested: usize) -> DecodeResult<()> {
        if self.data.remaining() < requested {
            return Err(DecodeError::UnexpectedEndOfData {
                offset: self.offset(),
                requested,
                remaining: self.data.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        self.ensure(1)?;
        Ok(self.data.get_u8())
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        self.ensure(2)?;
        Ok(self.data.get_u16_le())
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        self.ensure(4)?;
        Ok(self.data.get_u32_le())
    }

    pub fn read_i32(&mut self) -> DecodeResult<i32> {
        self.ensure(4)?;
        Ok(self.data.get_i32_le())
    }

    pub fn read_f32(&mut self) -> DecodeResult<f32> {
        self.ensure(4)?;
        Ok(self.data.get_f32_le())
    }

    /// Read a single byte as a boolean (nonzero is true)
    pub fn read_bool(&mut self) -> DecodeResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a packed unsigned integer (7 bits per byte, high bit continues)
    ///
    /// On failure the cursor is left where it was.
    pub fn read_packed_u32(&mut self) -> DecodeResult<u32> {
        let offset = self.offset();
        let mut value: u32 = 0;
        let mut width = None;

        for (i, &byte) in self.data.iter().take(MAX_PACKED_U32_LEN).enumerate() {
            value |= u32::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                // Only four bits of the fifth byte fit in a u32
                if i == MAX_PACKED_U32_LEN - 1 && byte > 0x0F {
                    return Err(DecodeError::MalformedVarint { offset });
                }
                width = Some(i + 1);
                break;
            }
        }

        if let Some(width) = width {
            self.data.advance(width);
            return Ok(value);
        }

        if self.data.remaining() < MAX_PACKED_U32_LEN {
            return Err(DecodeError::UnexpectedEndOfData {
                offset: self.offset() + self.data.remaining(),
                requested: 1,
                remaining: 0,
            });
        }
        Err(DecodeError::MalformedVarint { offset })
    }

    /// Read `len` bytes without copying them
    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<Bytes> {
        self.ensure(len)?;
        Ok(self.data.split_to(len))
    }

    /// Read a string prefixed by its packed byte length
    pub fn read_string(&mut self) -> DecodeResult<String> {
        let before = self.clone();
        let len = self.read_packed_u32()? as usize;
        let offset = self.offset();
        let bytes = match self.read_bytes(len) {
            Ok(bytes) => bytes,
            Err(e) => {
                *self = before;
                return Err(e);
            }
        };

        String::from_utf8(bytes.to_vec()).map_err(|_| {
            *self = before;
            DecodeError::InvalidString { offset }
        })
    }

    /// Take every remaining byte, leaving the cursor empty
    pub fn read_to_end(&mut self) -> Bytes {
        let len = self.data.remaining();
        self.data.split_to(len)
    }
}
