use crate::error::{Result, ZeroError};
use crate::types::*;

/// The 4-byte record header, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub flags: u8,
}

impl Header {
    /// Header the builder starts every record with.
    #[inline]
    pub const fn new() -> Self {
        Header {
            version: VERSION,
            flags: FLAG_LITTLE_ENDIAN,
        }
    }

    /// Check magic and version. Length against the schema is the caller's
    /// concern; this only needs the first four bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(ZeroError::BufferTooSmall {
                needed: HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        let magic = [bytes[0], bytes[1]];
        if magic != MAGIC {
            return Err(ZeroError::InvalidMagic(magic));
        }
        if bytes[2] != VERSION {
            return Err(ZeroError::UnsupportedVersion(bytes[2]));
        }
        Ok(Header {
            version: bytes[2],
            flags: bytes[3],
        })
    }

    #[inline]
    pub fn write(&self, out: &mut [u8]) {
        out[0..2].copy_from_slice(&MAGIC);
        out[2] = self.version;
        out[3] = self.flags & !FLAG_RESERVED_MASK;
    }

    #[inline]
    pub fn has_heap(&self) -> bool {
        self.flags & FLAG_HAS_HEAP != 0
    }

    #[inline]
    pub fn has_intern(&self) -> bool {
        self.flags & FLAG_HAS_INTERN != 0
    }

    #[inline]
    pub fn is_little_endian(&self) -> bool {
        self.flags & FLAG_LITTLE_ENDIAN != 0
    }

    #[inline]
    pub fn has_length_table(&self) -> bool {
        self.flags & FLAG_HAS_LENGTH_TABLE != 0
    }

    /// Reserved bits exactly as they were read.
    #[inline]
    pub fn reserved_bits(&self) -> u8 {
        self.flags & FLAG_RESERVED_MASK
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}
