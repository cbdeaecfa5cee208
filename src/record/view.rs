use std::fmt;
use std::marker::PhantomData;

use crate::error::{Result, ZeroError};
use crate::field::{FixedField, Text, VarField};
use crate::header::Header;
use crate::layout::Schema;
use crate::simd;
use crate::slot::{Slot, decode_slot, slot_kind};
use crate::types::*;

/// Structural checks shared by typed and dynamic views: length first, then
/// magic, then version.
pub(crate) fn validate(bytes: &[u8], min_size: usize, schema: &str) -> Result<Header> {
    if bytes.len() < min_size {
        log::debug!(
            "rejecting {} record: {} bytes, need {}",
            schema,
            bytes.len(),
            min_size
        );
        return Err(ZeroError::BufferTooSmall {
            needed: min_size,
            actual: bytes.len(),
        });
    }
    Header::parse(bytes).inspect_err(|e| log::debug!("rejecting {} record: {}", schema, e))
}

// ─── View (zero-copy) ───────────────────────────────────────────────────────

/// Validated, read-only view over one record of schema `S`.
///
/// Construction checks the structure once; afterwards fixed fields are
/// plain offset reads that cannot fail, and variable fields are resolved
/// (and bounds-checked) only when asked for.
pub struct View<'a, S> {
    bytes: &'a [u8],
    header: Header,
    _schema: PhantomData<fn() -> S>,
}

impl<'a, S> Clone for View<'a, S> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S> Copy for View<'a, S> {}

impl<'a, S: Schema> fmt::Debug for View<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("schema", &S::NAME)
            .field("len", &self.bytes.len())
            .field("header", &self.header)
            .finish()
    }
}

impl<'a, S: Schema> View<'a, S> {
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let header = validate(bytes, S::MIN_SIZE, S::NAME)?;
        Ok(View {
            bytes,
            header,
            _schema: PhantomData,
        })
    }

    #[inline]
    pub fn header(&self) -> Header {
        self.header
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Read the fixed field at `offset` (relative to the fixed section).
    #[inline]
    pub fn fixed<T: FixedField>(&self, offset: usize) -> T {
        debug_assert!(offset + T::SIZE <= S::FIXED_SIZE);
        let start = HEADER_SIZE + offset;
        T::read_le(&self.bytes[start..start + T::SIZE])
    }

    /// The raw 16 bytes of slot `index`, or `None` past the last slot.
    #[inline]
    pub fn slot(&self, index: usize) -> Option<&'a Slot> {
        if index >= S::SLOT_COUNT {
            return None;
        }
        self.bytes[S::slot_offset(index)..].first_chunk::<SLOT_SIZE>()
    }

    #[inline]
    pub fn slot_kind(&self, index: usize) -> Option<SlotKind> {
        self.slot(index).map(slot_kind)
    }

    /// Everything after the slots, or nothing when the heap flag is clear.
    #[inline]
    pub fn heap(&self) -> &'a [u8] {
        if self.header.has_heap() {
            &self.bytes[S::MIN_SIZE..]
        } else {
            &[]
        }
    }

    /// Bytes of variable field `index`, inline or from the heap.
    #[inline]
    pub fn variable(&self, index: usize) -> Result<&'a [u8]> {
        let slot = self
            .slot(index)
            .ok_or(ZeroError::corrupted(index, "slot index out of range"))?;
        decode_slot(index, slot, self.heap())
    }

    #[inline]
    pub fn text(&self, index: usize) -> Result<&'a str> {
        Text::decode(index, self.variable(index)?)
    }

    /// Compare slot `index` with `needle` without building a string. Inline
    /// slots take the vector path; heap slots fall back to a slice compare.
    /// Corrupted slots compare unequal.
    pub fn variable_eq(&self, index: usize, needle: &[u8]) -> bool {
        match self.slot(index) {
            Some(slot) if slot_kind(slot) == SlotKind::Inline => simd::eq_inline(slot, needle),
            Some(_) => self.variable(index).is_ok_and(|v| v == needle),
            None => false,
        }
    }
}
