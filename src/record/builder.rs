use std::marker::PhantomData;

use rustc_hash::FxHashMap;
use xxhash_rust::xxh64::xxh64;

use crate::config::BuildOptions;
use crate::error::{Result, ZeroError};
use crate::field::FixedField;
use crate::header::Header;
use crate::layout::Schema;
use crate::slot::{encode_heap, encode_inline};
use crate::types::*;

// ─── Builder ────────────────────────────────────────────────────────────────

/// Single-pass writer for one record of schema `S`.
///
/// Fixed fields and slots are written in place; values that do not fit a
/// slot are appended at the heap cursor in the order they arrive. The
/// buffer must be large enough for the heap data up front (see
/// [`Record::encoded_len`](crate::Record::encoded_len)).
pub struct Builder<'a, S: Schema> {
    buf: &'a mut [u8],
    header: Header,
    /// Absolute position of the next heap byte.
    heap_cursor: usize,
    /// payload hash → (heap offset, len); only with `dedup_heap`.
    dedup: Option<FxHashMap<u64, (usize, usize)>>,
    _schema: PhantomData<fn() -> S>,
}

impl<'a, S: Schema> Builder<'a, S> {
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Result<Self> {
        Self::with_options(buf, BuildOptions::default())
    }

    pub fn with_options(buf: &'a mut [u8], options: BuildOptions) -> Result<Self> {
        if buf.len() < S::MIN_SIZE {
            log::debug!(
                "builder for {}: buffer of {} bytes, need {}",
                S::NAME,
                buf.len(),
                S::MIN_SIZE
            );
            return Err(ZeroError::BufferTooSmall {
                needed: S::MIN_SIZE,
                actual: buf.len(),
            });
        }
        // Unwritten fields read as zero, unwritten slots as empty inline.
        buf[..S::MIN_SIZE].fill(0);
        let header = Header::new();
        header.write(buf);

        Ok(Builder {
            buf,
            header,
            heap_cursor: S::MIN_SIZE,
            dedup: options.dedup_heap.then(FxHashMap::default),
            _schema: PhantomData,
        })
    }

    /// Write `value` at `offset` within the fixed section. Offsets come
    /// from the schema, so they are trusted.
    #[inline]
    pub fn write_fixed<T: FixedField>(&mut self, offset: usize, value: T) {
        debug_assert!(
            offset + T::SIZE <= S::FIXED_SIZE,
            "fixed write past the fixed section"
        );
        let start = HEADER_SIZE + offset;
        value.write_le(&mut self.buf[start..start + T::SIZE]);
    }

    /// Store a variable-length value in slot `index`: inline when it fits,
    /// otherwise appended to the heap.
    pub fn write_variable(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
        if index >= S::SLOT_COUNT {
            return Err(ZeroError::FieldNotFound);
        }
        let slot = if bytes.len() <= MAX_INLINE_SIZE {
            encode_inline(bytes)?
        } else {
            let offset = self.append_heap(bytes)?;
            encode_heap(offset, bytes.len())?
        };
        let at = S::slot_offset(index);
        self.buf[at..at + SLOT_SIZE].copy_from_slice(&slot);
        Ok(())
    }

    #[inline]
    pub fn write_text(&mut self, index: usize, text: &str) -> Result<()> {
        self.write_variable(index, text.as_bytes())
    }

    /// Copy `bytes` to the heap and return its offset relative to the heap
    /// start. Reuses an earlier identical payload when dedup is on.
    fn append_heap(&mut self, bytes: &[u8]) -> Result<usize> {
        let hash = self.dedup.as_ref().map(|_| xxh64(bytes, 0));
        if let (Some(map), Some(hash)) = (self.dedup.as_ref(), hash) {
            if let Some(&(offset, len)) = map.get(&hash) {
                let start = S::MIN_SIZE + offset;
                if self.buf[start..start + len] == *bytes {
                    return Ok(offset);
                }
            }
        }

        let len = bytes.len();
        let offset = self.heap_cursor - S::MIN_SIZE;
        if u32::try_from(len).is_err() {
            return Err(ZeroError::LengthOverflow(len));
        }
        if u32::try_from(offset).is_err() {
            return Err(ZeroError::LengthOverflow(offset));
        }
        let end = self
            .heap_cursor
            .checked_add(len)
            .ok_or(ZeroError::LengthOverflow(len))?;
        if end > self.buf.len() {
            log::debug!(
                "builder for {}: heap needs {} bytes, buffer has {}",
                S::NAME,
                end,
                self.buf.len()
            );
            return Err(ZeroError::BufferTooSmall {
                needed: end,
                actual: self.buf.len(),
            });
        }

        self.buf[self.heap_cursor..end].copy_from_slice(bytes);
        self.heap_cursor = end;
        if !self.header.has_heap() {
            self.header.flags |= FLAG_HAS_HEAP;
            self.header.write(self.buf);
        }
        if let (Some(map), Some(hash)) = (self.dedup.as_mut(), hash) {
            map.entry(hash).or_insert((offset, len));
        }
        Ok(offset)
    }

    /// Bytes appended to the heap so far.
    #[inline]
    pub fn heap_len(&self) -> usize {
        self.heap_cursor - S::MIN_SIZE
    }

    /// Total record length. Truncate the buffer to this before persisting.
    pub fn finish(self) -> usize {
        log::trace!(
            "built {} record: {} bytes ({} heap)",
            S::NAME,
            self.heap_cursor,
            self.heap_len()
        );
        self.heap_cursor
    }
}
