//! The 16-byte variable slot: inline for short values, a heap reference
//! for everything else.

use crate::error::{Result, ZeroError};
use crate::types::*;

pub type Slot = [u8; SLOT_SIZE];

/// Classify a slot by its marker byte.
#[inline]
pub fn slot_kind(slot: &Slot) -> SlotKind {
    match slot[MARKER_POS] {
        INLINE_MARKER => SlotKind::Inline,
        HEAP_MARKER => SlotKind::Heap,
        other => SlotKind::Invalid(other),
    }
}

/// Bytes `value` will take in the heap region (zero when it fits inline).
#[inline]
pub fn heap_len(value: &[u8]) -> usize {
    if value.len() <= MAX_INLINE_SIZE {
        0
    } else {
        value.len()
    }
}

/// Inline representation. `value` must be at most [`MAX_INLINE_SIZE`] bytes.
#[inline]
pub fn encode_inline(value: &[u8]) -> Result<Slot> {
    if value.len() > MAX_INLINE_SIZE {
        return Err(ZeroError::LengthOverflow(value.len()));
    }
    let mut slot = [0u8; SLOT_SIZE];
    slot[0] = value.len() as u8;
    slot[1..1 + value.len()].copy_from_slice(value);
    slot[MARKER_POS] = INLINE_MARKER;
    Ok(slot)
}

/// Heap representation: offset is relative to the heap region start.
#[inline]
pub fn encode_heap(offset: usize, len: usize) -> Result<Slot> {
    let offset = u32::try_from(offset).map_err(|_| ZeroError::LengthOverflow(offset))?;
    let len = u32::try_from(len).map_err(|_| ZeroError::LengthOverflow(len))?;
    let mut slot = [0u8; SLOT_SIZE];
    slot[0..4].copy_from_slice(&offset.to_le_bytes());
    slot[4..8].copy_from_slice(&len.to_le_bytes());
    slot[MARKER_POS] = HEAP_MARKER;
    Ok(slot)
}

/// Pick the representation by length. For values longer than
/// [`MAX_INLINE_SIZE`] the caller has already appended `value` to the heap
/// at `heap_offset`; the offset is ignored for inline values.
#[inline]
pub fn encode_slot(value: &[u8], heap_offset: usize) -> Result<Slot> {
    if value.len() <= MAX_INLINE_SIZE {
        encode_inline(value)
    } else {
        encode_heap(heap_offset, value.len())
    }
}

/// Heap `(offset, len)` of a heap slot, unchecked against any heap.
#[inline]
pub fn heap_ref(slot: &Slot) -> (usize, usize) {
    let offset = u32::from_le_bytes([slot[0], slot[1], slot[2], slot[3]]) as usize;
    let len = u32::from_le_bytes([slot[4], slot[5], slot[6], slot[7]]) as usize;
    (offset, len)
}

/// Resolve a slot to its bytes. Inline values borrow from the slot itself,
/// heap values from `heap`. `index` is only used to label errors.
#[inline]
pub fn decode_slot<'a>(index: usize, slot: &'a Slot, heap: &'a [u8]) -> Result<&'a [u8]> {
    match slot_kind(slot) {
        SlotKind::Inline => {
            let len = slot[0] as usize;
            if len > MAX_INLINE_SIZE {
                return Err(ZeroError::corrupted(index, "inline length exceeds 14"));
            }
            Ok(&slot[1..1 + len])
        }
        SlotKind::Heap => {
            let (offset, len) = heap_ref(slot);
            let end = offset
                .checked_add(len)
                .ok_or(ZeroError::corrupted(index, "heap range overflows"))?;
            heap.get(offset..end)
                .ok_or(ZeroError::corrupted(index, "heap range out of bounds"))
        }
        SlotKind::Invalid(_) => Err(ZeroError::corrupted(index, "unknown slot marker")),
    }
}
