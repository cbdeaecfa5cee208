//! Inline-slot equality without materializing a string.
//!
//! An inline slot is `[len, data.., 0.., marker]`. Comparing it against a
//! needle means checking the first `len + 1` bytes against
//! `[needle.len(), needle..]`. On x86_64 that is one 128-bit compare and a
//! movemask; everywhere else a byte loop. Both must agree on every input.
//!
//! [`detect_simd_level`] reads the CPU features once per process and
//! [`comparator`] picks its strategy from the result.

use std::sync::OnceLock;

use crate::slot::{Slot, slot_kind};
use crate::types::*;

// ─── Detection ──────────────────────────────────────────────────────────────

/// Widest vector extension available at runtime, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SimdLevel {
    Scalar,
    Sse2,
    Avx2,
    Avx512,
}

#[cfg(target_arch = "x86_64")]
fn read_cpu_level() -> SimdLevel {
    if std::is_x86_feature_detected!("avx512bw") {
        SimdLevel::Avx512
    } else if std::is_x86_feature_detected!("avx2") {
        SimdLevel::Avx2
    } else if std::is_x86_feature_detected!("sse2") {
        SimdLevel::Sse2
    } else {
        SimdLevel::Scalar
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn read_cpu_level() -> SimdLevel {
    SimdLevel::Scalar
}

/// Cached after the first call.
pub fn detect_simd_level() -> SimdLevel {
    static LEVEL: OnceLock<SimdLevel> = OnceLock::new();
    *LEVEL.get_or_init(|| {
        let level = read_cpu_level();
        log::debug!("simd level: {:?}", level);
        level
    })
}

pub trait InlineComparator: Sync {
    fn name(&self) -> &'static str;

    /// `false` if the slot is not inline or the lengths differ.
    fn eq_inline(&self, slot: &Slot, needle: &[u8]) -> bool;
}

// ─── Scalar ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarComparator;

impl InlineComparator for ScalarComparator {
    fn name(&self) -> &'static str {
        "scalar"
    }

    #[inline]
    fn eq_inline(&self, slot: &Slot, needle: &[u8]) -> bool {
        if slot_kind(slot) != SlotKind::Inline || needle.len() != slot[0] as usize {
            return false;
        }
        // needle.len() == slot[0] <= 255, so bound it by the inline capacity
        needle.len() <= MAX_INLINE_SIZE && slot[1..1 + needle.len()] == *needle
    }
}

// ─── SSE2 ───────────────────────────────────────────────────────────────────

/// SSE2 is part of the x86_64 baseline, so this is always usable there.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Default, Clone, Copy)]
pub struct Sse2Comparator;

#[cfg(target_arch = "x86_64")]
impl InlineComparator for Sse2Comparator {
    fn name(&self) -> &'static str {
        "sse2"
    }

    #[inline]
    fn eq_inline(&self, slot: &Slot, needle: &[u8]) -> bool {
        use std::arch::x86_64::{_mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8};

        if slot_kind(slot) != SlotKind::Inline || needle.len() != slot[0] as usize {
            return false;
        }
        if needle.len() > MAX_INLINE_SIZE {
            return false;
        }
        // Lay the needle out like a slot: length byte first, data after.
        let mut pattern = [0u8; SLOT_SIZE];
        pattern[0] = needle.len() as u8;
        pattern[1..1 + needle.len()].copy_from_slice(needle);

        // SAFETY: both pointers cover 16 readable bytes; loadu has no
        // alignment requirement and SSE2 is always present on x86_64.
        let mask = unsafe {
            let a = _mm_loadu_si128(slot.as_ptr().cast());
            let b = _mm_loadu_si128(pattern.as_ptr().cast());
            _mm_movemask_epi8(_mm_cmpeq_epi8(a, b)) as u32
        };
        let want = (1u32 << (needle.len() + 1)) - 1;
        mask & want == want
    }
}

// ─── Dispatch ───────────────────────────────────────────────────────────────

/// The comparator for a given level. A slot is 16 bytes, so anything from
/// SSE2 up uses the same 128-bit compare.
pub fn comparator_for(level: SimdLevel) -> &'static dyn InlineComparator {
    match level {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Sse2 | SimdLevel::Avx2 | SimdLevel::Avx512 => &Sse2Comparator,
        _ => &ScalarComparator,
    }
}

/// The fastest comparator on this CPU.
#[inline]
pub fn comparator() -> &'static dyn InlineComparator {
    comparator_for(detect_simd_level())
}

#[inline]
pub fn eq_inline(slot: &Slot, needle: &[u8]) -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        Sse2Comparator.eq_inline(slot, needle)
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        ScalarComparator.eq_inline(slot, needle)
    }
}
