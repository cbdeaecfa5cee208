//! Cache prefetch hints for scans over many records.
//!
//! A prefetch is only a hint: it never faults and never changes what a
//! later read returns. On targets without a prefetch instruction every
//! function here is a no-op.

/// Cache line size assumed when walking a range.
pub const CACHE_LINE_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefetchHint {
    /// Keep the line in every cache level. For data read more than once.
    #[default]
    Temporal,
    /// Stream through the cache. For data read once.
    NonTemporal,
}

#[inline(always)]
fn prefetch_ptr(ptr: *const u8, hint: PrefetchHint) {
    #[cfg(target_arch = "x86_64")]
    // SAFETY: prefetch instructions never fault, whatever the address.
    unsafe {
        use std::arch::x86_64::{_MM_HINT_NTA, _MM_HINT_T0, _mm_prefetch};
        match hint {
            PrefetchHint::Temporal => _mm_prefetch::<_MM_HINT_T0>(ptr.cast()),
            PrefetchHint::NonTemporal => _mm_prefetch::<_MM_HINT_NTA>(ptr.cast()),
        }
    }
    #[cfg(target_arch = "aarch64")]
    // SAFETY: as above; prfm touches no registers other than its operand.
    unsafe {
        match hint {
            PrefetchHint::Temporal => core::arch::asm!(
                "prfm pldl1keep, [{0}]",
                in(reg) ptr,
                options(nostack, preserves_flags, readonly)
            ),
            PrefetchHint::NonTemporal => core::arch::asm!(
                "prfm pldl1strm, [{0}]",
                in(reg) ptr,
                options(nostack, preserves_flags, readonly)
            ),
        }
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    let _ = (ptr, hint);
}

/// Hint that the first cache line of `bytes` will be read soon.
#[inline]
pub fn prefetch(bytes: &[u8], hint: PrefetchHint) {
    if let Some(first) = bytes.first() {
        prefetch_ptr(first, hint);
    }
}

/// Hint every cache line `bytes` touches.
#[inline]
pub fn prefetch_range(bytes: &[u8], hint: PrefetchHint) {
    for line in bytes.chunks(CACHE_LINE_SIZE) {
        prefetch_ptr(line.as_ptr(), hint);
    }
}

// ─── PrefetchProcessor ──────────────────────────────────────────────────────

/// Walks a slice of encoded records, prefetching the one `distance`
/// positions ahead of the one it hands out.
#[derive(Debug, Clone)]
pub struct PrefetchProcessor<'a, T> {
    data: &'a [T],
    position: usize,
    distance: usize,
}

impl<'a, T: AsRef<[u8]>> PrefetchProcessor<'a, T> {
    pub fn new(data: &'a [T], distance: usize) -> Self {
        PrefetchProcessor {
            data,
            position: 0,
            distance,
        }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl<'a, T: AsRef<[u8]>> Iterator for PrefetchProcessor<'a, T> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.data.get(self.position)?;
        if self.distance > 0 {
            if let Some(ahead) = self.data.get(self.position + self.distance) {
                prefetch(ahead.as_ref(), PrefetchHint::Temporal);
            }
        }
        self.position += 1;
        Some(current.as_ref())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl<T: AsRef<[u8]>> ExactSizeIterator for PrefetchProcessor<'_, T> {}
