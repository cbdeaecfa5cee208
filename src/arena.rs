//! Many records in one reusable buffer.
//!
//! Records are encoded back to back into a single `Vec<u8>`; a side index
//! remembers where each one starts and ends. `reset` drops the records but
//! keeps the allocation, so a batch loop settles into zero allocations.
//! An [`ArenaPool`] hands the same arenas out again across batches.

use std::ops::Range;

use crate::config::BuildOptions;
use crate::error::{Result, ZeroError};
use crate::prefetch::{PrefetchHint, prefetch};
use crate::record::Record;

// ─── RecordArena ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct RecordArena {
    buf: Vec<u8>,
    ranges: Vec<Range<usize>>,
    options: BuildOptions,
}

impl RecordArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        RecordArena {
            buf: Vec::with_capacity(bytes),
            ..Self::default()
        }
    }

    /// Pre-size for `count` records of roughly `record_size` bytes each.
    pub fn for_records(record_size: usize, count: usize) -> Self {
        RecordArena {
            buf: Vec::with_capacity(record_size.saturating_mul(count)),
            ranges: Vec::with_capacity(count),
            options: BuildOptions::default(),
        }
    }

    /// Options applied to every subsequent `push`.
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Encode `record` at the end of the arena and return its index. On
    /// error the arena is left as it was.
    pub fn push<R: Record>(&mut self, record: &R) -> Result<usize> {
        let start = self.buf.len();
        self.buf.resize(start + record.encoded_len(), 0);
        match record.encode_with(&mut self.buf[start..], self.options) {
            Ok(len) => {
                self.buf.truncate(start + len);
                self.ranges.push(start..start + len);
                log::trace!(
                    "arena push {} #{}: {} bytes at {}",
                    R::NAME,
                    self.ranges.len() - 1,
                    len,
                    start
                );
                Ok(self.ranges.len() - 1)
            }
            Err(e) => {
                self.buf.truncate(start);
                Err(e)
            }
        }
    }

    /// Encoded bytes of record `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.ranges.get(index).map(|r| &self.buf[r.clone()])
    }

    /// Open record `index` as `R`. The arena does not remember which schema
    /// each record was pushed with; a mismatch shows up as a view error or
    /// as wrong field values.
    pub fn view<R: Record>(&self, index: usize) -> Result<R::View<'_>> {
        let bytes = self.get(index).ok_or(ZeroError::FieldNotFound)?;
        R::view(bytes)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.ranges.iter().map(|r| &self.buf[r.clone()])
    }

    /// Hint that record `index` will be read soon. Out of range is a no-op.
    #[inline]
    pub fn prefetch(&self, index: usize) {
        if let Some(bytes) = self.get(index) {
            prefetch(bytes, PrefetchHint::Temporal);
        }
    }

    /// Like [`iter`](Self::iter), but each step prefetches the record
    /// `ahead` positions further on.
    pub fn iter_prefetch(&self, ahead: usize) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        (0..self.ranges.len()).map(move |i| {
            if ahead > 0 {
                self.prefetch(i + ahead);
            }
            &self.buf[self.ranges[i].clone()]
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total encoded bytes across all records.
    #[inline]
    pub fn bytes_used(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Bytes that can still be pushed without reallocating.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.capacity() - self.buf.len()
    }

    /// Drop all records, keeping both allocations.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.ranges.clear();
    }
}

// ─── ArenaPool ──────────────────────────────────────────────────────────────

/// Idle arenas kept for reuse. `acquire` hands one out empty, `release`
/// takes it back; buffers are allocated once and then recycled.
#[derive(Debug, Default)]
pub struct ArenaPool {
    arenas: Vec<RecordArena>,
    arena_capacity: usize,
    options: BuildOptions,
}

impl ArenaPool {
    /// Arenas created by this pool start with `arena_capacity` bytes.
    pub fn new(arena_capacity: usize) -> Self {
        ArenaPool {
            arena_capacity,
            ..Self::default()
        }
    }

    /// A pool with `count` arenas allocated up front.
    pub fn with_count(arena_capacity: usize, count: usize) -> Self {
        let arenas = (0..count)
            .map(|_| RecordArena::with_capacity(arena_capacity))
            .collect();
        ArenaPool {
            arenas,
            arena_capacity,
            options: BuildOptions::default(),
        }
    }

    /// Options given to every arena this pool hands out.
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// An empty arena, reused when one is idle.
    pub fn acquire(&mut self) -> RecordArena {
        let mut arena = match self.arenas.pop() {
            Some(mut arena) => {
                arena.reset();
                arena
            }
            None => {
                log::trace!("arena pool empty, allocating {} bytes", self.arena_capacity);
                RecordArena::with_capacity(self.arena_capacity)
            }
        };
        arena.options = self.options;
        arena
    }

    pub fn release(&mut self, mut arena: RecordArena) {
        arena.reset();
        self.arenas.push(arena);
    }

    /// Idle arenas.
    #[inline]
    pub fn len(&self) -> usize {
        self.arenas.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arenas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Text;
    use crate::layout::Schema;
    use crate::test_util::init_test_logger;

    crate::zero_record! {
        struct Event => EventView {
            fixed {
                seq: u32,
                level: u8,
            }
            variable {
                message: Text,
            }
        }
    }

    fn event(seq: u32, message: &str) -> Event {
        Event {
            seq,
            level: (seq % 4) as u8,
            message: message.to_owned(),
        }
    }

    #[test]
    fn test_push_and_view() {
        init_test_logger();
        let mut arena = RecordArena::new();
        assert!(arena.is_empty());
        for i in 0..10 {
            let msg = if i % 2 == 0 { "ok" } else { "a message long enough for the heap" };
            assert_eq!(arena.push(&event(i, msg)).unwrap(), i as usize);
        }
        assert_eq!(arena.len(), 10);

        let view = arena.view::<Event>(3).unwrap();
        assert_eq!(view.seq(), 3);
        assert_eq!(view.level(), 3);
        assert_eq!(view.message().unwrap(), "a message long enough for the heap");
        assert_eq!(arena.view::<Event>(4).unwrap().message().unwrap(), "ok");
        assert!(arena.view::<Event>(10).is_err());
        assert!(arena.get(10).is_none());
    }

    #[test]
    fn test_ranges_are_contiguous() {
        let mut arena = RecordArena::new();
        arena.push(&event(1, "short")).unwrap();
        arena.push(&event(2, "something that spills to the heap")).unwrap();
        let total: usize = arena.iter().map(<[u8]>::len).sum();
        assert_eq!(total, arena.bytes_used());
        assert_eq!(arena.get(0).unwrap().len(), Event::MIN_SIZE);
        assert_eq!(arena.get(1).unwrap().len(), Event::MIN_SIZE + 33);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut arena = RecordArena::for_records(Event::MIN_SIZE, 100);
        for i in 0..100 {
            arena.push(&event(i, "x")).unwrap();
        }
        let used = arena.bytes_used();
        arena.reset();
        assert!(arena.is_empty());
        assert_eq!(arena.bytes_used(), 0);
        assert!(arena.buf.capacity() >= used);
        arena.push(&event(7, "again")).unwrap();
        assert_eq!(arena.view::<Event>(0).unwrap().seq(), 7);
    }

    #[test]
    fn test_dedup_option_applies() {
        crate::zero_record! {
            struct Twin => TwinView {
                fixed {}
                variable {
                    a: Text,
                    b: Text,
                }
            }
        }
        let long = "the same payload in both slots".to_owned();
        let twin = Twin {
            a: long.clone(),
            b: long,
        };
        let mut plain = RecordArena::new();
        let mut dedup =
            RecordArena::new().with_options(BuildOptions::default().with_dedup_heap(true));
        plain.push(&twin).unwrap();
        dedup.push(&twin).unwrap();
        assert_eq!(plain.bytes_used() - dedup.bytes_used(), 30);
        let view = dedup.view::<Twin>(0).unwrap();
        assert_eq!(view.a().unwrap(), view.b().unwrap());
    }

    #[test]
    fn test_concurrent_readers() {
        let mut arena = RecordArena::with_capacity(4096);
        for i in 0..64 {
            arena.push(&event(i, &format!("event number {i} with padding"))).unwrap();
        }
        let arena = &arena;
        std::thread::scope(|s| {
            for t in 0..4 {
                s.spawn(move || {
                    for i in (t..64).step_by(4) {
                        let view = arena.view::<Event>(i).unwrap();
                        assert_eq!(view.seq() as usize, i);
                        assert_eq!(
                            view.message().unwrap(),
                            format!("event number {i} with padding")
                        );
                    }
                });
            }
        });
    }

    #[test]
    fn test_iter_prefetch_matches_iter() {
        let mut arena = RecordArena::new();
        for i in 0..20 {
            arena.push(&event(i, &"x".repeat(i as usize))).unwrap();
        }
        for ahead in [0, 1, 8, 50] {
            let plain: Vec<&[u8]> = arena.iter().collect();
            let hinted: Vec<&[u8]> = arena.iter_prefetch(ahead).collect();
            assert_eq!(plain, hinted);
            assert_eq!(arena.iter_prefetch(ahead).len(), 20);
        }
        arena.prefetch(0);
        arena.prefetch(1000);
    }

    #[test]
    fn test_capacity_and_remaining() {
        let mut arena = RecordArena::with_capacity(1024);
        assert!(arena.capacity() >= 1024);
        assert_eq!(arena.remaining(), arena.capacity());
        arena.push(&event(1, "hi")).unwrap();
        assert_eq!(arena.remaining(), arena.capacity() - Event::MIN_SIZE);
        arena.reset();
        assert_eq!(arena.remaining(), arena.capacity());
    }

    #[test]
    fn test_pool_recycles_arenas() {
        init_test_logger();
        let mut pool = ArenaPool::with_count(512, 2);
        assert_eq!(pool.len(), 2);

        let mut arena = pool.acquire();
        assert_eq!(pool.len(), 1);
        assert!(arena.is_empty());
        assert!(arena.capacity() >= 512);
        arena.push(&event(3, "reused")).unwrap();
        let buf_ptr = arena.buf.as_ptr();
        pool.release(arena);
        assert_eq!(pool.len(), 2);

        // last released comes back first, emptied, same allocation
        let arena = pool.acquire();
        assert!(arena.is_empty());
        assert_eq!(arena.buf.as_ptr(), buf_ptr);
    }

    #[test]
    fn test_pool_allocates_when_drained() {
        let mut pool = ArenaPool::new(256);
        assert!(pool.is_empty());
        let a = pool.acquire();
        let b = pool.acquire();
        assert!(a.capacity() >= 256 && b.capacity() >= 256);
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_pool_applies_options() {
        let mut pool =
            ArenaPool::new(256).with_options(BuildOptions::default().with_dedup_heap(true));
        let arena = pool.acquire();
        assert!(arena.options.dedup_heap);
        pool.release(arena);
        let mut plain = ArenaPool::new(256);
        plain.release(pool.acquire());
        assert!(!plain.acquire().options.dedup_heap);
    }
}
