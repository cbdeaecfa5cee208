use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use zero_record::simd::{InlineComparator, ScalarComparator, comparator};
use zero_record::slot::encode_inline;
use zero_record::{
    ArenaPool, BuildOptions, Bytes, DynamicView, LayoutDescriptor, Record, RecordArena, Text,
    zero_record,
};

// ─── Test Data ──────────────────────────────────────────────────────────────

zero_record! {
    pub struct Profile => ProfileView {
        fixed {
            id: u64,
            age: u8,
            score: f64,
            active: bool,
            logins: u32,
        }
        variable {
            handle: Text,
            bio: Text,
            avatar: Bytes,
        }
    }
}

/// Short handle stays inline; bio and avatar spill to the heap.
fn make_profile() -> Profile {
    Profile {
        id: 12345,
        age: 28,
        score: 99.5,
        active: true,
        logins: 1000,
        handle: "alice".into(),
        bio: "Software engineer working on storage engines".into(),
        avatar: vec![0x42; 96],
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 1: Building
// ═══════════════════════════════════════════════════════════════════════════

fn bench_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("building");
    let profile = make_profile();

    group.bench_function("to_bytes", |b| b.iter(|| black_box(&profile).to_bytes().unwrap()));

    let mut buf = Vec::with_capacity(512);
    group.bench_function("encode_into_vec (reused)", |b| {
        b.iter(|| black_box(&profile).encode_into_vec(&mut buf).unwrap())
    });

    let mut buf = vec![0u8; profile.encoded_len()];
    let dedup = BuildOptions::default().with_dedup_heap(true);
    group.bench_function("encode_with dedup", |b| {
        b.iter(|| black_box(&profile).encode_with(&mut buf, dedup).unwrap())
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 2: Reading
// ═══════════════════════════════════════════════════════════════════════════

fn bench_reading(c: &mut Criterion) {
    let mut group = c.benchmark_group("reading");
    group.sample_size(500);

    let bytes = make_profile().to_bytes().unwrap();
    let view = ProfileView::from_bytes(&bytes).unwrap();

    group.bench_function("from_bytes", |b| {
        b.iter(|| ProfileView::from_bytes(black_box(&bytes)).unwrap())
    });

    group.bench_function("fixed u64", |b| b.iter(|| black_box(view).id()));
    group.bench_function("fixed f64", |b| b.iter(|| black_box(view).score()));
    group.bench_function("inline text", |b| b.iter(|| black_box(view).handle().unwrap()));
    group.bench_function("heap text", |b| b.iter(|| black_box(view).bio().unwrap()));
    group.bench_function("decode owned", |b| {
        b.iter(|| Profile::decode(black_box(&bytes)).unwrap())
    });

    let layout = LayoutDescriptor::of::<Profile>().unwrap();
    let dynamic = DynamicView::new(&layout, &bytes).unwrap();
    group.bench_function("dynamic get_u64", |b| {
        b.iter(|| black_box(dynamic.get_u64(black_box("id"))))
    });
    group.bench_function("dynamic get_str", |b| {
        b.iter(|| black_box(dynamic.get_str(black_box("handle"))))
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 3: Comparing
// ═══════════════════════════════════════════════════════════════════════════

fn bench_comparing(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparing");
    group.sample_size(500);

    let slot = encode_inline(b"fourteen bytes").unwrap();
    let best = comparator();

    group.bench_function("scalar", |b| {
        b.iter(|| ScalarComparator.eq_inline(black_box(&slot), black_box(b"fourteen bytes")))
    });
    group.bench_function(best.name(), |b| {
        b.iter(|| best.eq_inline(black_box(&slot), black_box(b"fourteen bytes")))
    });

    let bytes = make_profile().to_bytes().unwrap();
    let view = ProfileView::from_bytes(&bytes).unwrap().raw();
    group.bench_function("variable_eq inline", |b| {
        b.iter(|| view.variable_eq(0, black_box(b"alice")))
    });
    group.bench_function("variable_eq heap", |b| {
        b.iter(|| view.variable_eq(1, black_box(b"Software engineer working on storage engines")))
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 4: Arena
// ═══════════════════════════════════════════════════════════════════════════

fn bench_arena(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena");
    let profile = make_profile();
    let mut arena = RecordArena::for_records(profile.encoded_len(), 1000);

    group.bench_function("push 1000", |b| {
        b.iter(|| {
            arena.reset();
            for _ in 0..1000 {
                arena.push(black_box(&profile)).unwrap();
            }
            arena.bytes_used()
        })
    });

    arena.reset();
    for i in 0..1000u64 {
        arena.push(&Profile { id: i, ..make_profile() }).unwrap();
    }
    group.bench_function("scan ids", |b| {
        b.iter(|| {
            arena
                .iter()
                .map(|bytes| ProfileView::from_bytes(bytes).unwrap().id())
                .sum::<u64>()
        })
    });
    group.bench_function("scan ids prefetched", |b| {
        b.iter(|| {
            arena
                .iter_prefetch(black_box(4))
                .map(|bytes| ProfileView::from_bytes(bytes).unwrap().id())
                .sum::<u64>()
        })
    });

    let mut pool = ArenaPool::with_count(profile.encoded_len() * 100, 1);
    group.bench_function("pool acquire/release", |b| {
        b.iter(|| {
            let mut arena = pool.acquire();
            for _ in 0..100 {
                arena.push(black_box(&profile)).unwrap();
            }
            pool.release(arena);
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_building,
    bench_reading,
    bench_comparing,
    bench_arena
);
criterion_main!(benches);
