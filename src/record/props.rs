use proptest::prelude::*;

use crate::error::ZeroError;
use crate::field::{Bytes, Text};
use crate::layout::Schema;
use crate::record::Record;
use crate::types::*;

crate::zero_record! {
    struct Sample => SampleView {
        fixed {
            a: u64,
            b: i32,
            c: f64,
            d: bool,
            e: i16,
        }
        variable {
            label: Text,
            blob: Bytes,
            note: Text,
        }
    }
}

fn sample() -> impl Strategy<Value = Sample> {
    (
        any::<u64>(),
        any::<i32>(),
        any::<f64>().prop_filter("NaN never equals itself", |v| !v.is_nan()),
        any::<bool>(),
        any::<i16>(),
        ".{0,40}",
        proptest::collection::vec(any::<u8>(), 0..64),
        "[a-z]{0,20}",
    )
        .prop_map(|(a, b, c, d, e, label, blob, note)| Sample {
            a,
            b,
            c,
            d,
            e,
            label,
            blob,
            note,
        })
}

proptest! {
    #[test]
    fn prop_round_trip(record in sample()) {
        let bytes = record.to_bytes().unwrap();
        prop_assert_eq!(bytes.len(), record.encoded_len());
        prop_assert_eq!(Sample::decode(&bytes).unwrap(), record.clone());

        let view = SampleView::from_bytes(&bytes).unwrap();
        prop_assert_eq!(view.a(), record.a);
        prop_assert_eq!(view.label().unwrap(), record.label.as_str());
        prop_assert!(
            view.raw().variable_eq(2, record.note.as_bytes()),
            "note {:?} did not compare equal",
            record.note
        );
    }

    #[test]
    fn prop_marker_follows_length(len in 0usize..64) {
        let record = Sample { blob: vec![0xAB; len], ..Sample::default() };
        let bytes = record.to_bytes().unwrap();
        let marker = bytes[Sample::slot_offset(1) + MARKER_POS];
        if len <= MAX_INLINE_SIZE {
            prop_assert_eq!(marker, INLINE_MARKER);
        } else {
            prop_assert_eq!(marker, HEAP_MARKER);
        }
    }

    #[test]
    fn prop_truncation_never_panics(record in sample(), cut in any::<prop::sample::Index>()) {
        let bytes = record.to_bytes().unwrap();
        let cut = cut.index(bytes.len());
        match SampleView::from_bytes(&bytes[..cut]) {
            Ok(view) => {
                // fixed fields survive any heap truncation
                prop_assert_eq!(view.a(), record.a);
                prop_assert_eq!(view.e(), record.e);
                let _ = view.label();
                let _ = view.blob();
                let _ = view.note();
            }
            Err(e) => prop_assert!(
                matches!(e, ZeroError::BufferTooSmall { .. }),
                "truncated to {} bytes: {}",
                cut,
                e
            ),
        }
    }

    #[test]
    fn prop_garbage_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        if let Ok(view) = SampleView::from_bytes(&bytes) {
            let _ = view.a();
            let _ = view.c();
            let _ = view.label();
            let _ = view.blob();
            let _ = view.note();
            for i in 0..Sample::SLOT_COUNT {
                let _ = view.raw().variable_eq(i, b"needle");
            }
        }
    }
}
