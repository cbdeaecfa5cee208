use serde::{Deserialize, Serialize};

// ─── Format Identity ────────────────────────────────────────────────────────

/// "ZD", the first two bytes of every record.
pub const MAGIC: [u8; 2] = [0x5A, 0x44];
/// The only version this crate reads or writes.
pub const VERSION: u8 = 0x01;

// ─── Header Flags ───────────────────────────────────────────────────────────

pub const FLAG_HAS_HEAP: u8 = 1 << 0;
pub const FLAG_HAS_INTERN: u8 = 1 << 1;
pub const FLAG_LITTLE_ENDIAN: u8 = 1 << 2;
pub const FLAG_HAS_LENGTH_TABLE: u8 = 1 << 3;
/// Bits 4..8 are reserved: written as zero, preserved on read.
pub const FLAG_RESERVED_MASK: u8 = 0xF0;

// ─── Binary Layout ──────────────────────────────────────────────────────────
//
//  ┌──────────────────────────────────────────────┐
//  │ Header (4 bytes)                             │
//  │   magic:   [u8; 2]  = 5A 44                  │
//  │   version: u8       = 01                     │
//  │   flags:   u8                                │
//  ├──────────────────────────────────────────────┤
//  │ Fixed section (FIXED_SIZE bytes)             │
//  │   primitives, declaration order, no padding  │
//  ├──────────────────────────────────────────────┤
//  │ Slots (16 bytes × SLOT_COUNT)                │
//  │   inline: len | data[..14] | 0x00            │
//  │   heap:   off u32 | len u32 | 0.. | 0xFF     │
//  ├──────────────────────────────────────────────┤
//  │ Heap (variable, iff FLAG_HAS_HEAP)           │
//  │   overflow payloads packed sequentially      │
//  └──────────────────────────────────────────────┘

pub const HEADER_SIZE: usize = 4; // 2 + 1 + 1
pub const SLOT_SIZE: usize = 16;
/// Longest value that stays inside its slot.
pub const MAX_INLINE_SIZE: usize = 14;
pub const MARKER_POS: usize = SLOT_SIZE - 1;
pub const INLINE_MARKER: u8 = 0x00;
pub const HEAP_MARKER: u8 = 0xFF;

/// Upper bound on fixed fields (and, separately, on slots) per schema.
pub const MAX_FIELDS: usize = 64;

// ─── Field Kinds ────────────────────────────────────────────────────────────

/// Type tag of a field, as recorded in a schema's layout tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    /// A user type (usually an enum discriminant) with its own encoding.
    Opaque,
    Text,
    Bytes,
}

impl FieldKind {
    #[inline]
    pub const fn is_variable(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Bytes)
    }

    /// Encoded width for primitive kinds. `None` for opaque and variable.
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            FieldKind::U8 | FieldKind::I8 | FieldKind::Bool => Some(1),
            FieldKind::U16 | FieldKind::I16 => Some(2),
            FieldKind::U32 | FieldKind::I32 | FieldKind::F32 => Some(4),
            FieldKind::U64 | FieldKind::I64 | FieldKind::F64 => Some(8),
            FieldKind::Opaque | FieldKind::Text | FieldKind::Bytes => None,
        }
    }
}

/// Which representation a slot currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Inline,
    Heap,
    /// The marker byte is neither `0x00` nor `0xFF`.
    Invalid(u8),
}
