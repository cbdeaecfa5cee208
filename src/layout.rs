//! Per-schema layout: the offset tables a `Builder` and a `View` share.
//!
//! Schemas are normally declared with [`zero_record!`](crate::zero_record),
//! which fills in the name/size/kind tables. Everything else, including
//! each field's offset, is derived from those tables by `const fn`s so a
//! reference to a field that does not exist fails to compile.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use xxhash_rust::const_xxh64::xxh64;

use crate::error::{Result, ZeroError};
use crate::types::*;

// ─── Schema Trait ───────────────────────────────────────────────────────────

pub trait Schema {
    const NAME: &'static str;
    /// Fixed fields in declaration order.
    const FIXED_NAMES: &'static [&'static str];
    const FIXED_SIZES: &'static [usize];
    const FIXED_KINDS: &'static [FieldKind];
    /// Variable fields in slot order.
    const SLOT_NAMES: &'static [&'static str];
    const SLOT_KINDS: &'static [FieldKind];

    const FIXED_SIZE: usize = total_size(Self::FIXED_SIZES);
    const SLOT_COUNT: usize = Self::SLOT_NAMES.len();
    const SLOTS_START: usize = HEADER_SIZE + Self::FIXED_SIZE;
    /// Header + fixed section + slots; the heap starts here.
    const MIN_SIZE: usize = Self::SLOTS_START + Self::SLOT_COUNT * SLOT_SIZE;

    /// Absolute byte offset of slot `index` in the buffer.
    #[inline]
    fn slot_offset(index: usize) -> usize {
        Self::SLOTS_START + index * SLOT_SIZE
    }
}

// ─── Const Helpers ──────────────────────────────────────────────────────────

pub const fn total_size(sizes: &[usize]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < sizes.len() {
        total += sizes[i];
        i += 1;
    }
    total
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn position(names: &[&str], name: &str) -> usize {
    let mut i = 0;
    while i < names.len() {
        if str_eq(names[i], name) {
            return i;
        }
        i += 1;
    }
    panic!("field is not part of the schema")
}

/// Offset of `name` relative to the start of the fixed section.
pub const fn field_offset(names: &[&str], sizes: &[usize], name: &str) -> usize {
    let idx = position(names, name);
    let mut offset = 0;
    let mut i = 0;
    while i < idx {
        offset += sizes[i];
        i += 1;
    }
    offset
}

/// Slot index of the variable field `name`.
pub const fn slot_index(names: &[&str], name: &str) -> usize {
    position(names, name)
}

#[inline]
pub const fn name_hash(name: &str) -> u64 {
    xxh64(name.as_bytes(), 0)
}

// ─── Layout Descriptor ──────────────────────────────────────────────────────

/// Which part of the record a field lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Fixed,
    Slot,
}

/// One field of a schema. For fixed fields `offset` is relative to the
/// fixed section; for slots it is the absolute offset of the slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldLayout {
    pub name: SmolStr,
    pub name_hash: u64,
    pub offset: usize,
    pub size: usize,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    name_hash: u64,
    section: Section,
    pos: u16,
}

const MAX_ENTRIES: usize = 2 * MAX_FIELDS;

/// Runtime description of a schema, for tooling and by-name access.
///
/// Built either from a compiled [`Schema`] with [`of`](Self::of) or from
/// the JSON that [`to_json`](Self::to_json) produces. Both paths recompute
/// every offset from the field sizes, so a descriptor is always internally
/// consistent. Offsets and hashes present in the JSON are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "DescriptorRepr")]
pub struct LayoutDescriptor {
    schema: SmolStr,
    fixed_size: usize,
    slot_count: usize,
    min_size: usize,
    fields: ArrayVec<FieldLayout, MAX_FIELDS>,
    slots: ArrayVec<FieldLayout, MAX_FIELDS>,
    /// Sorted by name hash.
    #[serde(skip)]
    index: ArrayVec<IndexEntry, MAX_ENTRIES>,
}

/// The parts of a descriptor that are read back from JSON.
#[derive(Deserialize)]
struct DescriptorRepr {
    schema: SmolStr,
    #[serde(default)]
    fields: Vec<FieldRepr>,
    #[serde(default)]
    slots: Vec<FieldRepr>,
}

#[derive(Deserialize)]
struct FieldRepr {
    name: SmolStr,
    #[serde(default)]
    size: usize,
    kind: FieldKind,
}

impl TryFrom<DescriptorRepr> for LayoutDescriptor {
    type Error = ZeroError;

    fn try_from(repr: DescriptorRepr) -> Result<Self> {
        LayoutDescriptor::build(
            repr.schema,
            repr.fields.into_iter().map(|f| (f.name, f.size, f.kind)),
            repr.slots.into_iter().map(|f| (f.name, f.kind)),
        )
    }
}

impl LayoutDescriptor {
    pub fn of<S: Schema>() -> Result<Self> {
        let fixed = S::FIXED_NAMES
            .iter()
            .zip(S::FIXED_SIZES)
            .zip(S::FIXED_KINDS)
            .map(|((name, size), kind)| (SmolStr::new(name), *size, *kind));
        let slots = S::SLOT_NAMES
            .iter()
            .zip(S::SLOT_KINDS)
            .map(|(name, kind)| (SmolStr::new(name), *kind));
        Self::build(SmolStr::new(S::NAME), fixed, slots)
    }

    /// Parse a descriptor produced by [`to_json`](Self::to_json), or
    /// written by hand. Field order is layout order.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn build(
        schema: SmolStr,
        fixed: impl IntoIterator<Item = (SmolStr, usize, FieldKind)>,
        slots_in: impl IntoIterator<Item = (SmolStr, FieldKind)>,
    ) -> Result<Self> {
        let mut fields: ArrayVec<FieldLayout, MAX_FIELDS> = ArrayVec::new();
        let mut offset = 0usize;
        for (name, size, kind) in fixed {
            let size = match (kind.fixed_size(), kind.is_variable()) {
                (_, true) => return Err(invalid(&name, "variable kind in the fixed section")),
                (Some(width), _) if size == 0 || size == width => width,
                (Some(_), _) => return Err(invalid(&name, "size does not match kind")),
                (None, _) if size == 0 => return Err(invalid(&name, "opaque field without a size")),
                (None, _) => size,
            };
            fields
                .try_push(FieldLayout {
                    name_hash: name_hash(&name),
                    name,
                    offset,
                    size,
                    kind,
                })
                .map_err(|_| ZeroError::TooManyFields)?;
            offset = offset
                .checked_add(size)
                .ok_or(ZeroError::LengthOverflow(size))?;
        }
        let fixed_size = offset;
        let slots_start = HEADER_SIZE + fixed_size;

        let mut slots: ArrayVec<FieldLayout, MAX_FIELDS> = ArrayVec::new();
        for (name, kind) in slots_in {
            if !kind.is_variable() {
                return Err(invalid(&name, "fixed kind in the slot section"));
            }
            let offset = slots_start + slots.len() * SLOT_SIZE;
            slots
                .try_push(FieldLayout {
                    name_hash: name_hash(&name),
                    name,
                    offset,
                    size: SLOT_SIZE,
                    kind,
                })
                .map_err(|_| ZeroError::TooManyFields)?;
        }

        let mut index: ArrayVec<IndexEntry, MAX_ENTRIES> = ArrayVec::new();
        for (pos, f) in fields.iter().enumerate() {
            index.push(IndexEntry {
                name_hash: f.name_hash,
                section: Section::Fixed,
                pos: pos as u16,
            });
        }
        for (pos, f) in slots.iter().enumerate() {
            index.push(IndexEntry {
                name_hash: f.name_hash,
                section: Section::Slot,
                pos: pos as u16,
            });
        }
        // Sort for O(log n) lookup
        index.sort_unstable_by_key(|e| e.name_hash);

        let slot_count = slots.len();
        let min_size = slots_start + slot_count * SLOT_SIZE;
        let descriptor = LayoutDescriptor {
            schema,
            fixed_size,
            slot_count,
            min_size,
            fields,
            slots,
            index,
        };
        if let Some(dup) = descriptor.duplicate_name() {
            return Err(invalid(dup, "duplicate field name"));
        }

        log::trace!(
            "layout {}: {} fixed bytes, {} slots",
            descriptor.schema,
            fixed_size,
            slot_count
        );
        Ok(descriptor)
    }

    fn duplicate_name(&self) -> Option<&str> {
        self.index.windows(2).find_map(|pair| {
            let (_, _, a) = self.entry(pair[0]);
            let (_, _, b) = self.entry(pair[1]);
            (a.name_hash == b.name_hash && a.name == b.name).then_some(a.name.as_str())
        })
    }

    #[inline]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    #[inline]
    pub fn fixed_size(&self) -> usize {
        self.fixed_size
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Header + fixed section + slots.
    #[inline]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Fixed fields in layout order.
    #[inline]
    pub fn fields(&self) -> &[FieldLayout] {
        &self.fields
    }

    /// Variable fields in slot order.
    #[inline]
    pub fn slots(&self) -> &[FieldLayout] {
        &self.slots
    }

    #[inline]
    fn entry(&self, entry: IndexEntry) -> (Section, usize, &FieldLayout) {
        let pos = entry.pos as usize;
        let layout = match entry.section {
            Section::Fixed => &self.fields[pos],
            Section::Slot => &self.slots[pos],
        };
        (entry.section, pos, layout)
    }

    fn linear_hash_search(&self, hash: u64, name: &str) -> Option<(Section, usize, &FieldLayout)> {
        self.index
            .iter()
            .map(|e| self.entry(*e))
            .find(|(_, _, f)| f.name_hash == hash && f.name.as_str() == name)
    }

    fn binary_hash_search(&self, hash: u64, name: &str) -> Option<(Section, usize, &FieldLayout)> {
        let start = self.index.partition_point(|e| e.name_hash < hash);
        self.index[start..]
            .iter()
            .take_while(|e| e.name_hash == hash)
            .map(|e| self.entry(*e))
            .find(|(_, _, f)| f.name.as_str() == name)
    }

    /// Find a field by name. Returns (section, position within section, layout).
    pub fn find(&self, name: &str) -> Result<(Section, usize, &FieldLayout)> {
        let hash = name_hash(name);
        let found = if self.index.len() <= 4 {
            self.linear_hash_search(hash, name)
        } else {
            self.binary_hash_search(hash, name)
        };
        found.ok_or(ZeroError::FieldNotFound)
    }

    /// JSON rendering for external tooling.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn invalid(field: &str, reason: &'static str) -> ZeroError {
    ZeroError::InvalidLayout {
        field: SmolStr::new(field),
        reason,
    }
}
