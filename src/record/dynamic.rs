use crate::error::{Result, ZeroError};
use crate::field::{FixedField, Text, VarField};
use crate::header::Header;
use crate::layout::{FieldLayout, LayoutDescriptor, Section};
use crate::slot::{Slot, decode_slot};
use crate::types::*;

use super::view::validate;

// ─── DynamicView ────────────────────────────────────────────────────────────

/// By-name access to a record through its [`LayoutDescriptor`]. The
/// descriptor can come from a compiled schema or be loaded from JSON when
/// the schema is only known at runtime. Each lookup hashes the name; code
/// that knows the schema at compile time should use the generated view.
#[derive(Debug, Clone, Copy)]
pub struct DynamicView<'a> {
    bytes: &'a [u8],
    header: Header,
    layout: &'a LayoutDescriptor,
}

impl<'a> DynamicView<'a> {
    pub fn new(layout: &'a LayoutDescriptor, bytes: &'a [u8]) -> Result<Self> {
        let header = validate(bytes, layout.min_size(), layout.schema())?;
        Ok(DynamicView {
            bytes,
            header,
            layout,
        })
    }

    #[inline]
    pub fn layout(&self) -> &'a LayoutDescriptor {
        self.layout
    }

    #[inline]
    pub fn header(&self) -> Header {
        self.header
    }

    fn find_fixed(&self, name: &str) -> Result<&'a FieldLayout> {
        match self.layout.find(name)? {
            (Section::Fixed, _, field) => Ok(field),
            (Section::Slot, _, field) => Err(ZeroError::TypeMismatch {
                expected: FieldKind::Opaque,
                actual: field.kind,
            }),
        }
    }

    fn find_slot(&self, name: &str) -> Result<(usize, &'a FieldLayout)> {
        match self.layout.find(name)? {
            (Section::Slot, index, field) => Ok((index, field)),
            (Section::Fixed, _, field) => Err(ZeroError::TypeMismatch {
                expected: FieldKind::Bytes,
                actual: field.kind,
            }),
        }
    }

    #[inline]
    fn heap(&self) -> &'a [u8] {
        if self.header.has_heap() {
            &self.bytes[self.layout.min_size()..]
        } else {
            &[]
        }
    }

    fn fixed_bytes(&self, field: &FieldLayout) -> Result<&'a [u8]> {
        let start = HEADER_SIZE + field.offset;
        let end = start + field.size;
        self.bytes.get(start..end).ok_or(ZeroError::BufferTooSmall {
            needed: end,
            actual: self.bytes.len(),
        })
    }

    /// Read a fixed field whose recorded kind and width match `T`.
    pub fn get_fixed<T: FixedField>(&self, name: &str) -> Result<T> {
        let field = self.find_fixed(name)?;
        let matches = field.size == T::SIZE
            && if T::KIND == FieldKind::Opaque {
                field.kind == FieldKind::Opaque
            } else {
                field.kind == T::KIND
            };
        if !matches {
            return Err(ZeroError::TypeMismatch {
                expected: T::KIND,
                actual: field.kind,
            });
        }
        Ok(T::read_le(self.fixed_bytes(field)?))
    }

    #[inline]
    pub fn get_u8(&self, name: &str) -> Result<u8> {
        self.get_fixed(name)
    }

    #[inline]
    pub fn get_u16(&self, name: &str) -> Result<u16> {
        self.get_fixed(name)
    }

    #[inline]
    pub fn get_u32(&self, name: &str) -> Result<u32> {
        self.get_fixed(name)
    }

    #[inline]
    pub fn get_u64(&self, name: &str) -> Result<u64> {
        self.get_fixed(name)
    }

    #[inline]
    pub fn get_i8(&self, name: &str) -> Result<i8> {
        self.get_fixed(name)
    }

    #[inline]
    pub fn get_i16(&self, name: &str) -> Result<i16> {
        self.get_fixed(name)
    }

    #[inline]
    pub fn get_i32(&self, name: &str) -> Result<i32> {
        self.get_fixed(name)
    }

    #[inline]
    pub fn get_i64(&self, name: &str) -> Result<i64> {
        self.get_fixed(name)
    }

    #[inline]
    pub fn get_f32(&self, name: &str) -> Result<f32> {
        self.get_fixed(name)
    }

    #[inline]
    pub fn get_f64(&self, name: &str) -> Result<f64> {
        self.get_fixed(name)
    }

    #[inline]
    pub fn get_bool(&self, name: &str) -> Result<bool> {
        self.get_fixed(name)
    }

    /// Any numeric fixed field widened to f64.
    pub fn get_number_as_f64(&self, name: &str) -> Result<f64> {
        let field = self.find_fixed(name)?;
        let raw = self.fixed_bytes(field)?;
        Ok(match field.kind {
            FieldKind::U8 => u8::read_le(raw) as f64,
            FieldKind::U16 => u16::read_le(raw) as f64,
            FieldKind::U32 => u32::read_le(raw) as f64,
            FieldKind::U64 => u64::read_le(raw) as f64,
            FieldKind::I8 => i8::read_le(raw) as f64,
            FieldKind::I16 => i16::read_le(raw) as f64,
            FieldKind::I32 => i32::read_le(raw) as f64,
            FieldKind::I64 => i64::read_le(raw) as f64,
            FieldKind::F32 => f32::read_le(raw) as f64,
            FieldKind::F64 => f64::read_le(raw),
            other => {
                return Err(ZeroError::TypeMismatch {
                    expected: FieldKind::F64,
                    actual: other,
                });
            }
        })
    }

    fn raw_slot(&self, index: usize, field: &FieldLayout) -> Result<&'a [u8]> {
        let slot: &'a Slot = self
            .bytes
            .get(field.offset..)
            .and_then(|rest| rest.first_chunk::<SLOT_SIZE>())
            .ok_or(ZeroError::corrupted(index, "slot outside buffer"))?;
        decode_slot(index, slot, self.heap())
    }

    /// Raw bytes of any variable field, text or binary.
    pub fn get_bytes(&self, name: &str) -> Result<&'a [u8]> {
        let (index, field) = self.find_slot(name)?;
        self.raw_slot(index, field)
    }

    pub fn get_str(&self, name: &str) -> Result<&'a str> {
        let (index, field) = self.find_slot(name)?;
        if field.kind != FieldKind::Text {
            return Err(ZeroError::TypeMismatch {
                expected: FieldKind::Text,
                actual: field.kind,
            });
        }
        Text::decode(index, self.raw_slot(index, field)?)
    }

    #[inline]
    pub fn has_field(&self, name: &str) -> bool {
        self.layout.find(name).is_ok()
    }

    #[inline]
    pub fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.layout.find(name).ok().map(|(_, _, f)| f.kind)
    }

    /// Every variable field with its decoded bytes, in slot order. A
    /// corrupted slot yields an error for that entry only.
    pub fn iter_slots(&self) -> impl Iterator<Item = (&'a FieldLayout, Result<&'a [u8]>)> + use<'a> {
        let this = *self;
        this.layout
            .slots()
            .iter()
            .enumerate()
            .map(move |(index, field)| (field, this.raw_slot(index, field)))
    }
}
