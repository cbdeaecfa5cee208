use crate::error::{Result, ZeroError};
use crate::types::FieldKind;

// ─── FixedField Trait ───────────────────────────────────────────────────────

/// A fixed-width value stored in the fixed section as little-endian bytes.
///
/// `read_le` must accept any bit pattern: once a view is open, reading a
/// fixed field cannot fail. Enums map unknown discriminants to a fallback;
/// [`zero_enum!`](crate::zero_enum) generates such an impl.
pub trait FixedField: Copy {
    /// Encoded width in bytes.
    const SIZE: usize;
    /// Tag used by layout descriptors and dynamic access.
    const KIND: FieldKind = FieldKind::Opaque;

    /// Write exactly `SIZE` bytes into `out[..SIZE]`.
    fn write_le(self, out: &mut [u8]);

    /// Read from exactly `SIZE` bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_fixed_int {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FixedField for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();
                const KIND: FieldKind = FieldKind::$kind;

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_fixed_int! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

impl FixedField for bool {
    const SIZE: usize = 1;
    const KIND: FieldKind = FieldKind::Bool;

    #[inline]
    fn write_le(self, out: &mut [u8]) {
        out[0] = self as u8;
    }

    /// Any non-zero byte reads as `true`.
    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// Bytes needed to store a discriminant for `variants` variants: the
/// smallest of 1, 2 or 4.
pub const fn enum_width(variants: usize) -> usize {
    if variants <= 1 << 8 {
        1
    } else if variants <= 1 << 16 {
        2
    } else {
        4
    }
}

// ─── VarField Trait ─────────────────────────────────────────────────────────

/// A variable-length field stored in a 16-byte slot.
pub trait VarField {
    /// Owned form used by generated record structs.
    type Owned: Clone + Default + PartialEq + std::fmt::Debug;
    /// Borrowed form handed out by views.
    type Ref<'a>;
    const KIND: FieldKind;

    fn as_bytes(owned: &Self::Owned) -> &[u8];

    /// Interpret raw slot bytes. `slot` is only used to label errors.
    fn decode(slot: usize, raw: &[u8]) -> Result<Self::Ref<'_>>;

    fn into_owned(value: Self::Ref<'_>) -> Self::Owned;
}

/// UTF-8 text. Decoding validates, so views return `&str` directly.
#[derive(Debug, Clone, Copy)]
pub struct Text;

/// Raw bytes, never validated.
#[derive(Debug, Clone, Copy)]
pub struct Bytes;

impl VarField for Text {
    type Owned = String;
    type Ref<'a> = &'a str;
    const KIND: FieldKind = FieldKind::Text;

    #[inline]
    fn as_bytes(owned: &String) -> &[u8] {
        owned.as_bytes()
    }

    #[inline]
    fn decode(slot: usize, raw: &[u8]) -> Result<Self::Ref<'_>> {
        std::str::from_utf8(raw).map_err(|source| ZeroError::InvalidUtf8 { slot, source })
    }

    #[inline]
    fn into_owned(value: Self::Ref<'_>) -> String {
        value.to_owned()
    }
}

impl VarField for Bytes {
    type Owned = Vec<u8>;
    type Ref<'a> = &'a [u8];
    const KIND: FieldKind = FieldKind::Bytes;

    #[inline]
    fn as_bytes(owned: &Vec<u8>) -> &[u8] {
        owned
    }

    #[inline]
    fn decode(_slot: usize, raw: &[u8]) -> Result<Self::Ref<'_>> {
        Ok(raw)
    }

    #[inline]
    fn into_owned(value: Self::Ref<'_>) -> Vec<u8> {
        value.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(<u8 as FixedField>::SIZE, 1);
        assert_eq!(<i16 as FixedField>::SIZE, 2);
        assert_eq!(<f32 as FixedField>::SIZE, 4);
        assert_eq!(<u64 as FixedField>::SIZE, 8);
        assert_eq!(<bool as FixedField>::SIZE, 1);
    }

    #[test]
    fn test_le_encoding() {
        let mut out = [0u8; 8];
        12345u64.write_le(&mut out);
        assert_eq!(out, [0x39, 0x30, 0, 0, 0, 0, 0, 0]);
        assert_eq!(u64::read_le(&out), 12345);

        let mut out = [0u8; 4];
        (-2i32).write_le(&mut out);
        assert_eq!(out, [0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(i32::read_le(&out), -2);
    }

    #[test]
    fn test_float_bits_preserved() {
        let mut out = [0u8; 8];
        f64::NAN.write_le(&mut out);
        assert!(f64::read_le(&out).is_nan());
        (-0.0f64).write_le(&mut out);
        assert!(f64::read_le(&out).is_sign_negative());
    }

    #[test]
    fn test_enum_width() {
        assert_eq!(enum_width(0), 1);
        assert_eq!(enum_width(3), 1);
        assert_eq!(enum_width(256), 1);
        assert_eq!(enum_width(257), 2);
        assert_eq!(enum_width(65_536), 2);
        assert_eq!(enum_width(65_537), 4);
    }

    #[test]
    fn test_bool_any_nonzero_is_true() {
        assert!(bool::read_le(&[0x02]));
        assert!(!bool::read_le(&[0x00]));
    }

    #[test]
    fn test_text_rejects_invalid_utf8() {
        assert!(matches!(
            Text::decode(4, &[0xFF, 0xFE]),
            Err(ZeroError::InvalidUtf8 { slot: 4, .. })
        ));
        assert_eq!(Text::decode(0, b"ok").unwrap(), "ok");
    }

    #[test]
    fn test_bytes_pass_through() {
        assert_eq!(Bytes::decode(0, &[0xFF, 0x00]).unwrap(), &[0xFF, 0x00]);
    }
}
