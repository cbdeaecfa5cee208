// ─── Error ──────────────────────────────────────────────────────────────────
use smol_str::SmolStr;
use thiserror::Error;

use crate::types::FieldKind;

pub type Result<T> = std::result::Result<T, ZeroError>;

#[derive(Debug, Error)]
pub enum ZeroError {
    /// The buffer is shorter than the schema's structural minimum, or has no
    /// room left for heap data during a build.
    #[error("Buffer too small: need {needed} bytes, have {actual}")]
    BufferTooSmall { needed: usize, actual: usize },
    #[error("Invalid magic bytes: {0:02X?}")]
    InvalidMagic([u8; 2]),
    #[error("Unsupported format version: {0:#04x}")]
    UnsupportedVersion(u8),
    #[error("Slot {slot} does not hold valid UTF-8")]
    InvalidUtf8 {
        slot: usize,
        #[source]
        source: std::str::Utf8Error,
    },
    #[error("Corrupted data in slot {slot}: {reason}")]
    CorruptedData { slot: usize, reason: &'static str },
    #[error("Length {0} does not fit in a 32-bit heap reference")]
    LengthOverflow(usize),
    #[error("Field not found")]
    FieldNotFound,
    #[error("Type mismatch: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        expected: FieldKind,
        actual: FieldKind,
    },
    #[error("schema exceeds the 64-field limit")]
    TooManyFields,
    #[error("Invalid layout for field {field:?}: {reason}")]
    InvalidLayout {
        field: SmolStr,
        reason: &'static str,
    },
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl ZeroError {
    #[inline]
    pub(crate) fn corrupted(slot: usize, reason: &'static str) -> Self {
        ZeroError::CorruptedData { slot, reason }
    }

    /// True for errors that reject a whole buffer rather than a single field.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ZeroError::BufferTooSmall { .. }
                | ZeroError::InvalidMagic(_)
                | ZeroError::UnsupportedVersion(_)
        )
    }
}
