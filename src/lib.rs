//! Zero-copy binary records with fixed field offsets.
//!
//! A record is one contiguous little-endian buffer: a 4-byte header, the
//! fixed-width fields packed without padding, one 16-byte slot per
//! variable-length field, and a trailing heap for values too long to fit
//! their slot. Field offsets are known at compile time, so reading a field
//! is an offset plus a `from_le_bytes`.
//!
//! Entry points are [`Builder::new`] and [`View::from_bytes`]; most code
//! goes through the types generated by [`zero_record!`].

pub mod arena;
pub mod config;
pub mod error;
pub mod field;
pub mod header;
pub mod layout;
mod macros;
pub mod prefetch;
pub mod record;
pub mod simd;
pub mod slot;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use arena::{ArenaPool, RecordArena};
pub use config::BuildOptions;
pub use error::{Result, ZeroError};
pub use field::{Bytes, FixedField, Text, VarField};
pub use header::Header;
pub use layout::{LayoutDescriptor, Schema};
pub use record::{Builder, DynamicView, Record, View};
pub use types::{FieldKind, SlotKind};
