pub mod builder;
pub mod dynamic;
pub mod view;

pub use builder::Builder;
pub use dynamic::DynamicView;
pub use view::View;

use crate::config::BuildOptions;
use crate::error::Result;
use crate::layout::Schema;

// ─── Record Trait ───────────────────────────────────────────────────────────

/// An owned value with a fixed schema. Implemented by
/// [`zero_record!`](crate::zero_record).
pub trait Record: Schema + Sized {
    /// The generated zero-copy view type.
    type View<'a>: Copy;

    /// Exact encoded size without heap dedup; an upper bound with it.
    fn encoded_len(&self) -> usize;

    /// Encode into `buf` (at least `encoded_len()` bytes). Returns the
    /// number of bytes used.
    fn encode_with(&self, buf: &mut [u8], options: BuildOptions) -> Result<usize>;

    fn view(bytes: &[u8]) -> Result<Self::View<'_>>;

    /// Copy every field out of `bytes`. Fails on the first bad field.
    fn decode(bytes: &[u8]) -> Result<Self>;

    #[inline]
    fn encode_into(&self, buf: &mut [u8]) -> Result<usize> {
        self.encode_with(buf, BuildOptions::default())
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode_into_vec(&mut buf)?;
        Ok(buf)
    }

    /// Encode into a reusable Vec. The Vec is cleared but keeps its
    /// capacity, so repeated calls stop allocating.
    fn encode_into_vec(&self, buf: &mut Vec<u8>) -> Result<usize> {
        buf.clear();
        buf.resize(self.encoded_len(), 0);
        let len = self.encode_into(buf)?;
        buf.truncate(len);
        Ok(len)
    }
}

#[cfg(test)]
mod props;
