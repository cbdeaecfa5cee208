/// Declare a record schema.
///
/// ```
/// use zero_record::{Bytes, Record, Text, zero_record};
///
/// zero_record! {
///     /// A user row.
///     pub struct User => UserView {
///         fixed {
///             id: u64,
///             age: u8,
///         }
///         variable {
///             name: Text,
///             avatar: Bytes,
///         }
///     }
/// }
///
/// let user = User { id: 12345, age: 30, name: "John".into(), avatar: vec![] };
/// let bytes = user.to_bytes().unwrap();
/// let view = UserView::from_bytes(&bytes).unwrap();
/// assert_eq!(view.id(), 12345);
/// assert_eq!(view.name().unwrap(), "John");
/// ```
///
/// This expands to the owned struct, its [`Schema`](crate::Schema) and
/// [`Record`](crate::Record) impls, and a view type with one accessor per
/// field. Fixed accessors return the value; variable accessors return a
/// `Result` because the slot is only checked when read. Offsets are
/// resolved at compile time. Field names must not collide with the view's
/// own methods (`from_bytes`, `raw`, `as_bytes`).
#[macro_export]
macro_rules! zero_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident => $view:ident {
            fixed {
                $( $(#[$fmeta:meta])* $f:ident : $fty:ty ),* $(,)?
            }
            variable {
                $( $(#[$vmeta:meta])* $v:ident : $vty:ty ),* $(,)?
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        $vis struct $name {
            $( $(#[$fmeta])* pub $f: $fty, )*
            $( $(#[$vmeta])* pub $v: <$vty as $crate::VarField>::Owned, )*
        }

        impl $crate::Schema for $name {
            const NAME: &'static str = stringify!($name);
            const FIXED_NAMES: &'static [&'static str] = &[$( stringify!($f) ),*];
            const FIXED_SIZES: &'static [usize] = &[$( <$fty as $crate::FixedField>::SIZE ),*];
            const FIXED_KINDS: &'static [$crate::FieldKind] =
                &[$( <$fty as $crate::FixedField>::KIND ),*];
            const SLOT_NAMES: &'static [&'static str] = &[$( stringify!($v) ),*];
            const SLOT_KINDS: &'static [$crate::FieldKind] =
                &[$( <$vty as $crate::VarField>::KIND ),*];
        }

        impl $crate::Record for $name {
            type View<'a> = $view<'a>;

            #[allow(unused_mut)]
            fn encoded_len(&self) -> usize {
                let mut len = <Self as $crate::Schema>::MIN_SIZE;
                $(
                    len += $crate::slot::heap_len(
                        <$vty as $crate::VarField>::as_bytes(&self.$v),
                    );
                )*
                len
            }

            #[allow(unused_mut)]
            fn encode_with(
                &self,
                buf: &mut [u8],
                options: $crate::BuildOptions,
            ) -> $crate::Result<usize> {
                let mut builder = $crate::Builder::<Self>::with_options(buf, options)?;
                $(
                    {
                        const OFFSET: usize = $crate::layout::field_offset(
                            <$name as $crate::Schema>::FIXED_NAMES,
                            <$name as $crate::Schema>::FIXED_SIZES,
                            stringify!($f),
                        );
                        builder.write_fixed::<$fty>(OFFSET, self.$f);
                    }
                )*
                $(
                    {
                        const INDEX: usize = $crate::layout::slot_index(
                            <$name as $crate::Schema>::SLOT_NAMES,
                            stringify!($v),
                        );
                        builder.write_variable(
                            INDEX,
                            <$vty as $crate::VarField>::as_bytes(&self.$v),
                        )?;
                    }
                )*
                Ok(builder.finish())
            }

            #[inline]
            fn view(bytes: &[u8]) -> $crate::Result<Self::View<'_>> {
                $view::from_bytes(bytes)
            }

            #[allow(unused_variables)]
            fn decode(bytes: &[u8]) -> $crate::Result<Self> {
                let view = $view::from_bytes(bytes)?;
                Ok($name {
                    $( $f: view.$f(), )*
                    $( $v: <$vty as $crate::VarField>::into_owned(view.$v()?), )*
                })
            }
        }

        #[derive(Debug, Clone, Copy)]
        $vis struct $view<'a> {
            inner: $crate::View<'a, $name>,
        }

        impl<'a> $view<'a> {
            #[inline]
            pub fn from_bytes(bytes: &'a [u8]) -> $crate::Result<Self> {
                Ok($view {
                    inner: $crate::View::from_bytes(bytes)?,
                })
            }

            /// The untyped view, for slot-level access.
            #[inline]
            pub fn raw(&self) -> $crate::View<'a, $name> {
                self.inner
            }

            #[inline]
            pub fn as_bytes(&self) -> &'a [u8] {
                self.inner.as_bytes()
            }

            $(
                #[inline]
                pub fn $f(&self) -> $fty {
                    const OFFSET: usize = $crate::layout::field_offset(
                        <$name as $crate::Schema>::FIXED_NAMES,
                        <$name as $crate::Schema>::FIXED_SIZES,
                        stringify!($f),
                    );
                    self.inner.fixed::<$fty>(OFFSET)
                }
            )*

            $(
                #[inline]
                pub fn $v(&self) -> $crate::Result<<$vty as $crate::VarField>::Ref<'a>> {
                    const INDEX: usize = $crate::layout::slot_index(
                        <$name as $crate::Schema>::SLOT_NAMES,
                        stringify!($v),
                    );
                    <$vty as $crate::VarField>::decode(INDEX, self.inner.variable(INDEX)?)
                }
            )*
        }
    };
}

/// Declare a fieldless enum that can be used as a fixed field.
///
/// The discriminant is stored in the smallest of 1, 2 or 4 bytes that
/// holds the variant count. The first variant is the `Default`, and any
/// unknown discriminant reads back as it.
///
/// ```
/// use zero_record::{FixedField, zero_enum};
///
/// zero_enum! {
///     pub enum Status { Unknown, Active, Banned }
/// }
///
/// assert_eq!(<Status as FixedField>::SIZE, 1);
/// assert_eq!(Status::read_le(&[2]), Status::Banned);
/// assert_eq!(Status::read_le(&[9]), Status::Unknown);
/// ```
#[macro_export]
macro_rules! zero_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(#[$fmeta:meta])* $first:ident
            $(, $(#[$vmeta:meta])* $rest:ident)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis enum $name {
            $(#[$fmeta])*
            #[default]
            $first,
            $( $(#[$vmeta])* $rest, )*
        }

        impl $name {
            /// Every variant in discriminant order.
            pub const VARIANTS: &'static [$name] = &[$name::$first $(, $name::$rest)*];
        }

        impl $crate::FixedField for $name {
            const SIZE: usize = $crate::field::enum_width(<$name>::VARIANTS.len());

            #[inline]
            fn write_le(self, out: &mut [u8]) {
                let raw = (self as u32).to_le_bytes();
                out[..Self::SIZE].copy_from_slice(&raw[..Self::SIZE]);
            }

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; 4];
                raw[..Self::SIZE].copy_from_slice(&bytes[..Self::SIZE]);
                <$name>::VARIANTS
                    .get(u32::from_le_bytes(raw) as usize)
                    .copied()
                    .unwrap_or_default()
            }
        }
    };
}
