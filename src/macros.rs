/// Declares a `#[repr(u8)]` enum of wire type ids together with its
/// `TryFrom<u8>` lookup and an `ALL` table listing every variant.
macro_rules! type_id_enum {
    ($( #[$gattr:meta] )* pub enum $ty:ident { $( $( #[$attr:meta] )* $variant:ident = $val:expr,)* }) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $( #[$gattr] )*
        #[allow(missing_docs)]
        pub enum $ty {
            $( $( #[$attr ])* $variant = $val, )*
        }

        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$( $ty::$variant, )*];
        }

        impl ::std::convert::TryFrom<u8> for $ty {
            type Error = ();

            fn try_from(n: u8) -> ::std::result::Result<$ty, ()> {
                match n {
                    $( x if x == $ty::$variant as u8 => Ok($ty::$variant), )*
                    _ => Err(()),
                }
            }
        }

        impl From<$ty> for u8 {
            fn from(ty: $ty) -> u8 {
                ty as u8
            }
        }
    };
}
