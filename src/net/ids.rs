/// Declares a `u32` newtype usable as an [`IndexVec`](crate::net::IndexVec) key.
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Debug::fmt(self, f)
            }
        }

        impl $crate::net::index_vec::Idx for $name {
            fn index(self) -> usize {
                self.0 as usize
            }

            fn from_usize(idx: usize) -> Self {
                debug_assert!(idx <= u32::MAX as usize);
                Self(idx as u32)
            }
        }
    };
}

pub(crate) use define_id;

define_id!(PlaceId, "p");
define_id!(TransitionId, "t");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::index_vec::Idx;

    #[test]
    fn debug_uses_short_prefix() {
        assert_eq!(format!("{:?}", PlaceId::new(3)), "p3");
        assert_eq!(TransitionId::from_usize(7).to_string(), "t7");
        assert_eq!(TransitionId::new(7).index(), 7);
    }
}
