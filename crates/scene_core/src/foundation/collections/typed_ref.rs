//! Typed handles for type-safe table references

use super::generational::GenRef;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A [`GenRef`] tagged with the table it points into.
///
/// The tag is a zero-sized marker, so a `TypedRef<T>` is exactly as large as a
/// `GenRef` and is `Copy` regardless of `T`.
pub struct TypedRef<T> {
    raw: GenRef,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> TypedRef<T> {
    /// Reserved invalid handle
    pub const INVALID: Self = Self::from_raw(GenRef::INVALID);

    /// Tag a raw handle
    pub const fn from_raw(raw: GenRef) -> Self {
        Self {
            raw,
            _phantom: PhantomData,
        }
    }

    /// Underlying untyped handle
    pub const fn raw(self) -> GenRef {
        self.raw
    }

    /// Index into the owning table
    pub const fn idx(self) -> u32 {
        self.raw.idx()
    }

    /// Generation captured when the handle was issued
    pub const fn gen(self) -> u32 {
        self.raw.gen()
    }

    /// False only for [`TypedRef::INVALID`]
    pub const fn is_set(self) -> bool {
        self.raw.is_set()
    }
}

impl<T> Clone for TypedRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedRef<T> {}

impl<T> PartialEq for TypedRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for TypedRef<T> {}

impl<T> Ord for TypedRef<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> PartialOrd for TypedRef<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for TypedRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> Default for TypedRef<T> {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<T> From<GenRef> for TypedRef<T> {
    fn from(raw: GenRef) -> Self {
        Self::from_raw(raw)
    }
}

impl<T> From<TypedRef<T>> for GenRef {
    fn from(typed: TypedRef<T>) -> Self {
        typed.raw
    }
}

impl<T> fmt::Debug for TypedRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = std::any::type_name::<T>().rsplit("::").next().unwrap_or("?");
        if self.is_set() {
            write!(f, "{name}Ref({})", self.raw)
        } else {
            write!(f, "{name}Ref(invalid)")
        }
    }
}

impl<T> fmt::Display for TypedRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

impl<T> Serialize for TypedRef<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for TypedRef<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        GenRef::deserialize(deserializer).map(Self::from_raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn test_typed_ref_round_trips_raw_handle() {
        let raw = GenRef::new(4, 2);
        let typed: TypedRef<Marker> = raw.into();
        assert_eq!(typed.idx(), 4);
        assert_eq!(typed.gen(), 2);
        assert_eq!(GenRef::from(typed), raw);
        assert_eq!(format!("{typed:?}"), "MarkerRef(4v2)");
    }

    #[test]
    fn test_default_is_invalid() {
        let typed = TypedRef::<Marker>::default();
        assert!(!typed.is_set());
        assert_eq!(typed, TypedRef::INVALID);
    }
}
