//! Generational handles over a [`VectorList`]
//!
//! Every index carries a generation counter that is bumped when its value is
//! removed. A [`GenRef`] captures the generation at creation time, so a handle
//! to a removed value fails validation even after the index is reused.

use super::vector_list::{Iter as ListIter, VectorList};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Index + generation handle into a [`GenerationalVectorList`].
///
/// Ordered by generation, then index, so handles can key ordered maps.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenRef {
    idx: u32,
    gen: u32,
}

impl GenRef {
    /// Reserved invalid handle
    pub const INVALID: Self = Self {
        idx: u32::MAX,
        gen: u32::MAX,
    };

    /// Build a handle from raw parts
    pub const fn new(idx: u32, gen: u32) -> Self {
        Self { idx, gen }
    }

    /// Index into the underlying list
    pub const fn idx(self) -> u32 {
        self.idx
    }

    /// Generation captured when the handle was issued
    pub const fn gen(self) -> u32 {
        self.gen
    }

    /// False only for [`GenRef::INVALID`]. Says nothing about liveness.
    pub const fn is_set(self) -> bool {
        !(self.idx == u32::MAX && self.gen == u32::MAX)
    }
}

impl Default for GenRef {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Ord for GenRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gen.cmp(&other.gen).then(self.idx.cmp(&other.idx))
    }
}

impl PartialOrd for GenRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for GenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "GenRef({}v{})", self.idx, self.gen)
        } else {
            f.write_str("GenRef(invalid)")
        }
    }
}

impl fmt::Display for GenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.idx, self.gen)
    }
}

/// Slot store whose handles detect use-after-remove.
#[derive(Debug, Clone)]
pub struct GenerationalVectorList<T> {
    list: VectorList<T>,
    generations: Vec<u32>,
}

impl<T> Default for GenerationalVectorList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GenerationalVectorList<T> {
    /// Create an empty list
    pub const fn new() -> Self {
        Self {
            list: VectorList::new(),
            generations: Vec::new(),
        }
    }

    /// Insert a value and return a handle paired with the index's current generation
    pub fn add_ref(&mut self, value: T) -> GenRef {
        let idx = self.list.add(value);
        if self.generations.len() <= idx as usize {
            self.generations.resize(idx as usize + 1, 0);
        }
        GenRef::new(idx, self.generations[idx as usize])
    }

    /// Remove the value behind `r`. Returns false for a stale or invalid handle.
    ///
    /// The generation is bumped before the slot is reclaimed.
    pub fn remove_ref(&mut self, r: impl Into<GenRef>) -> bool {
        let r = r.into();
        if !self.is_valid(r) {
            return false;
        }
        let gen = &mut self.generations[r.idx as usize];
        *gen = gen.wrapping_add(1);
        self.list.remove(r.idx);
        true
    }

    /// Index in bounds, in use and generation matching
    pub fn is_valid(&self, r: impl Into<GenRef>) -> bool {
        let r = r.into();
        self.list.is_used(r.idx) && self.generations.get(r.idx as usize) == Some(&r.gen)
    }

    /// True if `idx` currently holds a value, whatever its generation
    pub fn is_used(&self, idx: u32) -> bool {
        self.list.is_used(idx)
    }

    /// Handle to the value currently stored at `idx`, `INVALID` when unused
    pub fn get_ref(&self, idx: u32) -> GenRef {
        if self.list.is_used(idx) {
            GenRef::new(idx, self.generations[idx as usize])
        } else {
            GenRef::INVALID
        }
    }

    /// First live handle
    pub fn first_ref(&self) -> GenRef {
        self.list.first().map_or(GenRef::INVALID, |idx| self.get_ref(idx))
    }

    /// Live handle following `r` in index order
    pub fn next_ref(&self, r: GenRef) -> GenRef {
        self.list.next(r.idx).map_or(GenRef::INVALID, |idx| self.get_ref(idx))
    }

    /// Value behind a valid handle
    pub fn get(&self, r: impl Into<GenRef>) -> Option<&T> {
        let r = r.into();
        if self.is_valid(r) { self.list.get(r.idx) } else { None }
    }

    /// Mutable value behind a valid handle
    pub fn get_mut(&mut self, r: impl Into<GenRef>) -> Option<&mut T> {
        let r = r.into();
        if self.is_valid(r) { self.list.get_mut(r.idx) } else { None }
    }

    /// Number of live values
    pub const fn len(&self) -> usize {
        self.list.len()
    }

    /// True when no value is live
    pub const fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Size of the index space; per-index side tables are sized from this
    pub fn capacity(&self) -> usize {
        self.list.capacity()
    }

    /// Storage-to-live ratio of the underlying list
    pub fn fragmentation(&self) -> f32 {
        self.list.fragmentation()
    }

    /// Repack storage. Handles stay valid because indices do not move.
    pub fn compact(&mut self) {
        self.list.compact();
    }

    /// Drop every value. Generations are kept so old handles stay invalid.
    pub fn clear(&mut self) {
        for idx in self.list.indices().collect::<Vec<_>>() {
            let gen = &mut self.generations[idx as usize];
            *gen = gen.wrapping_add(1);
        }
        self.list.clear();
    }

    /// Iterate over `(handle, &value)` pairs in index order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.list.iter(),
            generations: &self.generations,
        }
    }

    /// Live handles in index order
    pub fn refs(&self) -> impl Iterator<Item = GenRef> + '_ {
        self.list.indices().map(move |idx| GenRef::new(idx, self.generations[idx as usize]))
    }
}

/// Iterator over live `(GenRef, &T)` pairs
pub struct Iter<'a, T> {
    inner: ListIter<'a, T>,
    generations: &'a [u32],
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (GenRef, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(idx, value)| (GenRef::new(idx, self.generations[idx as usize]), value))
    }
}
