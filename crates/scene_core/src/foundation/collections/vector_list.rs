//! Slot store with O(1) recycling and skip-aware iteration
//!
//! `VectorList<T>` hands out stable `u32` indices. Each index maps through an
//! indirection table either to a storage slot or to a node of the intrusive
//! free list. Free entries also carry a skip count: the length of the run of
//! consecutive free indices starting at that entry, so a forward sweep jumps
//! over whole runs instead of visiting every hole.
//!
//! Skip counts saturate at [`MAX_SKIP`] and restart from 1 past it. Very long
//! free runs therefore take a few extra jumps to cross, but iteration never
//! lands on a free index.

/// Index space bound (live + free indices).
pub const MAX_INDICES: usize = 1 << 24;

/// Largest skip count stored in a free entry.
pub const MAX_SKIP: u8 = 127;

const NO_FREE: u32 = u32::MAX;

/// Entry of the index indirection table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Live index, pointing at its storage slot
    Used(u32),
    /// Free-list node
    Free {
        /// Next free index, `NO_FREE` terminates the list
        next: u32,
        /// Consecutive free indices starting here (1..=MAX_SKIP)
        skip: u8,
    },
}

/// Growable slab with an index indirection table and an intrusive free list.
#[derive(Debug, Clone)]
pub struct VectorList<T> {
    storage: Vec<Option<T>>,
    vacant_storage: Vec<u32>,
    indices: Vec<Slot>,
    free_head: u32,
    len: usize,
}

impl<T> Default for VectorList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> VectorList<T> {
    /// Create an empty list
    pub const fn new() -> Self {
        Self {
            storage: Vec::new(),
            vacant_storage: Vec::new(),
            indices: Vec::new(),
            free_head: NO_FREE,
            len: 0,
        }
    }

    /// Create an empty list with room for `capacity` values
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Vec::with_capacity(capacity),
            vacant_storage: Vec::new(),
            indices: Vec::with_capacity(capacity),
            free_head: NO_FREE,
            len: 0,
        }
    }

    /// Number of live values
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when no value is live
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the index space (live and free indices)
    pub fn capacity(&self) -> usize {
        self.indices.len()
    }

    /// Number of storage slots, occupied or not
    pub fn storage_len(&self) -> usize {
        self.storage.len()
    }

    /// Ratio of storage slots to live values, 1.0 when perfectly packed
    pub fn fragmentation(&self) -> f32 {
        if self.len == 0 {
            if self.storage.is_empty() { 1.0 } else { self.storage.len() as f32 }
        } else {
            self.storage.len() as f32 / self.len as f32
        }
    }

    /// Insert a value and return its index. Reuses the most recently freed
    /// index when there is one.
    pub fn add(&mut self, value: T) -> u32 {
        let slot = self.alloc_storage(value);

        let idx = if self.free_head == NO_FREE {
            assert!(
                self.indices.len() < MAX_INDICES,
                "VectorList index space exhausted ({MAX_INDICES} indices)"
            );
            self.indices.push(Slot::Used(slot));
            (self.indices.len() - 1) as u32
        } else {
            let idx = self.free_head;
            match self.indices[idx as usize] {
                Slot::Free { next, .. } => self.free_head = next,
                Slot::Used(_) => unreachable!("free list head {idx} is a used index"),
            }
            self.indices[idx as usize] = Slot::Used(slot);
            if idx > 0 {
                self.repair_skips_from(idx as usize - 1);
            }
            idx
        };

        self.len += 1;
        idx
    }

    /// Drop the value at `idx` and return the next live index.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not a live index.
    pub fn remove(&mut self, idx: u32) -> Option<u32> {
        let slot = match self.indices.get(idx as usize) {
            Some(Slot::Used(slot)) => *slot,
            _ => panic!("VectorList::remove on unused index {idx}"),
        };

        self.storage[slot as usize] = None;
        self.vacant_storage.push(slot);

        self.indices[idx as usize] = Slot::Free {
            next: self.free_head,
            skip: 1,
        };
        self.free_head = idx;
        self.repair_skips_from(idx as usize);

        self.len -= 1;
        self.next(idx)
    }

    /// True if `idx` is in bounds and holds a value
    pub fn is_used(&self, idx: u32) -> bool {
        matches!(self.indices.get(idx as usize), Some(Slot::Used(_)))
    }

    /// First live index
    pub fn first(&self) -> Option<u32> {
        self.scan_from(0)
    }

    /// Next live index after `idx`
    pub fn next(&self, idx: u32) -> Option<u32> {
        self.scan_from(idx as usize + 1)
    }

    /// Value at `idx`
    pub fn get(&self, idx: u32) -> Option<&T> {
        match self.indices.get(idx as usize) {
            Some(Slot::Used(slot)) => self.storage.get(*slot as usize)?.as_ref(),
            _ => None,
        }
    }

    /// Mutable value at `idx`
    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        match self.indices.get(idx as usize) {
            Some(Slot::Used(slot)) => self.storage.get_mut(*slot as usize)?.as_mut(),
            _ => None,
        }
    }

    /// Iterate over `(index, &value)` pairs in index order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.first(),
        }
    }

    /// Iterate over `(index, &mut value)` pairs in storage order.
    ///
    /// Storage order equals index order right after [`compact`](Self::compact).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> + '_ {
        let mut owners = vec![u32::MAX; self.storage.len()];
        for (idx, slot) in self.indices.iter().enumerate() {
            if let Slot::Used(slot) = slot {
                owners[*slot as usize] = idx as u32;
            }
        }
        self.storage
            .iter_mut()
            .zip(owners)
            .filter_map(|(value, idx)| value.as_mut().map(|value| (idx, value)))
    }

    /// Iterate over live indices in index order
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        std::iter::successors(self.first(), move |idx| self.next(*idx))
    }

    /// Repack storage so it holds only live values, in index order.
    ///
    /// Indices keep their meaning; only the storage slots they point at change.
    pub fn compact(&mut self) {
        let mut packed = Vec::with_capacity(self.len);
        let mut cursor = self.first();

        while let Some(idx) = cursor {
            if let Slot::Used(slot) = self.indices[idx as usize] {
                packed.push(self.storage[slot as usize].take());
                self.indices[idx as usize] = Slot::Used((packed.len() - 1) as u32);
            }
            cursor = self.next(idx);
        }

        self.storage = packed;
        self.vacant_storage.clear();
    }

    /// Drop every value and forget the index space
    pub fn clear(&mut self) {
        self.storage.clear();
        self.vacant_storage.clear();
        self.indices.clear();
        self.free_head = NO_FREE;
        self.len = 0;
    }

    fn alloc_storage(&mut self, value: T) -> u32 {
        if let Some(slot) = self.vacant_storage.pop() {
            self.storage[slot as usize] = Some(value);
            slot
        } else {
            self.storage.push(Some(value));
            (self.storage.len() - 1) as u32
        }
    }

    fn scan_from(&self, start: usize) -> Option<u32> {
        let mut i = start;
        while let Some(slot) = self.indices.get(i) {
            match slot {
                Slot::Used(_) => return Some(i as u32),
                Slot::Free { skip, .. } => i += usize::from((*skip).max(1)),
            }
        }
        None
    }

    /// Recompute skip counts of the free run ending at `start`, walking
    /// backward. Entries further back than `MAX_SKIP` cannot reach past
    /// `start + 1`, so the walk is bounded.
    fn repair_skips_from(&mut self, start: usize) {
        let mut next_skip = match self.indices.get(start + 1) {
            Some(Slot::Free { skip, .. }) => *skip,
            _ => 0,
        };

        for i in (start.saturating_sub(usize::from(MAX_SKIP))..=start).rev() {
            match &mut self.indices[i] {
                Slot::Free { skip, .. } => {
                    *skip = if next_skip >= MAX_SKIP { 1 } else { next_skip + 1 };
                    next_skip = *skip;
                }
                Slot::Used(_) => break,
            }
        }
    }
}

impl<T> std::ops::Index<u32> for VectorList<T> {
    type Output = T;

    fn index(&self, idx: u32) -> &T {
        match self.get(idx) {
            Some(value) => value,
            None => panic!("VectorList: unused index {idx}"),
        }
    }
}

impl<T> std::ops::IndexMut<u32> for VectorList<T> {
    fn index_mut(&mut self, idx: u32) -> &mut T {
        match self.get_mut(idx) {
            Some(value) => value,
            None => panic!("VectorList: unused index {idx}"),
        }
    }
}

/// Iterator over live entries of a [`VectorList`]
pub struct Iter<'a, T> {
    list: &'a VectorList<T>,
    cursor: Option<u32>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (u32, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        self.cursor = self.list.next(idx);
        self.list.get(idx).map(|value| (idx, value))
    }
}

impl<'a, T> IntoIterator for &'a VectorList<T> {
    type Item = (u32, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small deterministic generator so interleavings are reproducible
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            self.0 >> 33
        }
    }

    fn skip_at<T>(list: &VectorList<T>, idx: usize) -> Option<u8> {
        match list.indices[idx] {
            Slot::Free { skip, .. } => Some(skip),
            Slot::Used(_) => None,
        }
    }

    #[test]
    fn test_add_returns_sequential_indices() {
        let mut list = VectorList::new();
        assert_eq!(list.add("a"), 0);
        assert_eq!(list.add("b"), 1);
        assert_eq!(list.add("c"), 2);
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(1), Some(&"b"));
    }

    #[test]
    fn test_freed_indices_are_reused_most_recent_first() {
        let mut list = VectorList::new();
        for i in 0..5 {
            list.add(i);
        }
        list.remove(1);
        list.remove(3);

        assert_eq!(list.add(10), 3);
        assert_eq!(list.add(11), 1);
        assert_eq!(list.add(12), 5);
        assert_eq!(list.get(3), Some(&10));
    }

    #[test]
    fn test_remove_returns_next_live_index() {
        let mut list = VectorList::new();
        for i in 0..6 {
            list.add(i);
        }
        list.remove(3);
        list.remove(4);

        assert_eq!(list.remove(2), Some(5));
        assert_eq!(list.remove(5), None);
    }

    #[test]
    #[should_panic(expected = "unused index")]
    fn test_remove_unused_index_panics() {
        let mut list = VectorList::new();
        list.add(1);
        list.remove(0);
        list.remove(0);
    }

    #[test]
    fn test_iteration_skips_free_runs() {
        let mut list = VectorList::new();
        for i in 0..10 {
            list.add(i);
        }
        for idx in 2..8 {
            list.remove(idx);
        }

        assert_eq!(skip_at(&list, 2), Some(6));
        assert_eq!(skip_at(&list, 7), Some(1));
        assert_eq!(list.indices().collect::<Vec<_>>(), vec![0, 1, 8, 9]);
    }

    #[test]
    fn test_reusing_middle_of_free_run_shortens_preceding_skips() {
        let mut list = VectorList::new();
        for i in 0..10 {
            list.add(i);
        }
        for idx in [2, 3, 4, 6, 7, 5] {
            list.remove(idx);
        }
        // 5 was freed last, so it is reused first
        assert_eq!(list.add(50), 5);

        assert_eq!(skip_at(&list, 2), Some(3));
        assert_eq!(list.indices().collect::<Vec<_>>(), vec![0, 1, 5, 8, 9]);
    }

    #[test]
    fn test_long_free_run_saturates_skip_count() {
        let mut list = VectorList::new();
        for i in 0..400 {
            list.add(i);
        }
        for idx in (1..399).rev() {
            list.remove(idx);
        }

        for idx in 1..399 {
            let skip = skip_at(&list, idx).unwrap();
            assert!((1..=MAX_SKIP).contains(&skip));
            assert!(idx + usize::from(skip) <= 399, "skip at {idx} overshoots");
        }
        assert_eq!(list.indices().collect::<Vec<_>>(), vec![0, 399]);
    }

    #[test]
    fn test_iteration_visits_exactly_live_indices_in_order() {
        let mut rng = Lcg(0x5eed);
        let mut list = VectorList::new();
        let mut live = std::collections::BTreeSet::new();

        for step in 0..5_000u32 {
            if live.is_empty() || rng.next() % 3 != 0 {
                let idx = list.add(step);
                assert!(live.insert(idx), "index {idx} handed out twice");
            } else {
                let pick = (rng.next() as usize) % live.len();
                let idx = *live.iter().nth(pick).unwrap();
                live.remove(&idx);
                list.remove(idx);
            }

            if step % 97 == 0 {
                let visited: Vec<u32> = list.indices().collect();
                let expected: Vec<u32> = live.iter().copied().collect();
                assert_eq!(visited, expected);
            }
        }
        assert_eq!(list.len(), live.len());
    }

    #[test]
    fn test_compact_preserves_values_and_indices() {
        let mut list = VectorList::new();
        for i in 0..20 {
            list.add(i * 10);
        }
        for idx in (0..20).step_by(3) {
            list.remove(idx);
        }
        let before: Vec<(u32, i32)> = list.iter().map(|(i, v)| (i, *v)).collect();
        assert!(list.fragmentation() > 1.0);

        list.compact();

        let after: Vec<(u32, i32)> = list.iter().map(|(i, v)| (i, *v)).collect();
        assert_eq!(before, after);
        assert_eq!(list.storage_len(), list.len());
        assert!((list.fragmentation() - 1.0).abs() < f32::EPSILON);

        // Free indices still recycle after compaction
        let idx = list.add(-1);
        assert!(!before.iter().any(|(i, _)| *i == idx));
        assert_eq!(list.get(idx), Some(&-1));
    }

    #[test]
    fn test_clear_resets_index_space() {
        let mut list = VectorList::new();
        list.add(1);
        list.add(2);
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.capacity(), 0);
        assert_eq!(list.first(), None);
        assert_eq!(list.add(3), 0);
    }

    #[test]
    fn test_iter_mut_and_index_reach_live_values() {
        let mut list = VectorList::new();
        let a = list.add(1);
        let b = list.add(2);
        let c = list.add(3);
        list.remove(b);

        for (_, value) in list.iter_mut() {
            *value *= 10;
        }
        list[c] += 1;

        assert_eq!(list[a], 10);
        assert_eq!(list[c], 31);
        let mut seen: Vec<u32> = list.iter_mut().map(|(idx, _)| idx).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![a, c]);
    }
}
