//! Slot store: one array that is both the bucket table and the entry storage.
//!
//! Position `i` of the array plays two roles at once:
//! - `slots[i].bucket` is the head of the chain for bucket `i`;
//! - `slots[i].state` is the entry allocated at index `i`, if any.
//!
//! Live entries are threaded into chains through `Live::next`; released
//! entries are threaded into the free list through `Free::next_free`. Indices
//! past the high-water mark `count` have never been handed out.
//!
//! The store knows nothing about key equality. Callers pass precomputed
//! hashes and match closures; the store maps hashes to buckets, walks chains,
//! and maintains the free list.

use core::mem;

#[derive(Clone, Debug)]
pub(crate) enum SlotState<K, V> {
    Unused,
    Free {
        next_free: Option<usize>,
    },
    Live {
        key: K,
        value: V,
        next: Option<usize>,
    },
}

#[derive(Clone, Debug)]
pub(crate) struct Slot<K, V> {
    pub(crate) bucket: Option<usize>,
    pub(crate) state: SlotState<K, V>,
}

impl<K, V> Slot<K, V> {
    const fn unused() -> Self {
        Self {
            bucket: None,
            state: SlotState::Unused,
        }
    }

    #[inline]
    pub(crate) fn live(&self) -> Option<(&K, &V)> {
        match &self.state {
            SlotState::Live { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn live_mut(&mut self) -> Option<(&K, &mut V)> {
        match &mut self.state {
            SlotState::Live { key, value, .. } => Some((&*key, value)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct SlotStore<K, V> {
    slots: Vec<Slot<K, V>>,
    /// High-water mark: indices `0..count` have been allocated at least once.
    count: usize,
    free_head: Option<usize>,
    free_count: usize,
}

/// Largest power-of-two slot count whose array still fits in `isize::MAX` bytes.
pub(crate) fn max_capacity<K, V>() -> usize {
    let per_slot = mem::size_of::<Slot<K, V>>().max(1);
    let max = isize::MAX as usize / per_slot;
    1usize << (usize::BITS - 1 - max.leading_zeros())
}

#[inline]
fn bucket_of(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (hash as usize) & (capacity - 1)
}

#[cold]
#[inline(never)]
fn corrupted_chain(capacity: usize) -> ! {
    log::error!("slim-dict: chain walk exceeded {capacity} hops");
    panic!(
        "slim-dict: hash chain longer than the table capacity ({capacity}); \
         the table was mutated during a lookup or its links are corrupt"
    )
}

#[cold]
#[inline(never)]
fn dead_slot(index: usize) -> ! {
    log::error!("slim-dict: slot {index} reached through a chain is not live");
    panic!("slim-dict: slot {index} is linked into a chain but holds no entry")
}

impl<K, V> SlotStore<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            count: 0,
            free_head: None,
            free_count: 0,
        }
    }

    /// `capacity` must be zero or a power of two.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity == 0 || capacity.is_power_of_two());
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Slot::unused);
        Self {
            slots,
            count: 0,
            free_head: None,
            free_count: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.count - self.free_count
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub(crate) fn free_count(&self) -> usize {
        self.free_count
    }

    /// No free-list entry and no untouched tail slot remain.
    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.free_count == 0 && self.count == self.slots.len()
    }

    /// The allocated prefix of the array, in index order.
    #[inline]
    pub(crate) fn allocated(&self) -> &[Slot<K, V>] {
        &self.slots[..self.count]
    }

    #[inline]
    pub(crate) fn allocated_mut(&mut self) -> &mut [Slot<K, V>] {
        &mut self.slots[..self.count]
    }

    #[inline]
    pub(crate) fn entry(&self, index: usize) -> (&K, &V) {
        match self.slots[index].live() {
            Some(kv) => kv,
            None => dead_slot(index),
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, index: usize) -> (&K, &mut V) {
        match self.slots[index].live_mut() {
            Some(kv) => kv,
            None => dead_slot(index),
        }
    }

    #[inline]
    fn next_in_chain(&self, index: usize) -> (&K, Option<usize>) {
        match &self.slots[index].state {
            SlotState::Live { key, next, .. } => (key, *next),
            _ => dead_slot(index),
        }
    }

    /// Walk the chain for `hash` and return the first index whose key matches.
    pub(crate) fn find(&self, hash: u64, mut is_match: impl FnMut(&K) -> bool) -> Option<usize> {
        let capacity = self.capacity();
        if capacity == 0 {
            return None;
        }
        let mut cursor = self.slots[bucket_of(hash, capacity)].bucket;
        let mut hops = 0;
        while let Some(i) = cursor {
            if hops == capacity {
                corrupted_chain(capacity);
            }
            hops += 1;
            let (key, next) = self.next_in_chain(i);
            if is_match(key) {
                return Some(i);
            }
            cursor = next;
        }
        None
    }

    /// Walk the chain for `hash`, detach the first matching entry from it and
    /// return its index. The entry stays live until `release` is called.
    pub(crate) fn unlink(
        &mut self,
        hash: u64,
        mut is_match: impl FnMut(usize, &K) -> bool,
    ) -> Option<usize> {
        let capacity = self.capacity();
        if capacity == 0 {
            return None;
        }
        let bucket = bucket_of(hash, capacity);
        let mut prev: Option<usize> = None;
        let mut cursor = self.slots[bucket].bucket;
        let mut hops = 0;
        while let Some(i) = cursor {
            if hops == capacity {
                corrupted_chain(capacity);
            }
            hops += 1;
            let (key, next) = self.next_in_chain(i);
            if is_match(i, key) {
                match prev {
                    None => self.slots[bucket].bucket = next,
                    Some(p) => match &mut self.slots[p].state {
                        SlotState::Live { next: link, .. } => *link = next,
                        _ => dead_slot(p),
                    },
                }
                return Some(i);
            }
            prev = Some(i);
            cursor = next;
        }
        None
    }

    /// Take a slot for a new entry and push it onto the head of its chain.
    /// The caller grows the store first when `is_full()`.
    pub(crate) fn link_new(&mut self, hash: u64, key: K, value: V) -> usize {
        debug_assert!(!self.is_full());
        let index = match self.free_head {
            Some(i) => {
                self.free_head = match self.slots[i].state {
                    SlotState::Free { next_free } => next_free,
                    _ => dead_slot(i),
                };
                self.free_count -= 1;
                i
            }
            None => {
                let i = self.count;
                self.count += 1;
                i
            }
        };
        let bucket = bucket_of(hash, self.capacity());
        let next = self.slots[bucket].bucket;
        self.slots[index].state = SlotState::Live { key, value, next };
        self.slots[bucket].bucket = Some(index);
        index
    }

    /// Return an unlinked live slot to the head of the free list.
    pub(crate) fn release(&mut self, index: usize) -> (K, V) {
        let freed = SlotState::Free {
            next_free: self.free_head,
        };
        match mem::replace(&mut self.slots[index].state, freed) {
            SlotState::Live { key, value, .. } => {
                self.free_head = Some(index);
                self.free_count += 1;
                (key, value)
            }
            _ => dead_slot(index),
        }
    }

    /// Move every entry into a fresh array of `capacity` slots, keeping each
    /// entry at its index. Chains are rebuilt from `hash`; keys are never
    /// compared against each other. Free-list links are index based and
    /// carry over unchanged.
    pub(crate) fn resize(&mut self, capacity: usize, mut hash: impl FnMut(&K) -> u64) {
        debug_assert!(capacity.is_power_of_two());
        debug_assert!(capacity >= self.count);
        let mut old = mem::take(&mut self.slots);
        old.truncate(self.count);
        self.slots.reserve_exact(capacity);
        self.slots.resize_with(capacity, Slot::unused);
        for (i, slot) in old.into_iter().enumerate() {
            self.slots[i].state = match slot.state {
                SlotState::Live { key, value, .. } => {
                    let bucket = bucket_of(hash(&key), capacity);
                    let next = self.slots[bucket].bucket;
                    self.slots[bucket].bucket = Some(i);
                    SlotState::Live { key, value, next }
                }
                other => other,
            };
        }
    }

    /// Drop every entry and the backing array.
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn into_allocated(mut self) -> Vec<Slot<K, V>> {
        self.slots.truncate(self.count);
        self.slots
    }

    /// Every index reachable from a bucket head, paired with its bucket.
    #[cfg(test)]
    pub(crate) fn chained_indices(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (bucket, slot) in self.slots.iter().enumerate() {
            let mut cursor = slot.bucket;
            while let Some(i) = cursor {
                out.push((bucket, i));
                cursor = self.next_in_chain(i).1;
            }
        }
        out
    }
}
