//! SlimDict: hashing, duplicate detection and growth policy over the slot store.

use crate::alternate::{AlternateLookup, AlternateLookupRef};
use crate::comparer::{AlternateComparer, DefaultComparer, KeyComparer};
use crate::error::{DictError, Result};
use crate::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::slots::{max_capacity, SlotStore};
use core::any::type_name;
use core::fmt;
use core::hash::Hash;
use core::mem;
use core::ops::{Index, IndexMut};

/// Smallest non-zero capacity.
const MIN_CAPACITY: usize = 4;

/// A compact dictionary with chained buckets living in the entry array.
///
/// Lookups hash the key once and walk a single chain. Removed entries go to
/// a free list and are reused before the table grows. References returned by
/// accessors borrow the table, so no reference survives a mutation.
#[derive(Clone)]
pub struct SlimDict<K, V, C = DefaultComparer> {
    pub(crate) store: SlotStore<K, V>,
    pub(crate) comparer: C,
}

impl<K, V> SlimDict<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_comparer(DefaultComparer::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparer(capacity, DefaultComparer::new())
    }
}

impl<K, V, C: Default> Default for SlimDict<K, V, C> {
    fn default() -> Self {
        Self::with_comparer(C::default())
    }
}

fn initial_capacity<K, V>(requested: usize) -> usize {
    if requested == 0 {
        return 0;
    }
    match requested.max(MIN_CAPACITY).checked_next_power_of_two() {
        Some(c) if c <= max_capacity::<K, V>() => c,
        _ => capacity_overflow(),
    }
}

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("slim-dict: capacity overflow")
}

#[cold]
#[inline(never)]
pub(crate) fn key_not_found() -> ! {
    panic!("slim-dict: the given key was not present in the dictionary")
}

impl<K, V, C> SlimDict<K, V, C> {
    pub fn with_comparer(comparer: C) -> Self {
        Self {
            store: SlotStore::new(),
            comparer,
        }
    }

    /// Pre-sizes the table. A non-zero `capacity` is rounded up to a power
    /// of two, and to at least 4.
    pub fn with_capacity_and_comparer(capacity: usize, comparer: C) -> Self {
        Self {
            store: SlotStore::with_capacity(initial_capacity::<K, V>(capacity)),
            comparer,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Number of slots in the backing array; zero or a power of two.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Drop every entry and release the backing array.
    pub fn clear(&mut self) {
        log::trace!(
            "slim-dict: clearing {} entries, releasing {} slots",
            self.len(),
            self.capacity()
        );
        self.store.clear();
    }

    /// Linear scan over the live values.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().contains(value)
    }

    /// Entries in slot order. Removals and slot reuse make this order
    /// unrelated to insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.store)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.store)
    }

    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys::new(self)
    }

    pub fn values(&self) -> Values<'_, K, V, C> {
        Values::new(self)
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(&mut self.store)
    }
}

impl<K, V, C> SlimDict<K, V, C>
where
    C: KeyComparer<K>,
{
    #[inline]
    fn find_index(&self, key: &K) -> Option<usize> {
        let comparer = &self.comparer;
        let hash = comparer.hash(key);
        self.store.find(hash, |k| comparer.eq(k, key))
    }

    /// Store a key known to be absent, growing first when no slot is free.
    pub(crate) fn insert_unique(&mut self, hash: u64, key: K, value: V) -> usize {
        if self.store.is_full() {
            self.grow();
        }
        self.store.link_new(hash, key, value)
    }

    fn grow(&mut self) {
        let capacity = self.capacity();
        let next = if capacity == 0 {
            MIN_CAPACITY
        } else {
            match capacity.checked_mul(2) {
                Some(c) if c <= max_capacity::<K, V>() => c,
                _ => capacity_overflow(),
            }
        };
        self.resize(next);
    }

    fn resize(&mut self, capacity: usize) {
        log::trace!(
            "slim-dict: resizing from {} to {} slots ({} live)",
            self.capacity(),
            capacity,
            self.len()
        );
        let comparer = &self.comparer;
        self.store.resize(capacity, |k| comparer.hash(k));
    }

    /// Make room for `additional` more entries without further growth.
    pub fn reserve(&mut self, additional: usize) {
        let free = self.store.free_count() + (self.capacity() - self.store.count());
        if additional <= free {
            return;
        }
        let required = match self
            .store
            .count()
            .checked_add(additional - self.store.free_count())
        {
            Some(r) => r,
            None => capacity_overflow(),
        };
        let capacity = initial_capacity::<K, V>(required);
        log::trace!("slim-dict: reserving {additional} additional entries");
        self.resize(capacity);
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let i = self.find_index(key)?;
        Some(self.store.entry(i).1)
    }

    /// Same as [`get`](Self::get); absence is a normal outcome, not an error.
    pub fn try_get_value(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    /// The stored key (which may differ from `key` under a non-identity
    /// comparer) together with its value.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let i = self.find_index(key)?;
        Some(self.store.entry(i))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let i = self.find_index(key)?;
        Some(self.store.entry_mut(i).1)
    }

    /// Raw-pointer form of [`get`](Self::get): null when the key is absent.
    ///
    /// The pointer is only valid until the next call that takes `&mut self`.
    pub fn get_ref_or_null(&self, key: &K) -> *const V {
        match self.get(key) {
            Some(v) => v as *const V,
            None => core::ptr::null(),
        }
    }

    /// Indexer-style lookup that reports a missing key as an error.
    pub fn try_index(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(DictError::KeyNotFound)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_index(key).is_some()
    }

    /// Insert a new entry; an existing key is an error and leaves the table
    /// unchanged.
    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        let hash = self.comparer.hash(&key);
        if self.store.find(hash, |k| self.comparer.eq(k, &key)).is_some() {
            return Err(DictError::DuplicateKey);
        }
        self.insert_unique(hash, key, value);
        Ok(())
    }

    /// Insert a new entry unless the key is present. Returns whether the
    /// entry was inserted; an existing value is left untouched.
    pub fn try_add(&mut self, key: K, value: V) -> bool {
        self.add(key, value).is_ok()
    }

    /// Insert or overwrite. On overwrite the stored key is kept and the
    /// previous value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.comparer.hash(&key);
        match self.store.find(hash, |k| self.comparer.eq(k, &key)) {
            Some(i) => Some(mem::replace(self.store.entry_mut(i).1, value)),
            None => {
                self.insert_unique(hash, key, value);
                None
            }
        }
    }

    /// Insert or overwrite, discarding any previous value.
    pub fn set(&mut self, key: K, value: V) {
        let _ = self.insert(key, value);
    }

    /// Return the value for `key`, inserting `default()` first when absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.comparer.hash(&key);
        let i = match self.store.find(hash, |k| self.comparer.eq(k, &key)) {
            Some(i) => i,
            None => self.insert_unique(hash, key, default()),
        };
        self.store.entry_mut(i).1
    }

    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Remove an entry, returning the stored key along with the value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let comparer = &self.comparer;
        let hash = comparer.hash(key);
        let i = self.store.unlink(hash, |_, k| comparer.eq(k, key))?;
        Some(self.store.release(i))
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        for i in 0..self.store.count() {
            let retained = match self.store.allocated_mut()[i].live_mut() {
                Some((k, v)) => keep(k, v),
                None => continue,
            };
            if !retained {
                let hash = self.comparer.hash(self.store.entry(i).0);
                let unlinked = self.store.unlink(hash, |idx, _| idx == i);
                debug_assert_eq!(unlinked, Some(i));
                drop(self.store.release(i));
            }
        }
    }

    /// A lookup surface keyed by `Q` instead of `K`.
    ///
    /// Fails when the comparer reports that it cannot handle `Q`; the check
    /// happens here, once, rather than on each operation.
    pub fn alternate_lookup<Q>(&mut self) -> Result<AlternateLookup<'_, K, V, C, Q>>
    where
        Q: ?Sized,
        C: AlternateComparer<K, Q>,
    {
        self.check_alternate::<Q>()?;
        Ok(AlternateLookup::new(self))
    }

    /// Read-only form of [`SlimDict::alternate_lookup`] over a shared borrow.
    pub fn alternate_lookup_ref<Q>(&self) -> Result<AlternateLookupRef<'_, K, V, C, Q>>
    where
        Q: ?Sized,
        C: AlternateComparer<K, Q>,
    {
        self.check_alternate::<Q>()?;
        Ok(AlternateLookupRef::new(self))
    }

    fn check_alternate<Q>(&self) -> Result<()>
    where
        Q: ?Sized,
        C: AlternateComparer<K, Q>,
    {
        if AlternateComparer::<K, Q>::supports_alternate(&self.comparer) {
            Ok(())
        } else {
            Err(DictError::IncompatibleComparer {
                key_type: type_name::<Q>(),
            })
        }
    }
}

impl<K, V, C> Index<&K> for SlimDict<K, V, C>
where
    C: KeyComparer<K>,
{
    type Output = V;

    /// Panics when the key is absent; see [`SlimDict::try_index`].
    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => key_not_found(),
        }
    }
}

impl<K, V, C> IndexMut<&K> for SlimDict<K, V, C>
where
    C: KeyComparer<K>,
{
    fn index_mut(&mut self, key: &K) -> &mut V {
        match self.get_mut(key) {
            Some(v) => v,
            None => key_not_found(),
        }
    }
}

impl<K, V, C> fmt::Debug for SlimDict<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C> Extend<(K, V)> for SlimDict<K, V, C>
where
    C: KeyComparer<K>,
{
    /// Grows only as entries are actually added; duplicates in `iter` and
    /// keys already present never trigger a resize.
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V, C> FromIterator<(K, V)> for SlimDict<K, V, C>
where
    C: KeyComparer<K> + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut dict = Self::default();
        dict.extend(iter);
        dict
    }
}

impl<'a, K, V, C> IntoIterator for &'a SlimDict<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut SlimDict<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C> IntoIterator for SlimDict<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.store)
    }
}
