//! AlternateLookup: keyed operations on a `SlimDict<K, ..>` using probe keys
//! of another type `Q`.
//!
//! Probing hashes and compares `Q` directly against stored keys, so a hit
//! never builds a `K`. A `K` is materialized from the `Q` only when an
//! insertion creates a new entry.
//!
//! `AlternateLookupRef` is the read-only form over `&SlimDict`; it can be
//! used alongside other shared borrows such as a running `iter()`.

use crate::comparer::AlternateComparer;
use crate::slim_dict::{key_not_found, SlimDict};
use core::marker::PhantomData;
use core::mem;
use core::ops::{Index, IndexMut};

/// Borrowing view over a [`SlimDict`] keyed by `Q`.
///
/// Created by [`SlimDict::alternate_lookup`], which verifies once that the
/// comparer supports `Q`.
pub struct AlternateLookup<'a, K, V, C, Q: ?Sized> {
    dict: &'a mut SlimDict<K, V, C>,
    _probe: PhantomData<fn(&Q)>,
}

impl<'a, K, V, C, Q> AlternateLookup<'a, K, V, C, Q>
where
    Q: ?Sized,
    C: AlternateComparer<K, Q>,
{
    pub(crate) fn new(dict: &'a mut SlimDict<K, V, C>) -> Self {
        Self {
            dict,
            _probe: PhantomData,
        }
    }

    /// The backing dictionary.
    pub fn dict(&self) -> &SlimDict<K, V, C> {
        self.dict
    }

    #[inline]
    fn find_index(&self, key: &Q) -> Option<usize> {
        probe(self.dict, self.dict.comparer.hash_alternate(key), key)
    }

    pub fn get(&self, key: &Q) -> Option<&V> {
        let i = self.find_index(key)?;
        Some(self.dict.store.entry(i).1)
    }

    pub fn get_mut(&mut self, key: &Q) -> Option<&mut V> {
        let i = self.find_index(key)?;
        Some(self.dict.store.entry_mut(i).1)
    }

    /// Like `get`, but also returns the key as stored in the table.
    pub fn get_key_value(&self, key: &Q) -> Option<(&K, &V)> {
        let i = self.find_index(key)?;
        Some(self.dict.store.entry(i))
    }

    pub fn contains_key(&self, key: &Q) -> bool {
        self.find_index(key).is_some()
    }

    /// Insert unless present. The key is materialized only on insertion.
    pub fn try_add(&mut self, key: &Q, value: V) -> bool {
        let hash = self.dict.comparer.hash_alternate(key);
        if probe(self.dict, hash, key).is_some() {
            return false;
        }
        let owned = self.dict.comparer.materialize(key);
        self.dict.insert_unique(hash, owned, value);
        true
    }

    /// Insert or overwrite, returning the previous value on overwrite.
    pub fn insert(&mut self, key: &Q, value: V) -> Option<V> {
        let hash = self.dict.comparer.hash_alternate(key);
        match probe(self.dict, hash, key) {
            Some(i) => Some(mem::replace(self.dict.store.entry_mut(i).1, value)),
            None => {
                let owned = self.dict.comparer.materialize(key);
                self.dict.insert_unique(hash, owned, value);
                None
            }
        }
    }

    pub fn set(&mut self, key: &Q, value: V) {
        let _ = self.insert(key, value);
    }

    pub fn get_or_insert_with<F>(&mut self, key: &Q, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.dict.comparer.hash_alternate(key);
        let i = match probe(self.dict, hash, key) {
            Some(i) => i,
            None => {
                let owned = self.dict.comparer.materialize(key);
                self.dict.insert_unique(hash, owned, default())
            }
        };
        self.dict.store.entry_mut(i).1
    }

    pub fn remove(&mut self, key: &Q) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Remove an entry, returning the key as it was stored.
    pub fn remove_entry(&mut self, key: &Q) -> Option<(K, V)> {
        let comparer = &self.dict.comparer;
        let hash = comparer.hash_alternate(key);
        let i = self
            .dict
            .store
            .unlink(hash, |_, k| comparer.eq_alternate(key, k))?;
        Some(self.dict.store.release(i))
    }
}

impl<K, V, C, Q> Index<&Q> for AlternateLookup<'_, K, V, C, Q>
where
    Q: ?Sized,
    C: AlternateComparer<K, Q>,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => key_not_found(),
        }
    }
}

impl<K, V, C, Q> IndexMut<&Q> for AlternateLookup<'_, K, V, C, Q>
where
    Q: ?Sized,
    C: AlternateComparer<K, Q>,
{
    fn index_mut(&mut self, key: &Q) -> &mut V {
        match self.get_mut(key) {
            Some(v) => v,
            None => key_not_found(),
        }
    }
}

/// Read-only view over a [`SlimDict`] keyed by `Q`.
///
/// Created by [`SlimDict::alternate_lookup_ref`]; holds a shared borrow, so
/// several views and iterators may coexist.
pub struct AlternateLookupRef<'a, K, V, C, Q: ?Sized> {
    dict: &'a SlimDict<K, V, C>,
    _probe: PhantomData<fn(&Q)>,
}

impl<K, V, C, Q: ?Sized> Clone for AlternateLookupRef<'_, K, V, C, Q> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C, Q: ?Sized> Copy for AlternateLookupRef<'_, K, V, C, Q> {}

impl<'a, K, V, C, Q> AlternateLookupRef<'a, K, V, C, Q>
where
    Q: ?Sized,
    C: AlternateComparer<K, Q>,
{
    pub(crate) fn new(dict: &'a SlimDict<K, V, C>) -> Self {
        Self {
            dict,
            _probe: PhantomData,
        }
    }

    pub fn dict(&self) -> &'a SlimDict<K, V, C> {
        self.dict
    }

    pub fn get(&self, key: &Q) -> Option<&'a V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value(&self, key: &Q) -> Option<(&'a K, &'a V)> {
        let dict = self.dict;
        let i = probe(dict, dict.comparer.hash_alternate(key), key)?;
        Some(dict.store.entry(i))
    }

    pub fn contains_key(&self, key: &Q) -> bool {
        probe(self.dict, self.dict.comparer.hash_alternate(key), key).is_some()
    }
}

impl<K, V, C, Q> Index<&Q> for AlternateLookupRef<'_, K, V, C, Q>
where
    Q: ?Sized,
    C: AlternateComparer<K, Q>,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => key_not_found(),
        }
    }
}

#[inline]
fn probe<K, V, C, Q>(dict: &SlimDict<K, V, C>, hash: u64, key: &Q) -> Option<usize>
where
    Q: ?Sized,
    C: AlternateComparer<K, Q>,
{
    let comparer = &dict.comparer;
    dict.store.find(hash, |k| comparer.eq_alternate(key, k))
}
