//! Enumeration over the slot store and read-only key/value projections.
//!
//! Every iterator scans the allocated prefix of the slot array by index and
//! skips slots that are not live. The live count is captured up front, which
//! makes the iterators exact-size.

use crate::comparer::KeyComparer;
use crate::error::{DictError, Result};
use crate::slim_dict::SlimDict;
use crate::slots::{Slot, SlotState, SlotStore};
use core::fmt;
use core::iter::FusedIterator;

/// Iterator over `(&K, &V)` in slot order.
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(store: &'a SlotStore<K, V>) -> Self {
        Self {
            slots: store.allocated().iter(),
            remaining: store.len(),
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Some(kv) = slot.live() {
                self.remaining -= 1;
                return Some(kv);
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)` in slot order.
pub struct IterMut<'a, K, V> {
    slots: core::slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(store: &'a mut SlotStore<K, V>) -> Self {
        let remaining = store.len();
        Self {
            slots: store.allocated_mut().iter_mut(),
            remaining,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Some(kv) = slot.live_mut() {
                self.remaining -= 1;
                return Some(kv);
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator over `(K, V)` in slot order.
pub struct IntoIter<K, V> {
    slots: std::vec::IntoIter<Slot<K, V>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(store: SlotStore<K, V>) -> Self {
        let remaining = store.len();
        Self {
            slots: store.into_allocated().into_iter(),
            remaining,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let SlotState::Live { key, value, .. } = slot.state {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

fn copy_into<'a, T, I>(items: I, required: usize, dest: &mut [T], index: usize) -> Result<()>
where
    T: Clone + 'a,
    I: Iterator<Item = &'a T>,
{
    let available = dest.len().saturating_sub(index);
    if index > dest.len() || available < required {
        return Err(DictError::DestinationTooSmall {
            required,
            available,
        });
    }
    for (d, item) in dest[index..].iter_mut().zip(items) {
        d.clone_from(item);
    }
    Ok(())
}

/// Read-only projection of the keys of a [`SlimDict`].
///
/// Mutation goes through the dictionary itself; the projection only borrows
/// it.
pub struct Keys<'a, K, V, C> {
    dict: &'a SlimDict<K, V, C>,
}

impl<'a, K, V, C> Keys<'a, K, V, C> {
    pub(crate) fn new(dict: &'a SlimDict<K, V, C>) -> Self {
        Self { dict }
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    pub fn iter(&self) -> KeyIter<'a, K, V> {
        KeyIter {
            inner: self.dict.iter(),
        }
    }

    /// Hash lookup, not a scan.
    pub fn contains(&self, key: &K) -> bool
    where
        C: KeyComparer<K>,
    {
        self.dict.contains_key(key)
    }

    /// Clone every key into `dest[index..]`. Nothing is written unless all
    /// keys fit.
    pub fn copy_to(&self, dest: &mut [K], index: usize) -> Result<()>
    where
        K: Clone,
    {
        copy_into(self.iter(), self.len(), dest, index)
    }
}

impl<K, V, C> Clone for Keys<'_, K, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C> Copy for Keys<'_, K, V, C> {}

impl<'a, K, V, C> IntoIterator for Keys<'a, K, V, C> {
    type Item = &'a K;
    type IntoIter = KeyIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V, C> fmt::Debug for Keys<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Read-only projection of the values of a [`SlimDict`].
pub struct Values<'a, K, V, C> {
    dict: &'a SlimDict<K, V, C>,
}

impl<'a, K, V, C> Values<'a, K, V, C> {
    pub(crate) fn new(dict: &'a SlimDict<K, V, C>) -> Self {
        Self { dict }
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    pub fn iter(&self) -> ValueIter<'a, K, V> {
        ValueIter {
            inner: self.dict.iter(),
        }
    }

    /// Linear scan over the live values.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|v| v == value)
    }

    /// Clone every value into `dest[index..]`. Nothing is written unless all
    /// values fit.
    pub fn copy_to(&self, dest: &mut [V], index: usize) -> Result<()>
    where
        V: Clone,
    {
        copy_into(self.iter(), self.len(), dest, index)
    }
}

impl<K, V, C> Clone for Values<'_, K, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C> Copy for Values<'_, K, V, C> {}

impl<'a, K, V, C> IntoIterator for Values<'a, K, V, C> {
    type Item = &'a V;
    type IntoIter = ValueIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V: fmt::Debug, C> fmt::Debug for Values<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct KeyIter<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for KeyIter<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for KeyIter<'_, K, V> {}
impl<K, V> FusedIterator for KeyIter<'_, K, V> {}

pub struct ValueIter<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for ValueIter<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValueIter<'_, K, V> {}
impl<K, V> FusedIterator for ValueIter<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> ValuesMut<'a, K, V> {
    pub(crate) fn new(store: &'a mut SlotStore<K, V>) -> Self {
        Self {
            inner: IterMut::new(store),
        }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}
