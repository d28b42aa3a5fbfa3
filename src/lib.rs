//! slim-dict: a compact, single-threaded dictionary that keeps its hash
//! buckets, its entries and its free list in one array.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a dictionary with one allocation, O(1) average lookups, slot reuse
//!   after removal, and lookups keyed by a borrowed form of the key without
//!   building an owned key.
//! - Layers:
//!   - SlotStore<K, V>: the array. Slot `i` is both the head of bucket `i`
//!     and the storage for entry `i`. Walks chains, threads the free list,
//!     and rebuilds chains on resize. Knows hashes, not key equality.
//!   - SlimDict<K, V, C>: hashes keys with the comparer `C`, rejects
//!     duplicates, decides when and how far to grow.
//!   - AlternateLookup<'a, K, V, C, Q>: the same keyed operations, probing
//!     with `Q` through `AlternateComparer<K, Q>`. AlternateLookupRef is its
//!     read-only form over `&SlimDict`.
//!   - Keys / Values: read-only projections; iterators scan slots by index.
//!
//! Constraints
//! - Single-threaded: no synchronization. Every mutating method takes
//!   `&mut self`, so borrowed values never outlive a structural change.
//! - Capacity is zero or a power of two; the first growth goes to 4, each
//!   later one doubles. Growth happens only when no free slot remains.
//! - Entries never move between indices. Resizing re-threads chains using
//!   one hash per live entry and no key comparisons.
//! - Removal returns the slot to the head of the free list; the next insert
//!   reuses it before touching the untouched tail.
//!
//! Comparers and specialization
//! - The comparer is a type parameter. `DefaultComparer` inlines the key's
//!   own `Hash`/`Eq`; `CustomComparer` calls through boxed closures. The
//!   choice is made at compile time, never per call.
//! - `AlternateComparer<K, Q>` hashes and compares `Q` against stored `K`
//!   and materializes a `K` only when inserting. Its `supports_alternate`
//!   capability query is asked once, when the lookup is created.
//!
//! Failure modes
//! - Recoverable conditions are `DictError` values (duplicate key, missing
//!   key on `try_index`, undersized copy destination, incompatible
//!   comparer).
//! - A chain walk longer than the capacity means the links are corrupt. It
//!   is reported with a panic rather than looping forever.
//!
//! Notes and non-goals
//! - No thread safety, no persistence format.
//! - Iteration order is slot order; it does not follow insertion order once
//!   slots are reused.
//! - `clear()` releases the array; capacity drops back to zero.

mod alternate;
pub mod comparer;
mod error;
mod iter;
mod slim_dict;
mod slim_dict_proptest;
mod slots;

// Public surface
pub use alternate::{AlternateLookup, AlternateLookupRef};
pub use comparer::{
    AlternateComparer, CustomComparer, DefaultComparer, IgnoreAsciiCase, KeyComparer,
};
pub use error::{DictError, Result};
pub use iter::{IntoIter, Iter, IterMut, KeyIter, Keys, ValueIter, Values, ValuesMut};
pub use slim_dict::SlimDict;
