//! Key comparers: the hashing and equality strategy a `SlimDict` probes with.
//!
//! A comparer is a type parameter of the table, so the probe loop is
//! monomorphized per comparer. `DefaultComparer` compiles down to the key's
//! own `Hash`/`Eq`; `CustomComparer` routes every call through boxed closures.
//!
//! `AlternateComparer<K, Q>` adds the cross-type capability used by
//! `AlternateLookup`: hash a `Q`, compare a `Q` against a stored `K`, and turn
//! a `Q` into a `K` when a new entry must be created.

use core::any::{type_name, Any, TypeId};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use hashbrown::hash_map::DefaultHashBuilder;
use hashbrown::HashMap;

/// Hashing and equality over stored keys.
///
/// Keys that compare equal must produce the same hash.
pub trait KeyComparer<K> {
    fn hash(&self, key: &K) -> u64;
    fn eq(&self, a: &K, b: &K) -> bool;
}

/// Cross-type comparison between a probe type `Q` and stored keys `K`.
///
/// For any `q` and `k`, `eq_alternate(q, k)` implies
/// `hash_alternate(q) == hash(k)`.
pub trait AlternateComparer<K, Q: ?Sized>: KeyComparer<K> {
    /// Capability query, asked once when an `AlternateLookup` is created.
    fn supports_alternate(&self) -> bool {
        true
    }

    fn hash_alternate(&self, key: &Q) -> u64;

    fn eq_alternate(&self, key: &Q, stored: &K) -> bool;

    /// Builds the owned key stored for a newly inserted entry.
    fn materialize(&self, key: &Q) -> K;
}

/// Natural `Hash + Eq` comparison of keys, hashed with `S`.
///
/// Supports every alternate type the key can be borrowed as, provided the
/// borrowed form can be turned back into an owned key (`str` for `String`,
/// `[T]` for `Vec<T>`).
#[derive(Clone, Default)]
pub struct DefaultComparer<S = DefaultHashBuilder> {
    hasher: S,
}

impl DefaultComparer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> DefaultComparer<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<S> fmt::Debug for DefaultComparer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultComparer")
    }
}

impl<K, S> KeyComparer<K> for DefaultComparer<S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

impl<K, Q, S> AlternateComparer<K, Q> for DefaultComparer<S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
    S: BuildHasher,
{
    #[inline]
    fn hash_alternate(&self, key: &Q) -> u64 {
        self.hasher.hash_one(key)
    }

    #[inline]
    fn eq_alternate(&self, key: &Q, stored: &K) -> bool {
        stored.borrow() == key
    }

    fn materialize(&self, key: &Q) -> K {
        key.to_owned()
    }
}

/// ASCII case-insensitive comparison of `String` keys, with `str` as the
/// alternate key type.
#[derive(Clone, Default)]
pub struct IgnoreAsciiCase<S = DefaultHashBuilder> {
    hasher: S,
}

impl IgnoreAsciiCase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> IgnoreAsciiCase<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }
}

impl<S: BuildHasher> IgnoreAsciiCase<S> {
    fn hash_str(&self, s: &str) -> u64 {
        let mut h = self.hasher.build_hasher();
        for b in s.bytes() {
            h.write_u8(b.to_ascii_lowercase());
        }
        // Terminator so that prefixes of a longer key do not share its state.
        h.write_u8(0xff);
        h.finish()
    }
}

impl<S> fmt::Debug for IgnoreAsciiCase<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IgnoreAsciiCase")
    }
}

impl<S: BuildHasher> KeyComparer<String> for IgnoreAsciiCase<S> {
    #[inline]
    fn hash(&self, key: &String) -> u64 {
        self.hash_str(key)
    }

    #[inline]
    fn eq(&self, a: &String, b: &String) -> bool {
        a.eq_ignore_ascii_case(b)
    }
}

impl<S: BuildHasher> AlternateComparer<String, str> for IgnoreAsciiCase<S> {
    #[inline]
    fn hash_alternate(&self, key: &str) -> u64 {
        self.hash_str(key)
    }

    #[inline]
    fn eq_alternate(&self, key: &str, stored: &String) -> bool {
        key.eq_ignore_ascii_case(stored)
    }

    fn materialize(&self, key: &str) -> String {
        key.to_owned()
    }
}

struct AlternateFns<K, Q: ?Sized> {
    hash: Box<dyn Fn(&Q) -> u64>,
    eq: Box<dyn Fn(&Q, &K) -> bool>,
    materialize: Box<dyn Fn(&Q) -> K>,
}

/// Comparer assembled from user-supplied closures.
///
/// Alternate key types are opt-in: each one is registered with
/// [`CustomComparer::with_alternate`]. Asking a table for an alternate lookup
/// over an unregistered type fails with `DictError::IncompatibleComparer`.
pub struct CustomComparer<K> {
    hash: Box<dyn Fn(&K) -> u64>,
    eq: Box<dyn Fn(&K, &K) -> bool>,
    alternates: HashMap<TypeId, Box<dyn Any>>,
}

impl<K: 'static> CustomComparer<K> {
    pub fn new(
        hash: impl Fn(&K) -> u64 + 'static,
        eq: impl Fn(&K, &K) -> bool + 'static,
    ) -> Self {
        Self {
            hash: Box::new(hash),
            eq: Box::new(eq),
            alternates: HashMap::new(),
        }
    }

    /// Register `Q` as an alternate key type. Replaces an earlier
    /// registration of the same type.
    pub fn with_alternate<Q: ?Sized + 'static>(
        mut self,
        hash: impl Fn(&Q) -> u64 + 'static,
        eq: impl Fn(&Q, &K) -> bool + 'static,
        materialize: impl Fn(&Q) -> K + 'static,
    ) -> Self {
        let fns: AlternateFns<K, Q> = AlternateFns {
            hash: Box::new(hash),
            eq: Box::new(eq),
            materialize: Box::new(materialize),
        };
        self.alternates.insert(TypeId::of::<Q>(), Box::new(fns));
        self
    }

    fn alternate<Q: ?Sized + 'static>(&self) -> Option<&AlternateFns<K, Q>> {
        self.alternates
            .get(&TypeId::of::<Q>())?
            .downcast_ref::<AlternateFns<K, Q>>()
    }

    fn registered<Q: ?Sized + 'static>(&self) -> &AlternateFns<K, Q> {
        match self.alternate::<Q>() {
            Some(fns) => fns,
            None => panic!(
                "alternate key type `{}` used without registration",
                type_name::<Q>()
            ),
        }
    }
}

impl<K> fmt::Debug for CustomComparer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomComparer")
            .field("alternates", &self.alternates.len())
            .finish()
    }
}

impl<K: 'static> KeyComparer<K> for CustomComparer<K> {
    fn hash(&self, key: &K) -> u64 {
        (self.hash)(key)
    }

    fn eq(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }
}

impl<K: 'static, Q: ?Sized + 'static> AlternateComparer<K, Q> for CustomComparer<K> {
    fn supports_alternate(&self) -> bool {
        self.alternate::<Q>().is_some()
    }

    fn hash_alternate(&self, key: &Q) -> u64 {
        (self.registered::<Q>().hash)(key)
    }

    fn eq_alternate(&self, key: &Q, stored: &K) -> bool {
        (self.registered::<Q>().eq)(key, stored)
    }

    fn materialize(&self, key: &Q) -> K {
        (self.registered::<Q>().materialize)(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: the default comparer hashes a `String` and its `str` borrow
    /// identically, and compares them as equal.
    #[test]
    fn default_alternate_hash_matches_owned_hash() {
        let c = DefaultComparer::new();
        let owned = "hello".to_string();
        let h_owned = KeyComparer::<String>::hash(&c, &owned);
        let h_borrowed = AlternateComparer::<String, str>::hash_alternate(&c, "hello");
        assert_eq!(h_owned, h_borrowed);
        assert!(AlternateComparer::<String, str>::eq_alternate(
            &c, "hello", &owned
        ));
        assert!(!AlternateComparer::<String, str>::eq_alternate(
            &c, "help", &owned
        ));
        let m: String = AlternateComparer::<String, str>::materialize(&c, "x");
        assert_eq!(m, "x");
    }

    /// Invariant: keys differing only in ASCII case are equal and hash alike.
    #[test]
    fn ignore_ascii_case_equal_keys_hash_alike() {
        let c = IgnoreAsciiCase::new();
        let a = "Hello".to_string();
        let b = "hELLO".to_string();
        assert!(c.eq(&a, &b));
        assert_eq!(c.hash(&a), c.hash(&b));
        assert_eq!(c.hash(&a), c.hash_alternate("HELLO"));
        assert!(c.eq_alternate("hello", &a));
        assert!(!c.eq(&a, &"Hell".to_string()));
    }

    /// Invariant: a custom comparer only supports alternate types that were
    /// registered, and routes calls to the registered closures.
    #[test]
    fn custom_comparer_alternate_registration() {
        let c = CustomComparer::<String>::new(|k| k.len() as u64, |a, b| a == b)
            .with_alternate::<str>(
                |q| q.len() as u64,
                |q, k| q == k.as_str(),
                |q| q.to_owned(),
            );

        assert!(AlternateComparer::<String, str>::supports_alternate(&c));
        assert!(!AlternateComparer::<String, [u8]>::supports_alternate(&c));
        assert_eq!(c.hash(&"abc".to_string()), 3);
        assert_eq!(AlternateComparer::<String, str>::hash_alternate(&c, "abcd"), 4);
        assert!(AlternateComparer::<String, str>::eq_alternate(
            &c,
            "abc",
            &"abc".to_string()
        ));
    }

    /// Invariant: calling an alternate operation for an unregistered type is
    /// a programming error and panics.
    #[test]
    #[should_panic(expected = "used without registration")]
    fn custom_comparer_unregistered_alternate_panics() {
        let c = CustomComparer::<String>::new(|k| k.len() as u64, |a, b| a == b);
        let _ = AlternateComparer::<String, str>::hash_alternate(&c, "x");
    }
}
