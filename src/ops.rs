//! Per-table operations: how to hash a key, find a record's key, and compare
//! two keys.

use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use hashbrown::hash_map::DefaultHashBuilder;

/// The capability set a [`HashTable`](crate::HashTable) needs from its user.
///
/// Contract:
/// - `hash_of` is a pure function of the key; equal keys must hash equal.
/// - `key_of` extracts the key stored in a record without side effects.
/// - `keys_equal` is an equality test consistent with `hash_of`.
///
/// Tables that share one bundle can hold `&O`; the blanket impl below
/// forwards through the reference.
pub trait HashFunctions<R> {
    type Key: ?Sized;

    fn hash_of(&self, key: &Self::Key) -> u64;

    fn key_of<'r>(&self, record: &'r R) -> &'r Self::Key;

    fn keys_equal(&self, a: &Self::Key, b: &Self::Key) -> bool;
}

impl<R, O> HashFunctions<R> for &O
where
    O: HashFunctions<R> + ?Sized,
{
    type Key = O::Key;

    #[inline]
    fn hash_of(&self, key: &Self::Key) -> u64 {
        (**self).hash_of(key)
    }

    #[inline]
    fn key_of<'r>(&self, record: &'r R) -> &'r Self::Key {
        (**self).key_of(record)
    }

    #[inline]
    fn keys_equal(&self, a: &Self::Key, b: &Self::Key) -> bool {
        (**self).keys_equal(a, b)
    }
}

/// Operations for keys that already implement `Hash + Eq`: a key extractor
/// plus a `BuildHasher`.
///
/// ```
/// use intrusive_hashtab::{HashNode, HashTable, HasherOps, Linked};
/// use slotmap::SlotMap;
///
/// struct Sym {
///     node: HashNode,
///     name: String,
/// }
///
/// impl Linked for Sym {
///     fn node(&self) -> &HashNode { &self.node }
///     fn node_mut(&mut self) -> &mut HashNode { &mut self.node }
/// }
///
/// fn sym_name(s: &Sym) -> &str {
///     &s.name
/// }
///
/// let mut syms = SlotMap::new();
/// let mut table = HashTable::new(31, HasherOps::new(sym_name));
/// let h = syms.insert(Sym { node: HashNode::new(), name: "main".into() });
/// table.insert(&mut syms, h);
/// assert_eq!(table.find(&syms, "main"), Some(h));
/// ```
pub struct HasherOps<K: ?Sized, F, S = DefaultHashBuilder> {
    key_of: F,
    hasher: S,
    _key: PhantomData<fn(&K)>,
}

impl<K: ?Sized, F> HasherOps<K, F> {
    pub fn new<R>(key_of: F) -> Self
    where
        F: Fn(&R) -> &K,
    {
        Self::with_hasher(key_of, DefaultHashBuilder::default())
    }
}

impl<K: ?Sized, F, S> HasherOps<K, F, S> {
    pub fn with_hasher<R>(key_of: F, hasher: S) -> Self
    where
        F: Fn(&R) -> &K,
    {
        Self {
            key_of,
            hasher,
            _key: PhantomData,
        }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<R, K, F, S> HashFunctions<R> for HasherOps<K, F, S>
where
    K: ?Sized + Hash + Eq,
    F: Fn(&R) -> &K,
    S: BuildHasher,
{
    type Key = K;

    #[inline]
    fn hash_of(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    #[inline]
    fn key_of<'r>(&self, record: &'r R) -> &'r K {
        (self.key_of)(record)
    }

    #[inline]
    fn keys_equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}
