//! HashTable: fixed-bucket chained table threaded through caller records.

use crate::node::Linked;
use crate::ops::HashFunctions;
use core::fmt;
use core::marker::PhantomData;
use slotmap::{DefaultKey, Key, SlotMap};

/// Why a record could not be linked into or unlinked from a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The handle no longer resolves in the record store.
    StaleHandle,
    /// The record is not linked in the chain its cached hash selects.
    NotMember,
    /// A chain link refers to a record that is gone from the store.
    BrokenChain,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::StaleHandle => f.write_str("handle does not resolve in the record store"),
            LinkError::NotMember => f.write_str("record is not a member of the hash table"),
            LinkError::BrokenChain => f.write_str("hash chain links to a released record"),
        }
    }
}

impl std::error::Error for LinkError {}

#[cold]
#[track_caller]
fn fatal(what: &dyn fmt::Display) -> ! {
    log::error!("hash table invariant violated: {}", what);
    panic!("hash table invariant violated: {}", what);
}

pub struct HashTable<R, O, H: Key = DefaultKey> {
    slots: usize,
    count: usize,
    buckets: Option<Box<[Option<H>]>>, // None until the first insert
    ops: O,
    _records: PhantomData<fn(&R)>,
}

impl<R, O, H> HashTable<R, O, H>
where
    R: Linked<H>,
    O: HashFunctions<R>,
    H: Key,
{
    /// Create a bare table with `slots` buckets. Nothing is allocated until
    /// the first insertion.
    ///
    /// Panics if `slots` is zero.
    pub fn new(slots: usize, ops: O) -> Self {
        assert!(slots > 0, "hash table needs at least one slot");
        Self {
            slots,
            count: 0,
            buckets: None,
            ops,
            _records: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
    pub fn slot_count(&self) -> usize {
        self.slots
    }
    pub fn is_allocated(&self) -> bool {
        self.buckets.is_some()
    }
    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Average chain length.
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.slots as f64
    }

    #[inline]
    fn slot_of(&self, hash: u64) -> usize {
        (hash % self.slots as u64) as usize
    }

    /// Release the bucket array. Linked records are left untouched; their
    /// headers keep stale links until they are inserted somewhere again.
    pub fn done(self) {
        drop(self)
    }

    /// Release a heap-allocated table. `None` is a no-op.
    pub fn free(table: Option<Box<Self>>) {
        if let Some(t) = table {
            t.done();
        }
    }

    pub fn find(&self, store: &SlotMap<H, R>, key: &O::Key) -> Option<H> {
        // A read never forces the bucket array into existence.
        if self.buckets.is_none() {
            return None;
        }
        self.find_hash(store, key, self.ops.hash_of(key))
    }

    /// Like [`find`](Self::find) for callers that already know the key's
    /// hash.
    pub fn find_hash(&self, store: &SlotMap<H, R>, key: &O::Key, hash: u64) -> Option<H> {
        let buckets = self.buckets.as_ref()?;
        let mut cur = buckets[self.slot_of(hash)];
        while let Some(h) = cur {
            let rec = match store.get(h) {
                Some(rec) => rec,
                None => fatal(&LinkError::BrokenChain),
            };
            let node = rec.node();
            // Cached hash first; only call into user comparison on a match.
            if node.hash == hash && self.ops.keys_equal(key, self.ops.key_of(rec)) {
                return Some(h);
            }
            cur = node.next;
        }
        None
    }

    pub fn find_entry<'s>(&self, store: &'s SlotMap<H, R>, key: &O::Key) -> Option<&'s R> {
        let h = self.find(store, key)?;
        store.get(h)
    }

    pub fn find_entry_mut<'s>(
        &self,
        store: &'s mut SlotMap<H, R>,
        key: &O::Key,
    ) -> Option<&'s mut R> {
        let h = self.find(store, key)?;
        store.get_mut(h)
    }

    pub fn contains(&self, store: &SlotMap<H, R>, key: &O::Key) -> bool {
        self.find(store, key).is_some()
    }

    /// Link the record behind `handle` at the head of its chain.
    ///
    /// Records with equal keys are not deduplicated; the newest one shadows
    /// older ones for lookups. Panics if `handle` does not resolve; the
    /// table is left unchanged in that case.
    ///
    /// O(1) in release builds. Debug builds also walk the target chain to
    /// catch a record inserted twice, which costs O(chain length).
    pub fn insert(&mut self, store: &mut SlotMap<H, R>, handle: H) {
        let rec = match store.get(handle) {
            Some(rec) => rec,
            None => fatal(&LinkError::StaleHandle),
        };
        let hash = self.ops.hash_of(self.ops.key_of(rec));

        let slots = self.slots;
        let buckets = self.buckets.get_or_insert_with(|| {
            log::debug!("allocating hash table with {} slots", slots);
            vec![None; slots].into_boxed_slice()
        });
        let slot = (hash % slots as u64) as usize;
        let head = buckets[slot];

        #[cfg(debug_assertions)]
        {
            let mut cur = head;
            while let Some(h) = cur {
                assert!(h != handle, "record inserted twice into the same hash chain");
                cur = store.get(h).and_then(|r| r.node().next);
            }
        }

        let rec = match store.get_mut(handle) {
            Some(rec) => rec,
            None => fatal(&LinkError::StaleHandle),
        };
        let node = rec.node_mut();
        node.hash = hash;
        node.next = head;
        buckets[slot] = Some(handle);
        self.count += 1;
    }

    /// Unlink the record behind `handle`.
    ///
    /// The bucket comes from the hash cached at insertion, so the key must
    /// not have changed since. Panics if the record is not linked; use
    /// [`try_remove`](Self::try_remove) to observe that case instead.
    #[track_caller]
    pub fn remove(&mut self, store: &mut SlotMap<H, R>, handle: H) {
        if let Err(e) = self.try_remove(store, handle) {
            fatal(&e);
        }
    }

    pub fn try_remove(&mut self, store: &mut SlotMap<H, R>, handle: H) -> Result<(), LinkError> {
        let (hash, next) = {
            let node = store.get(handle).ok_or(LinkError::StaleHandle)?.node();
            (node.hash, node.next)
        };
        let slot = self.slot_of(hash);
        let buckets = self.buckets.as_mut().ok_or(LinkError::NotMember)?;

        if buckets[slot] == Some(handle) {
            buckets[slot] = next;
        } else {
            // Walk predecessors until one links to `handle`.
            let mut prev = buckets[slot].ok_or(LinkError::NotMember)?;
            loop {
                let prev_node = store
                    .get_mut(prev)
                    .ok_or(LinkError::BrokenChain)?
                    .node_mut();
                let link = prev_node.next;
                match link {
                    Some(h) if h == handle => {
                        prev_node.next = next;
                        break;
                    }
                    Some(h) => prev = h,
                    None => return Err(LinkError::NotMember),
                }
            }
        }

        if let Some(rec) = store.get_mut(handle) {
            rec.node_mut().next = None;
        }
        self.count -= 1;
        Ok(())
    }

    /// Visit every linked record: buckets in ascending order, each chain
    /// newest first.
    ///
    /// The visitor may change record payloads. It cannot call `insert` or
    /// `remove` while the walk holds the store, but it can still reach the
    /// header through `Linked::node_mut`; leaving the header alone is the
    /// caller's responsibility, and overwriting it corrupts the chain.
    pub fn walk<F>(&self, store: &mut SlotMap<H, R>, mut visit: F)
    where
        F: FnMut(H, &mut R),
    {
        let Some(buckets) = self.buckets.as_ref() else {
            return;
        };
        for &head in buckets.iter() {
            let mut cur = head;
            while let Some(h) = cur {
                let rec = match store.get_mut(h) {
                    Some(rec) => rec,
                    None => fatal(&LinkError::BrokenChain),
                };
                cur = rec.node().next;
                visit(h, rec);
            }
        }
    }

    /// Linked records in [`walk`](Self::walk) order.
    pub fn iter<'a>(&'a self, store: &'a SlotMap<H, R>) -> Iter<'a, R, H> {
        Iter {
            buckets: self.buckets.as_deref().unwrap_or(&[]),
            store,
            cur: None,
        }
    }

    /// Handles linked in bucket `slot`, head first. Empty for a bare table.
    ///
    /// Panics if `slot >= slot_count()`.
    pub fn chain<'a>(&'a self, store: &'a SlotMap<H, R>, slot: usize) -> Chain<'a, R, H> {
        assert!(slot < self.slots, "slot {} out of range ({} slots)", slot, self.slots);
        Chain {
            store,
            cur: self.buckets.as_ref().and_then(|b| b[slot]),
        }
    }
}

impl<R, O, H: Key> fmt::Debug for HashTable<R, O, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("slots", &self.slots)
            .field("count", &self.count)
            .field("allocated", &self.buckets.is_some())
            .finish()
    }
}

impl<R, O, H: Key> Drop for HashTable<R, O, H> {
    fn drop(&mut self) {
        if self.buckets.is_some() {
            log::debug!(
                "releasing hash table buckets ({} slots, {} linked)",
                self.slots,
                self.count
            );
        }
    }
}

/// Iterator over linked records of a [`HashTable`].
pub struct Iter<'a, R, H: Key> {
    buckets: &'a [Option<H>],
    store: &'a SlotMap<H, R>,
    cur: Option<H>,
}

impl<'a, R: Linked<H>, H: Key> Iterator for Iter<'a, R, H> {
    type Item = (H, &'a R);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(h) = self.cur {
                let rec = match self.store.get(h) {
                    Some(rec) => rec,
                    None => fatal(&LinkError::BrokenChain),
                };
                self.cur = rec.node().next;
                return Some((h, rec));
            }
            let (&head, rest) = self.buckets.split_first()?;
            self.buckets = rest;
            self.cur = head;
        }
    }
}

/// Iterator over the handles of one bucket chain.
pub struct Chain<'a, R, H: Key> {
    store: &'a SlotMap<H, R>,
    cur: Option<H>,
}

impl<'a, R: Linked<H>, H: Key> Iterator for Chain<'a, R, H> {
    type Item = H;

    fn next(&mut self) -> Option<H> {
        let h = self.cur?;
        self.cur = match self.store.get(h) {
            Some(rec) => rec.node().next,
            None => fatal(&LinkError::BrokenChain),
        };
        Some(h)
    }
}
