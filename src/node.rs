//! Intrusive link header embedded in every record a table links.

use slotmap::{DefaultKey, Key};

/// Link header a record carries so a [`HashTable`](crate::HashTable) can
/// thread it into a bucket chain.
///
/// The header stores the full hash computed at insertion time and the
/// handle of the next record in the same chain. Both fields are owned by
/// the table while the record is linked; callers can only read the cached
/// hash.
#[derive(Debug)]
pub struct HashNode<H: Key = DefaultKey> {
    pub(crate) hash: u64,
    pub(crate) next: Option<H>,
}

impl<H: Key> HashNode<H> {
    pub const fn new() -> Self {
        Self {
            hash: 0,
            next: None,
        }
    }

    /// Full (unreduced) hash cached by the last insertion.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Handle of the next record in the chain, if any.
    pub fn next(&self) -> Option<H> {
        self.next
    }
}

impl<H: Key> Default for HashNode<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Records that embed a [`HashNode`].
///
/// This replaces the "header is the first field" layout convention: the
/// table reaches the header through these accessors instead of casting.
pub trait Linked<H: Key = DefaultKey> {
    fn node(&self) -> &HashNode<H>;
    fn node_mut(&mut self) -> &mut HashNode<H>;
}
