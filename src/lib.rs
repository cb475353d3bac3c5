//! intrusive-hashtab: a fixed-bucket, chained hash table whose links live
//! inside caller-owned records.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small lookup structure for symbol tables and identifier
//!   interning where the records already exist elsewhere and the table only
//!   indexes them.
//! - Pieces:
//!   - `HashNode<H>`: the link header a record embeds (cached hash plus the
//!     handle of the next record in the chain), reached through `Linked`.
//!   - `HashFunctions<R>`: the per-table operations bundle (hash a key,
//!     extract a record's key, compare keys). `HasherOps` builds one from a
//!     `Hash + Eq` key and a `BuildHasher`.
//!   - `HashTable<R, O, H>`: bucket array of chain heads plus a member count.
//!
//! Ownership
//! - Records live in a caller-owned `slotmap::SlotMap<H, R>`; a record's
//!   identity is its generational key, so a stale handle never aliases a
//!   newer record.
//! - The table owns only its bucket array. Dropping the table never drops
//!   or unlinks records.
//! - Each record has one header, so it can be linked into at most one table
//!   at a time.
//!
//! Constraints
//! - Single-threaded; no internal locking.
//! - Bucket count is fixed at construction. There is no rehashing; the load
//!   factor is the caller's choice.
//! - The bucket array is allocated on the first insert, never on a lookup.
//! - Insertion prepends and does not deduplicate: among records with equal
//!   keys the most recently inserted one is found first.
//! - Each record caches the full hash computed at insertion; removal uses
//!   it to find the bucket, so keys must not change while linked.
//!
//! Failure boundaries
//! - Removing a record that is not linked, or finding a chain that points
//!   at a released record, is a caller bug: it is logged and panics.
//!   `try_remove` reports the same conditions as `LinkError`, which insert
//!   also uses for a handle that does not resolve.
//! - Lookups on an empty table simply return `None`.

pub mod hash_table;
mod hash_table_proptest;
pub mod node;
pub mod ops;

// Public surface
pub use hash_table::{HashTable, LinkError};
pub use node::{HashNode, Linked};
pub use ops::{HashFunctions, HasherOps};
