// HashTable property tests.
//
// Property 1: slot placement.
//  - For any slot count and any set of keys, every record reported by
//    `chain(slot)` has `cached_hash % slots == slot`, and the chains
//    together hold every inserted record exactly once.
//
// Property 2: count consistency.
//  - After N inserts and M removals of currently linked records, `len()`
//    and the traversal both report N - M records, and each removed record
//    is no longer returned by lookup unless an equal key is still linked.
use intrusive_hashtab::{HashFunctions, HashNode, HashTable, Linked};
use proptest::prelude::*;
use slotmap::{DefaultKey, SlotMap};
use std::collections::BTreeSet;

struct Rec {
    node: HashNode,
    key: u64,
}

impl Linked for Rec {
    fn node(&self) -> &HashNode {
        &self.node
    }
    fn node_mut(&mut self) -> &mut HashNode {
        &mut self.node
    }
}

// Multiplicative mix so nearby keys spread out while staying deterministic.
struct MixOps;

impl HashFunctions<Rec> for MixOps {
    type Key = u64;
    fn hash_of(&self, key: &u64) -> u64 {
        key.wrapping_mul(0x9e37_79b9_7f4a_7c15).rotate_left(17)
    }
    fn key_of<'r>(&self, record: &'r Rec) -> &'r u64 {
        &record.key
    }
    fn keys_equal(&self, a: &u64, b: &u64) -> bool {
        a == b
    }
}

fn fill(
    slots: usize,
    keys: &[u64],
) -> (SlotMap<DefaultKey, Rec>, HashTable<Rec, MixOps>, Vec<DefaultKey>) {
    let mut store = SlotMap::new();
    let mut table = HashTable::new(slots, MixOps);
    let handles = keys
        .iter()
        .map(|&key| {
            let h = store.insert(Rec {
                node: HashNode::new(),
                key,
            });
            table.insert(&mut store, h);
            h
        })
        .collect();
    (store, table, handles)
}

proptest! {
    #[test]
    fn prop_slot_placement(slots in 1usize..=64, keys in proptest::collection::vec(any::<u64>(), 0..200)) {
        let (store, table, handles) = fill(slots, &keys);

        let mut seen = BTreeSet::new();
        for slot in 0..slots {
            for h in table.chain(&store, slot) {
                prop_assert_eq!((store[h].node.hash() % slots as u64) as usize, slot);
                prop_assert!(seen.insert(h), "record linked twice");
            }
        }
        let all: BTreeSet<DefaultKey> = handles.into_iter().collect();
        prop_assert_eq!(seen, all);
    }

    #[test]
    fn prop_count_consistency(
        slots in 1usize..=16,
        keys in proptest::collection::vec(0u64..32, 1..120),
        picks in proptest::collection::vec(any::<prop::sample::Index>(), 0..120),
    ) {
        let (mut store, mut table, handles) = fill(slots, &keys);
        let mut linked: Vec<DefaultKey> = handles;
        let mut removed = 0usize;

        for pick in picks {
            if linked.is_empty() {
                break;
            }
            let h = linked.swap_remove(pick.index(linked.len()));
            let key = store[h].key;
            table.remove(&mut store, h);
            removed += 1;

            let still_linked = linked.iter().any(|&o| store[o].key == key);
            let found = table.find(&store, &key);
            prop_assert_ne!(found, Some(h));
            prop_assert_eq!(found.is_some(), still_linked);
        }

        prop_assert_eq!(table.len(), keys.len() - removed);
        prop_assert_eq!(table.iter(&store).count(), keys.len() - removed);
        let mut walked = 0usize;
        table.walk(&mut store, |_, _| walked += 1);
        prop_assert_eq!(walked, keys.len() - removed);
    }
}
