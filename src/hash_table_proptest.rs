#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can inspect
// record headers directly.

use crate::hash_table::{HashTable, LinkError};
use crate::node::{HashNode, Linked};
use crate::ops::HasherOps;
use proptest::prelude::*;
use slotmap::{DefaultKey, SlotMap};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug)]
struct Ident {
    node: HashNode,
    name: String,
    serial: usize,
}

impl Linked for Ident {
    fn node(&self) -> &HashNode {
        &self.node
    }
    fn node_mut(&mut self) -> &mut HashNode {
        &mut self.node
    }
}

fn ident_name(i: &Ident) -> &str {
    &i.name
}

// Pool-indexed operations so shrinking moves toward earlier names.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize),
    // Remove the n-th live record (mod count) carrying this name.
    Remove(usize, usize),
    Find(usize),
    // Removing a record that is not linked must be reported.
    RemoveUnlinked,
    Walk,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<Op>)> {
    (1usize..=7, proptest::collection::vec("[a-d]{0,3}", 1..=6)).prop_flat_map(|(slots, pool)| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            3 => idx.clone().prop_map(Op::Insert),
            2 => (idx.clone(), any::<usize>()).prop_map(|(i, n)| Op::Remove(i, n)),
            2 => idx.clone().prop_map(Op::Find),
            1 => Just(Op::RemoveUnlinked),
            1 => Just(Op::Walk),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (slots, pool.clone(), ops))
    })
}

// Property: the table behaves like a map from name to a LIFO stack of
// records.
// Invariants exercised across random operation sequences:
// - `find(name)` returns the newest live record with that name, or None.
// - `remove` of any live record (head, middle or tail of its chain) keeps
//   the others findable and decrements `len`.
// - `try_remove` of an unlinked record is `NotMember` and changes nothing.
// - `walk` visits each live record exactly once; every visited record sits
//   in bucket `hash % slots`.
// - `len` equals the number of live records after every step.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_lifo_model((slots, pool, ops) in arb_scenario()) {
        let mut store: SlotMap<DefaultKey, Ident> = SlotMap::new();
        let mut table = HashTable::new(slots, HasherOps::new(ident_name));
        let mut model: HashMap<String, Vec<DefaultKey>> = HashMap::new();
        let mut serial = 0usize;

        for op in ops {
            match op {
                Op::Insert(i) => {
                    let name = pool[i].clone();
                    serial += 1;
                    let h = store.insert(Ident { node: HashNode::new(), name: name.clone(), serial });
                    table.insert(&mut store, h);
                    model.entry(name).or_default().push(h);
                }
                Op::Remove(i, n) => {
                    let stack = model.entry(pool[i].clone()).or_default();
                    if !stack.is_empty() {
                        let h = stack.remove(n % stack.len());
                        table.remove(&mut store, h);
                        prop_assert!(store[h].node.next().is_none());
                        store.remove(h);
                    }
                }
                Op::Find(i) => {
                    let expected = model.get(&pool[i]).and_then(|s| s.last().copied());
                    prop_assert_eq!(table.find(&store, pool[i].as_str()), expected);
                    if let Some(h) = expected {
                        let hash = store[h].node.hash();
                        prop_assert_eq!(table.find_hash(&store, pool[i].as_str(), hash), Some(h));
                    }
                }
                Op::RemoveUnlinked => {
                    let h = store.insert(Ident { node: HashNode::new(), name: pool[0].clone(), serial: 0 });
                    let before = table.len();
                    prop_assert_eq!(table.try_remove(&mut store, h), Err(LinkError::NotMember));
                    prop_assert_eq!(table.len(), before);
                    store.remove(h);
                }
                Op::Walk => {
                    let mut seen = BTreeSet::new();
                    table.walk(&mut store, |h, _| { seen.insert(h); });
                    let expected: BTreeSet<DefaultKey> = model.values().flatten().copied().collect();
                    prop_assert_eq!(seen, expected);
                    for slot in 0..slots {
                        for h in table.chain(&store, slot) {
                            prop_assert_eq!((store[h].node.hash() % slots as u64) as usize, slot);
                        }
                    }
                }
            }

            let live: usize = model.values().map(Vec::len).sum();
            prop_assert_eq!(table.len(), live);
        }

        // Within a name, chain order is newest first.
        for (name, stack) in &model {
            let order: Vec<usize> = table
                .iter(&store)
                .filter(|(_, r)| &r.name == name)
                .map(|(_, r)| r.serial)
                .collect();
            let mut expected: Vec<usize> = stack.iter().map(|&h| store[h].serial).collect();
            expected.reverse();
            prop_assert_eq!(order, expected);
        }
    }
}
