//! Equivalence harness running random operation sequences against [`BTreeSet`].
//!
//! Shared by the property tests and the fuzz targets.

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, NOT_FOUND};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    /// Picks the key at this position (modulo the length) among the keys currently in the tree.
    Index(usize),
    Random(i32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in -500i32..500,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Add(ItemValue),
    Delete(ItemValue),
    Contains(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
    /// Copies the tree, mutates the copy, and checks the original is unaffected.
    CloneAndDelete(ItemValue),
}

impl Op {
    fn finalize(self, sorted: &[i32]) -> FinalOp {
        fn get_value(v: &[i32], i: ItemValue) -> i32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as i32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Add(item) => FinalOp::Add(get_value(sorted, item)),
            Op::Delete(item) => FinalOp::Delete(get_value(sorted, item)),
            Op::Contains(item) => FinalOp::Contains(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
            Op::CloneAndDelete(item) => FinalOp::CloneAndDelete(get_value(sorted, item)),
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Add(i32),
    Delete(i32),
    Contains(i32),
    First,
    PopFirst,
    Last,
    PopLast,
    CloneAndDelete(i32),
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Add),
        value_strategy().prop_map(Op::Delete),
        value_strategy().prop_map(Op::Contains),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
        value_strategy().prop_map(Op::CloneAndDelete),
    ]
}

pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut btree = BTreeSet::new();
    let mut avl = AvlTree::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        // The set iterates in order, so this is the sorted key list `Index` values select from.
        let sorted: Vec<i32> = btree.iter().copied().collect();
        let final_op = op.finalize(&sorted);

        match final_op {
            FinalOp::Add(value) => {
                let len = avl.len();
                let from_btree = btree.insert(value);
                let from_avl = avl.add(value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
                if !from_avl {
                    assert_eq!(len, avl.len(), "FinalOp #{op_id}: {op:?}");
                }
            }

            FinalOp::Delete(value) => {
                let from_btree = btree.remove(&value);

                // A failed delete must leave the shape untouched, so depths are compared too.
                let depths_before: Vec<_> = sorted.iter().map(|&k| avl.contains(k)).collect();
                let from_avl = avl.delete(value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
                if !from_avl {
                    let depths_after: Vec<_> = sorted.iter().map(|&k| avl.contains(k)).collect();
                    assert_eq!(depths_before, depths_after, "FinalOp #{op_id}: {op:?}");
                }
            }

            FinalOp::Contains(value) => {
                let from_btree = btree.contains(&value);
                let from_avl = avl.contains(value);

                assert_eq!(from_btree, from_avl >= 0, "FinalOp #{op_id}: {op:?}");
                assert_eq!(from_avl, avl.depth(value).map_or(NOT_FOUND, |d| d as i32));
            }

            FinalOp::First => {
                let from_btree = btree.first().copied();
                let from_avl = avl.first();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_avl = avl.pop_first();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last().copied();
                let from_avl = avl.last();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_avl = avl.pop_last();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::CloneAndDelete(value) => {
                let mut copy = avl.clone();
                copy.assert_invariants();
                assert_eq!(copy, avl, "FinalOp #{op_id}: {op:?}");

                let present = copy.delete(value);
                copy.add(value.wrapping_add(1));

                assert_eq!(present, btree.contains(&value), "FinalOp #{op_id}: {op:?}");
                assert_eq!(btree.contains(&value), avl.contains(value) >= 0);
                copy.assert_invariants();
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree.iter().copied().eq(avl.iter()));
    }
}
