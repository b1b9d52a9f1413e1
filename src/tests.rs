use std::ops::Range;

use proptest::prelude::*;

use crate::model;

use super::*;

// Calls `f` with every permutation of `keys`.
fn for_each_permutation(keys: &mut Vec<i32>, k: usize, f: &mut impl FnMut(&[i32])) {
    if k == keys.len() {
        f(keys.as_slice());
        return;
    }

    for i in k..keys.len() {
        keys.swap(k, i);
        for_each_permutation(keys, k + 1, f);
        keys.swap(k, i);
    }
}

fn permutations(n: i32, mut f: impl FnMut(&[i32])) {
    let mut keys: Vec<i32> = (0..n).collect();
    for_each_permutation(&mut keys, 0, &mut f);
}

fn add_find_all(keys: &[i32]) {
    let mut tree = AvlTree::new();

    for &key in keys {
        assert!(tree.add(key));
        tree.assert_invariants();
    }

    for &key in keys {
        assert!(tree.contains(key) >= 0, "key {key} not found");
    }
}

fn add_delete_all(keys: &[i32]) {
    let mut tree = AvlTree::new();

    for &key in keys {
        tree.add(key);
        tree.assert_invariants();
    }

    for &key in keys {
        assert!(tree.delete(key));
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
    assert_eq!(tree.root, None);

    for &key in keys {
        tree.add(key);
        tree.assert_invariants();
    }

    for &key in keys.iter().rev() {
        assert!(tree.delete(key));
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
}

fn key_of(tree: &AvlTree, link: Link) -> Option<i32> {
    link.map(|n| tree.node(n).key())
}

#[test]
fn zero_elems_find() {
    add_find_all(&[]);
}

#[test]
fn single_elem_find() {
    add_find_all(&[0]);
}

#[test]
fn small_permutations_find() {
    for n in 2..=6 {
        permutations(n, add_find_all);
    }
}

#[test]
fn small_permutations_delete() {
    for n in 1..=6 {
        permutations(n, add_delete_all);
    }
}

#[test]
fn ascending_insert_rotates_left_once() {
    let tree = AvlTree::from_keys(&[1, 2, 3]);
    tree.assert_invariants();

    let root = tree.root.expect("tree is not empty");
    assert_eq!(tree.node(root).key(), 2);
    assert_eq!(tree.node(root).height(), 1);
    assert_eq!(key_of(&tree, tree.node(root).left()), Some(1));
    assert_eq!(key_of(&tree, tree.node(root).right()), Some(3));

    assert_eq!(tree.contains(2), 0);
    assert_eq!(tree.contains(1), 1);
    assert_eq!(tree.contains(3), 1);
}

#[test]
fn double_rotations() {
    // Right-left case.
    let tree = AvlTree::from_keys(&[1, 3, 2]);
    assert_eq!(key_of(&tree, tree.root), Some(2));
    assert_eq!(tree.contains(1), 1);
    assert_eq!(tree.contains(3), 1);

    // Left-right case.
    let tree = AvlTree::from_keys(&[3, 1, 2]);
    assert_eq!(key_of(&tree, tree.root), Some(2));
    assert_eq!(tree.contains(1), 1);
    assert_eq!(tree.contains(3), 1);
}

#[test]
fn balanced_insert_depths() {
    let tree = AvlTree::from_keys(&[5, 3, 8, 1, 4, 7, 9]);
    tree.assert_invariants();

    assert_eq!(key_of(&tree, tree.root), Some(5));
    assert_eq!(tree.contains(5), 0);
    assert_eq!(tree.contains(3), 1);
    assert_eq!(tree.contains(8), 1);
    assert_eq!(tree.contains(1), 2);
    assert_eq!(tree.contains(9), 2);
    assert_eq!(tree.contains(6), NOT_FOUND);
    assert_eq!(tree.depth(4), Some(2));
    assert_eq!(tree.depth(6), None);
}

#[test]
fn delete_with_distant_successor() {
    let mut tree = AvlTree::from_keys(&[5, 3, 8, 1, 4, 7, 9]);

    assert!(tree.delete(5));
    tree.assert_invariants();

    assert_eq!(tree.len(), 6);
    assert_eq!(tree.contains(7), 0);
    assert_eq!(tree.contains(3), 1);
    assert_eq!(tree.contains(8), 1);
    assert_eq!(tree.contains(9), 2);
    assert_eq!(tree.contains(5), NOT_FOUND);
}

#[test]
fn delete_with_adjacent_successor() {
    let mut tree = AvlTree::from_keys(&[5, 3, 8, 1, 4, 7, 9]);

    assert!(tree.delete(3));
    tree.assert_invariants();

    assert_eq!(tree.contains(4), 1);
    assert_eq!(tree.contains(1), 2);
    assert_eq!(tree.contains(3), NOT_FOUND);
}

#[test]
fn delete_with_equal_grandchildren_rotates_once() {
    let mut tree = AvlTree::from_keys(&[2, 1, 4, 3, 5]);

    assert!(tree.delete(1));
    tree.assert_invariants();

    assert_eq!(tree.contains(4), 0);
    assert_eq!(tree.contains(2), 1);
    assert_eq!(tree.contains(5), 1);
    assert_eq!(tree.contains(3), 2);
}

#[test]
fn delete_rebalances_up_to_root() {
    // Minimal tree of height 4: removing from its shallow side unbalances two levels.
    let mut tree = AvlTree::from_keys(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
    tree.assert_invariants();
    assert_eq!(tree.len() as u64, AvlTree::min_nodes_for_height(4));

    assert!(tree.delete(12));
    tree.assert_invariants();
    assert_eq!(tree.len(), 11);

    for key in [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11] {
        assert!(tree.contains(key) >= 0, "key {key} not found");
    }
}

#[test]
fn duplicate_add_is_rejected() {
    let mut tree = AvlTree::from_keys(&[4, 2, 6]);

    assert!(!tree.add(4));
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.try_add(2), Err(TreeError::DuplicateKey(2)));
    assert_eq!(tree.try_add(5), Ok(()));
    assert_eq!(tree.len(), 4);
    tree.assert_invariants();
}

#[test]
fn delete_missing_key_leaves_tree_unchanged() {
    let keys = [10, 5, 15, 3, 7, 12, 20, 1];
    let mut tree = AvlTree::from_keys(&keys);
    let depths: Vec<i32> = keys.iter().map(|&k| tree.contains(k)).collect();

    assert!(!tree.delete(11));
    assert_eq!(tree.try_delete(0), Err(TreeError::KeyNotFound(0)));

    assert_eq!(tree.len(), keys.len());
    let after: Vec<i32> = keys.iter().map(|&k| tree.contains(k)).collect();
    assert_eq!(depths, after);

    assert!(AvlTree::new().try_delete(1).is_err());
}

#[test]
fn from_keys_skips_duplicates() {
    let tree = AvlTree::from_keys(&[3, 1, 3, 2, 1]);

    assert_eq!(tree.len(), 3);
    assert_eq!(tree.iter().collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(AvlTree::from(&[7, 7][..]).len(), 1);
}

#[test]
fn copy_is_independent() {
    let original = AvlTree::from_keys(&[4, 2, 6, 1, 3, 5, 7]);
    let mut copy = original.clone();
    copy.assert_invariants();
    assert_eq!(copy, original);

    assert!(copy.delete(4));
    assert!(copy.add(8));
    copy.assert_invariants();

    assert_eq!(original.len(), 7);
    assert!(original.contains(4) >= 0);
    assert_eq!(original.contains(8), NOT_FOUND);
    assert_ne!(copy, original);
    original.assert_invariants();
}

#[test]
fn iter_yields_sorted_keys() {
    let keys = [50, 20, 80, 10, 30, 70, 90, 25, 35, 60, -5];
    let tree = AvlTree::from_keys(&keys);

    let mut sorted = keys.to_vec();
    sorted.sort_unstable();

    let iter = tree.iter();
    assert_eq!(iter.len(), tree.len());
    assert_eq!(iter.collect::<Vec<_>>(), sorted);
    assert_eq!((&tree).into_iter().count(), tree.len());
}

#[test]
fn iter_exhaustion() {
    let empty = AvlTree::new();
    let mut iter = empty.iter();
    assert!(!iter.has_next());
    assert_eq!(iter.next(), None);

    let tree = AvlTree::from_keys(&[2, 1]);
    let mut iter = tree.iter();
    assert!(iter.has_next());
    assert_eq!(iter.next(), Some(1));
    assert_eq!(iter.next(), Some(2));
    assert!(!iter.has_next());
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next(), None);
}

#[test]
fn iter_remove_is_unsupported() {
    let tree = AvlTree::from_keys(&[1, 2, 3]);
    let mut iter = tree.iter();

    assert_eq!(iter.remove(), Err(TreeError::Unsupported));
    assert_eq!(iter.next(), Some(1));
    assert_eq!(iter.remove(), Err(TreeError::Unsupported));
    assert_eq!(TreeError::Unsupported.to_string(), "operation not supported");
}

#[test]
fn min_nodes_for_height() {
    assert_eq!(AvlTree::min_nodes_for_height(0), 1);
    assert_eq!(AvlTree::min_nodes_for_height(1), 2);
    assert_eq!(AvlTree::min_nodes_for_height(2), 4);
    assert_eq!(AvlTree::min_nodes_for_height(3), 7);
    assert_eq!(AvlTree::min_nodes_for_height(10), 232);

    // N(h) = N(h - 1) + N(h - 2) + 1
    let (mut a, mut b) = (1u64, 2u64);
    for h in 2..=90 {
        let c = a + b + 1;
        assert_eq!(AvlTree::min_nodes_for_height(h), c, "height {h}");
        (a, b) = (b, c);
    }

    assert_eq!(AvlTree::min_nodes_for_height(73), 3416454622906706);
    assert_eq!(AvlTree::min_nodes_for_height(90), 12200160415121876737);
}

#[test]
fn min_nodes_for_height_saturates() {
    assert_eq!(AvlTree::min_nodes_for_height(91), u64::MAX);
    assert_eq!(AvlTree::min_nodes_for_height(1000), u64::MAX);
    assert_eq!(AvlTree::min_nodes_for_height(u32::MAX), u64::MAX);
}

#[test]
fn first_last_and_pop() {
    let mut tree = AvlTree::from_keys(&[5, 1, 9, 3, 7]);

    assert_eq!(tree.first(), Some(1));
    assert_eq!(tree.last(), Some(9));
    assert_eq!(tree.pop_first(), Some(1));
    assert_eq!(tree.pop_last(), Some(9));
    tree.assert_invariants();
    assert_eq!(tree.iter().collect::<Vec<_>>(), [3, 5, 7]);

    // Maximum with a left child: the child is elevated into its place.
    let mut tree = AvlTree::from_keys(&[4, 2, 8, 1, 3, 6]);
    assert_eq!(tree.pop_last(), Some(8));
    tree.assert_invariants();
    assert_eq!(tree.last(), Some(6));
    assert_eq!(tree.contains(6), 1);
    assert_eq!(tree.pop_last(), Some(6));
    tree.assert_invariants();
    assert_eq!(tree.iter().collect::<Vec<_>>(), [1, 2, 3, 4]);

    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.first(), None);
    assert_eq!(tree.pop_last(), None);
}

#[test]
fn freed_slots_are_reused() {
    let mut tree = AvlTree::from_keys(&[1, 2, 3, 4]);

    assert!(tree.delete(2));
    assert!(tree.add(10));
    tree.assert_invariants();
    assert_eq!(tree.nodes.len(), 4);
}

#[test]
fn debug_and_dotgraph() {
    let tree = AvlTree::from_keys(&[2, 1, 3]);
    assert_eq!(format!("{tree:?}"), "{1, 2, 3}");

    let mut dot = String::new();
    tree.dotgraph("t", &mut dot).unwrap();
    assert!(dot.starts_with("digraph \"graph-t\" {"));
    assert!(dot.contains("\"grapht-2\" [label=\"2:1\"];"));
    assert!(dot.contains("\"grapht-2\" -> \"grapht-1\";"));
    assert!(dot.contains("\"grapht-2\" -> \"grapht-3\";"));
    assert!(dot.ends_with("}\n"));

    let mut dot = String::new();
    AvlTree::new().dotgraph("e", &mut dot).unwrap();
    assert_eq!(dot, "digraph \"graph-e\" {}\n");
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn add_then_delete_all(keys in proptest::collection::btree_set(-1000i32..1000, 0..200)) {
        let keys: Vec<i32> = keys.into_iter().collect();
        let mut tree: AvlTree = keys.iter().rev().copied().collect();
        tree.assert_invariants();
        prop_assert_eq!(tree.len(), keys.len());
        prop_assert!(tree.iter().eq(keys.iter().copied()));

        for (i, &key) in keys.iter().enumerate() {
            let key = if i % 2 == 0 { key } else { keys[keys.len() - 1 - i / 2] };
            tree.delete(key);
            tree.assert_invariants();
        }
        for &key in &keys {
            tree.delete(key);
        }

        prop_assert_eq!(tree.len(), 0);
        prop_assert!(tree.root.is_none());
    }
}
