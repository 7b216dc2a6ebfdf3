use avl::{Duplicates, Tree};

use std::collections::{BTreeSet, HashSet};

use crate::Op;

/// Every balance factor the level order dump reports is -1, 0, or 1 and there's one level per
/// unit of height.
fn is_balanced<K>(tree: &Tree<K>) -> bool {
    let levels = tree.level_order();
    levels.len() == tree.height()
        && levels
            .iter()
            .flatten()
            .all(|(_, balance_factor)| (-1..=1).contains(balance_factor))
}

/// Applies a set of operations to a tree and a sorted vector of the same keys.
/// Returns false as soon as the two disagree or the tree is out of balance.
fn do_ops<K>(ops: &[Op<K>], bst: &mut Tree<K>, model: &mut Vec<K>) -> bool
where
    K: Clone + Ord,
{
    for op in ops {
        match op {
            Op::Insert(k) => {
                bst.insert(k.clone());
                let pos = model.partition_point(|x| x <= k);
                model.insert(pos, k.clone());
            }
            Op::Delete(k) => {
                let expected = model.binary_search(k).ok().map(|pos| model.remove(pos));
                if bst.delete(k) != expected {
                    return false;
                }
            }
        }
        if !is_balanced(bst) || bst.len() != model.len() {
            return false;
        }
    }

    true
}

quickcheck::quickcheck! {
    fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
        let mut tree = Tree::new();
        let mut model = Vec::new();

        do_ops(&ops, &mut tree, &mut model)
            && model.iter().all(|key| tree.contains(key))
            && (i8::MIN..=i8::MAX)
                .filter(|key| model.binary_search(key).is_err())
                .all(|key| !tree.contains(&key))
    }
}

quickcheck::quickcheck! {
    fn balanced_after_every_insert(xs: Vec<i16>) -> bool {
        let mut tree = Tree::new();
        xs.iter().all(|x| {
            tree.insert(*x);
            is_balanced(&tree)
        })
    }
}

quickcheck::quickcheck! {
    fn height_is_logarithmic(xs: Vec<u16>) -> bool {
        let mut tree = Tree::new();
        for x in &xs {
            tree.insert(*x);
        }

        let n = tree.len() as f64;
        tree.height() as f64 <= (1.44 * (n + 2.0).log2()).ceil()
    }
}

quickcheck::quickcheck! {
    fn delete_missing_key_changes_nothing(xs: Vec<i8>, missing: i8) -> bool {
        let mut tree = Tree::new();
        for x in xs.iter().filter(|x| **x != missing) {
            tree.insert(*x);
        }
        let before = tree.level_order().into_iter().map(|level| {
            level.into_iter().map(|(k, bf)| (*k, bf)).collect::<Vec<_>>()
        }).collect::<Vec<_>>();

        let deleted = tree.delete(&missing);
        let after = tree.level_order().into_iter().map(|level| {
            level.into_iter().map(|(k, bf)| (*k, bf)).collect::<Vec<_>>()
        }).collect::<Vec<_>>();

        deleted.is_none() && before == after
    }
}

quickcheck::quickcheck! {
    fn insert_then_delete_everything(keys: Vec<u16>, weights: Vec<u32>) -> bool {
        let mut seen = HashSet::new();
        let keys: Vec<u16> = keys.into_iter().filter(|k| seen.insert(*k)).collect();

        let mut tree = Tree::new();
        for key in &keys {
            tree.insert(*key);
        }

        // Delete in some other order than the insertion order.
        let mut order = keys.clone();
        if !weights.is_empty() {
            order.sort_by_key(|k| weights[*k as usize % weights.len()]);
        }
        for key in &order {
            if tree.delete(key) != Some(*key) || !is_balanced(&tree) {
                return false;
            }
        }

        tree.is_empty() && tree.len() == 0 && tree.level_order().is_empty()
    }
}

quickcheck::quickcheck! {
    fn ignoring_duplicates_keeps_a_set(xs: Vec<i8>) -> bool {
        let mut tree = Tree::with_duplicates(Duplicates::Ignore);
        let mut set = BTreeSet::new();
        for x in &xs {
            if tree.insert(*x) != set.insert(*x) {
                return false;
            }
        }

        tree.len() == set.len() && is_balanced(&tree) && set.iter().all(|x| tree.contains(x))
    }
}

#[test]
fn ascending_permutation_round_trip() {
    let mut tree = Tree::new();
    for key in 1..=1000 {
        tree.insert(key);
    }
    assert!(is_balanced(&tree));
    assert_eq!(tree.height(), 10);

    for key in (1..=1000).rev() {
        assert_eq!(tree.delete(&key), Some(key));
    }
    assert!(tree.level_order().is_empty());
}
