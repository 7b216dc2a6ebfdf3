//! A self-balancing BST (specifically, an AVL tree) where every node owns its children through a
//! `Box`. There are no parent pointers: rebalancing happens while the recursion unwinds back
//! towards the root, and rotations hand ownership of subtrees from one node to another.
//!
//! # Examples
//!
//! ```
//! use avl::tree::Tree;
//!
//! let mut tree = Tree::new();
//! tree.insert(10);
//! tree.insert(20);
//! tree.insert(30);
//!
//! // Inserting in ascending order rotated `20` up to the root.
//! assert_eq!(tree.level_order(), vec![vec![(&20, 0)], vec![(&10, 0), (&30, 0)]]);
//!
//! // Deleting a node returns its key. `20` had two children so its successor takes its place.
//! assert_eq!(tree.delete(&20), Some(20));
//! assert_eq!(tree.to_string(), "30(1)\n10(0)\n");
//!
//! // Deleting something that isn't there does nothing.
//! assert_eq!(tree.delete(&42), None);
//! assert_eq!(tree.len(), 2);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::mem;

use tracing::trace;

type Link<K> = Option<Box<Node<K>>>;

/// What [`Tree::insert`] does with a key that compares equal to one already in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Duplicates {
    /// Keep both. The new key is routed to the right of the existing one.
    Allow,
    /// Keep the existing key and leave the tree untouched.
    Ignore,
}

impl Default for Duplicates {
    fn default() -> Self {
        Self::Allow
    }
}

/// A self-balancing Binary Search Tree (specifically, an AVL tree) of keys.
///
/// For every node the heights of its two subtrees differ by at most one, so the height of the
/// tree stays logarithmic in the number of keys no matter what order they're inserted in.
#[derive(Clone, Debug)]
pub struct Tree<K> {
    root: Link<K>,
    len: usize,
    duplicates: Duplicates,
}

impl<K> Default for Tree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Tree<K> {
    /// Generate a new, empty `Tree` that accepts duplicate keys.
    pub fn new() -> Self {
        Self::with_duplicates(Duplicates::default())
    }

    /// Generate a new, empty `Tree` with the given policy for duplicate keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::tree::{Duplicates, Tree};
    ///
    /// let mut tree = Tree::with_duplicates(Duplicates::Ignore);
    ///
    /// assert!(tree.insert(1));
    /// assert!(!tree.insert(1));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn with_duplicates(duplicates: Duplicates) -> Self {
        Self {
            root: None,
            len: 0,
            duplicates,
        }
    }

    /// The number of keys in the tree, counting duplicates.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The number of levels in the tree. An empty tree has a height of 0 and a single key has a
    /// height of 1.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// The duplicate key policy this tree was built with.
    pub fn duplicates(&self) -> Duplicates {
        self.duplicates
    }

    /// Inserts the given key into the tree, rebalancing on the way back up. Returns whether the
    /// tree changed, which is only ever `false` for a duplicate key under [`Duplicates::Ignore`].
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::tree::Tree;
    ///
    /// let mut tree = Tree::new();
    ///
    /// assert!(tree.insert(30));
    /// assert!(tree.insert(10));
    /// assert!(tree.insert(20));
    ///
    /// // The left-right case lifts `20` to the root.
    /// assert_eq!(tree.level_order()[0], vec![(&20, 0)]);
    /// ```
    pub fn insert(&mut self, key: K) -> bool
    where
        K: Ord,
    {
        let (root, inserted) = match self.root.take() {
            Some(root) => root.insert(key, self.duplicates),
            None => (Node::new_boxed(key), true),
        };
        self.root = Some(root);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Deletes a node containing the given key from the tree and returns its key. If the tree
    /// does not contain a node with the key, nothing happens.
    ///
    /// A node with two children takes a copy of its in-order successor's key, and that key is then
    /// deleted from the right subtree, hence the `Clone` bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::tree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1);
    ///
    /// assert_eq!(tree.delete(&1), Some(1));
    /// assert_eq!(tree.delete(&1), None);
    /// assert!(tree.is_empty());
    /// ```
    pub fn delete(&mut self, key: &K) -> Option<K>
    where
        K: Ord + Clone,
    {
        let root = self.root.take()?;
        let (root, deleted) = root.delete(key);
        self.root = root;
        if deleted.is_some() {
            self.len -= 1;
        }
        deleted
    }

    /// Whether some node in the tree has the given key.
    pub fn contains(&self, key: &K) -> bool
    where
        K: Ord,
    {
        let mut link = &self.root;
        while let Some(node) = link {
            link = match key.cmp(&node.key) {
                Ordering::Less => &node.left,
                Ordering::Equal => return true,
                Ordering::Greater => &node.right,
            };
        }
        false
    }

    /// Walks the tree breadth first, one level at a time. Each level lists its keys from left to
    /// right, paired with their balance factor (left height minus right height).
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::tree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// for key in [2, 1, 3, 4] {
    ///     tree.insert(key);
    /// }
    ///
    /// let mut levels = tree.levels();
    /// assert_eq!(levels.next(), Some(vec![(&2, -1)]));
    /// assert_eq!(levels.next(), Some(vec![(&1, 0), (&3, -1)]));
    /// assert_eq!(levels.next(), Some(vec![(&4, 0)]));
    /// assert_eq!(levels.next(), None);
    /// ```
    pub fn levels(&self) -> Levels<'_, K> {
        Levels {
            level: self.root.as_deref().into_iter().collect(),
        }
    }

    /// Collects [`Tree::levels`]. An empty tree has no levels.
    pub fn level_order(&self) -> Vec<Vec<(&K, isize)>> {
        self.levels().collect()
    }
}

/// Renders one line per level, each a space separated list of `key(balance_factor)`.
impl<K> fmt::Display for Tree<K>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in self.levels() {
            let mut entries = level.into_iter();
            if let Some((key, balance_factor)) = entries.next() {
                write!(f, "{}({})", key, balance_factor)?;
            }
            for (key, balance_factor) in entries {
                write!(f, " {}({})", key, balance_factor)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Iterator over the levels of a [`Tree`], created by [`Tree::levels`].
#[derive(Clone, Debug)]
pub struct Levels<'a, K> {
    level: Vec<&'a Node<K>>,
}

impl<'a, K> Iterator for Levels<'a, K> {
    type Item = Vec<(&'a K, isize)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.level.is_empty() {
            return None;
        }

        let mut next_level = Vec::with_capacity(self.level.len() * 2);
        let entries = self
            .level
            .iter()
            .map(|&node| {
                next_level.extend(node.left.as_deref());
                next_level.extend(node.right.as_deref());
                (&node.key, node.balance_factor())
            })
            .collect();
        self.level = next_level;

        Some(entries)
    }
}

/// Which child of a node a key belongs under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    /// Strictly smaller keys go left. Everything else, including equal keys, goes right.
    fn of<K: Ord>(key: &K, node_key: &K) -> Self {
        if key < node_key {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Gets the height of the subtree behind `link`. An empty subtree has a height of 0.
fn height<K>(link: &Link<K>) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

/// Gets the balance factor of the subtree behind `link`. An empty subtree is balanced.
fn balance_factor<K>(link: &Link<K>) -> isize {
    link.as_ref().map_or(0, |n| n.balance_factor())
}

#[derive(Clone, Debug)]
struct Node<K> {
    key: K,
    left: Link<K>,
    right: Link<K>,

    /// How many levels are in the subtree rooted at this node.
    /// A node with no children has a height of 1.
    height: usize,
}

impl<K> Node<K> {
    fn new_boxed(key: K) -> Box<Self> {
        Box::new(Node {
            key,
            left: None,
            right: None,
            height: 1,
        })
    }

    /// Adjusts the height of `self` to be the max of its children's heights + 1.
    fn fix_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }

    /// The difference in height between the left and right subtrees. Positive means the left
    /// subtree is taller. See [the Wikipedia page][wiki] for more details.
    ///
    /// [wiki]: https://en.wikipedia.org/wiki/AVL_tree#Balance_factor
    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }

    /// Rotate self to the right. This moves the left child up vertically and self down vertically,
    /// returning the new root of the subtree. It must only be called when there _is_ a left child.
    ///
    /// ## Panics
    ///
    /// When called on a node without a left child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///      old_root                 new_root
    ///       /     \                 /     \
    ///   new_root   z    rotate ->  x    old_root
    ///    /  \                             /  \
    ///   x    y                           y    z
    /// ```
    fn rotate_right(mut self: Box<Self>) -> Box<Self> {
        let mut new_root = self.left.take().expect("Rotate right => left child");

        self.left = new_root.right.take();
        // The old root is now a child of the new root so its height has to be fixed first.
        self.fix_height();

        new_root.right = Some(self);
        new_root.fix_height();
        new_root
    }

    /// Mirror image of [`Node::rotate_right`]: the right child moves up and self moves down.
    ///
    /// ## Panics
    ///
    /// When called on a node without a right child.
    fn rotate_left(mut self: Box<Self>) -> Box<Self> {
        let mut new_root = self.right.take().expect("Rotate left => right child");

        self.right = new_root.left.take();
        self.fix_height();

        new_root.left = Some(self);
        new_root.fix_height();
        new_root
    }

    fn rotate_left_right(mut self: Box<Self>) -> Box<Self> {
        self.left = self.left.take().map(Self::rotate_left);
        self.rotate_right()
    }

    fn rotate_right_left(mut self: Box<Self>) -> Box<Self> {
        self.right = self.right.take().map(Self::rotate_right);
        self.rotate_left()
    }

    /// Restores the AVL invariant at `self` after one of its subtrees lost a node.
    ///
    /// The deleted key is gone by now so the children's balance factors decide between a single
    /// and a double rotation. A single deletion can unbalance every node on the way back to the
    /// root so this runs at each of them.
    fn rebalance_after_delete(mut self: Box<Self>) -> Box<Self> {
        self.fix_height();

        let balance = self.balance_factor();
        let balanced = if balance > 1 {
            if balance_factor(&self.left) >= 0 {
                trace!(case = "left-left", "rebalancing after delete");
                self.rotate_right()
            } else {
                trace!(case = "left-right", "rebalancing after delete");
                self.rotate_left_right()
            }
        } else if balance < -1 {
            if balance_factor(&self.right) <= 0 {
                trace!(case = "right-right", "rebalancing after delete");
                self.rotate_left()
            } else {
                trace!(case = "right-left", "rebalancing after delete");
                self.rotate_right_left()
            }
        } else {
            self
        };

        balanced.debug_assert_balanced();
        balanced
    }

    /// The smallest key in this subtree.
    fn min(&self) -> &K {
        let mut node = self;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        &node.key
    }

    fn debug_assert_balanced(&self) {
        if cfg!(debug_assertions) {
            let left_height = height(&self.left);
            let right_height = height(&self.right);
            assert_eq!(self.height, left_height.max(right_height) + 1);
            assert!(left_height.abs_diff(right_height) <= 1);
        }
    }
}

impl<K> Node<K>
where
    K: Ord,
{
    /// Inserts `key` into this subtree and returns its new root, along with whether the key was
    /// added. Under [`Duplicates::Ignore`] the walk stops at the first equal key.
    fn insert(mut self: Box<Self>, key: K, duplicates: Duplicates) -> (Box<Self>, bool) {
        if duplicates == Duplicates::Ignore && key == self.key {
            return (self, false);
        }

        let child = match Side::of(&key, &self.key) {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        // If `self` ends up unbalanced, the grandchild the key went under is the one that grew.
        let grown = child.as_ref().map(|child| Side::of(&key, &child.key));

        let (new_child, inserted) = match child.take() {
            Some(child) => child.insert(key, duplicates),
            None => (Self::new_boxed(key), true),
        };
        *child = Some(new_child);

        if !inserted {
            return (self, false);
        }
        (self.rebalance_after_insert(grown), true)
    }

    /// Restores the AVL invariant at `self` after a key was inserted into one of its subtrees.
    ///
    /// `grown` is the side the key took one level below `self` (i.e. whether it's less than the
    /// child's key). A single insertion only grows one grandchild so that alone picks between a
    /// single and a double rotation.
    fn rebalance_after_insert(mut self: Box<Self>, grown: Option<Side>) -> Box<Self> {
        self.fix_height();

        let balanced = match (self.balance_factor(), grown) {
            (n, Some(Side::Left)) if n > 1 => {
                trace!(case = "left-left", "rebalancing after insert");
                self.rotate_right()
            }
            (n, Some(Side::Right)) if n < -1 => {
                trace!(case = "right-right", "rebalancing after insert");
                self.rotate_left()
            }
            (n, Some(Side::Right)) if n > 1 => {
                trace!(case = "left-right", "rebalancing after insert");
                self.rotate_left_right()
            }
            (n, Some(Side::Left)) if n < -1 => {
                trace!(case = "right-left", "rebalancing after insert");
                self.rotate_right_left()
            }
            _ => self,
        };

        balanced.debug_assert_balanced();
        balanced
    }

    /// Deletes a node with the given `key` from this subtree. Returns what remains of the subtree
    /// and the deleted key, if there was one.
    fn delete(mut self: Box<Self>, key: &K) -> (Link<K>, Option<K>)
    where
        K: Clone,
    {
        let deleted = match key.cmp(&self.key) {
            Ordering::Less => {
                let Some(left) = self.left.take() else {
                    return (Some(self), None);
                };
                let (left, deleted) = left.delete(key);
                self.left = left;
                deleted
            }
            Ordering::Greater => {
                let Some(right) = self.right.take() else {
                    return (Some(self), None);
                };
                let (right, deleted) = right.delete(key);
                self.right = right;
                deleted
            }
            Ordering::Equal => match (self.left.take(), self.right.take()) {
                (None, None) => return (None, Some(self.key)),
                (Some(child), None) | (None, Some(child)) => return (Some(child), Some(self.key)),

                // With two children this node takes its successor's key, the smallest in its
                // right subtree, and that key is deleted from the right subtree in turn. With
                // duplicates the search can stop at an equal key above the leftmost node.
                (Some(left), Some(right)) => {
                    let successor = right.min().clone();
                    let (right, _) = right.delete(&successor);
                    self.left = Some(left);
                    self.right = right;
                    Some(mem::replace(&mut self.key, successor))
                }
            },
        };

        (Some(self.rebalance_after_delete()), deleted)
    }
}

#[cfg(test)]
impl<K> Tree<K> {
    /// The keys in sorted order.
    fn in_order(&self) -> Vec<&K> {
        fn walk<'a, K>(link: &'a Link<K>, keys: &mut Vec<&'a K>) {
            if let Some(node) = link {
                walk(&node.left, keys);
                keys.push(&node.key);
                walk(&node.right, keys);
            }
        }

        let mut keys = Vec::with_capacity(self.len);
        walk(&self.root, &mut keys);
        keys
    }

    /// Panics unless every cached height is exact and every node is balanced. Also checks
    /// that keys never decrease from left to right.
    fn assert_invariants(&self)
    where
        K: Ord + fmt::Debug,
    {
        fn check<K>(link: &Link<K>) -> usize {
            let Some(node) = link else {
                return 0;
            };
            let left_height = check(&node.left);
            let right_height = check(&node.right);
            assert_eq!(node.height, left_height.max(right_height) + 1);
            assert!(left_height.abs_diff(right_height) <= 1);
            node.height
        }

        check(&self.root);
        let keys = self.in_order();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]), "{:?}", keys);
        assert_eq!(keys.len(), self.len);
    }
}


#[cfg(test)]
mod quicktests {
    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a tree and a sorted vector.
    /// This way we can ensure that after a random smattering of inserts
    /// and deletes we have the same keys in both.
    fn do_ops<K>(ops: &[Op<K>], bst: &mut Tree<K>, model: &mut Vec<K>)
    where
        K: Clone + Ord + fmt::Debug,
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
                    assert_eq!(bst.delete(k), expected);
                }
                Op::Dump => {
                    let dumped: usize = bst.levels().map(|level| level.len()).sum();
                    assert_eq!(dumped, model.len());
                }
            }
            bst.assert_invariants();
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
            let mut tree = Tree::new();
            let mut model = Vec::new();

            do_ops(&ops, &mut tree, &mut model);
            tree.in_order().into_iter().eq(model.iter())
        }
    }

    quickcheck::quickcheck! {
        fn delete_removes_one_occurrence(xs: Vec<i8>, index: usize) -> bool {
            if xs.is_empty() {
                return true;
            }
            let mut tree = Tree::new();
            for x in &xs {
                tree.insert(*x);
            }
            let key = xs[index % xs.len()];
            let mut expected: Vec<i8> = tree.in_order().into_iter().copied().collect();
            let pos = expected.iter().position(|x| *x == key).unwrap();
            expected.remove(pos);

            tree.delete(&key);
            tree.assert_invariants();
            tree.in_order().into_iter().copied().eq(expected)
        }
    }
}
