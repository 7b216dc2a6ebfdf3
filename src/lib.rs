//! This crate exposes a self-balancing Binary Search Tree (an AVL tree) of keys along with the
//! interactive menu that drives it from the command line.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of key (the key that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than or equal to its own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! ## AVL Tree
//!
//! Searching takes `O(height)` where `height` is the longest path from the root `Node` to a leaf
//! `Node`. An AVL tree keeps that at `O(lg N)` by caching the height of every subtree and, after
//! each insert or delete, rotating any `Node` whose subtrees' heights differ by more than one.
//! The difference (left height minus right height) is the `Node`'s _balance factor_.
//!
//! See [`tree::Tree`] for the tree itself and [`menu::Menu`] for the driver.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod menu;
pub mod tree;

pub use tree::{Duplicates, Tree};
