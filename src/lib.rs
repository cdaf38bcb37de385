//! Ordered sets backed by self-balancing binary search trees.
//!
//! Two independent implementations are provided:
//!
//! - [`avl_tree::AvlSet`] keeps a height in every node and rotates whenever the heights of two
//!   sibling subtrees differ by two.
//! - [`red_black_tree::RedBlackSet`] keeps a color in every node and restores the red-black
//!   invariants with rotations and recoloring.
//!
//! Both guarantee logarithmic height, so `insert`, `remove` and `contains` run in `O(log n)`.

#![warn(missing_docs)]

#[macro_use]
extern crate log;

pub mod arena;
pub mod avl_tree;
pub mod error;
pub mod red_black_tree;
mod side;

pub use crate::error::{Error, Result};
