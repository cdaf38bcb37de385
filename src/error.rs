//! Invariant violations reported by `validate`.

use std::error;
use std::fmt;
use std::result;

/// An enum representing a broken structural invariant of a tree.
///
/// None of the mutating operations of the sets can fail. These errors only surface from
/// `validate`, and only when a key type's `Ord` implementation is not a total order or the tree
/// was otherwise corrupted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The in-order traversal is not strictly ascending.
    Unordered,
    /// An avl node's stored height does not match the heights of its children.
    StaleHeight {
        /// Height computed from the children.
        expected: usize,
        /// Height stored in the node.
        actual: usize,
    },
    /// The heights of an avl node's subtrees differ by more than one.
    Unbalanced {
        /// Left subtree height minus right subtree height.
        balance: isize,
    },
    /// The root of a red black tree is red.
    RedRoot,
    /// A red node has a red child.
    RedViolation,
    /// Two paths from the same node cross a different number of black nodes.
    BlackHeightMismatch {
        /// Black-height of the left subtree.
        left: usize,
        /// Black-height of the right subtree.
        right: usize,
    },
    /// A child's parent reference does not point back at its parent.
    BrokenParentLink,
    /// The cached length disagrees with the number of reachable nodes.
    LengthMismatch {
        /// Number of reachable nodes.
        expected: usize,
        /// Cached length.
        actual: usize,
    },
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unordered => write!(f, "keys are not in strictly ascending order"),
            Error::StaleHeight { expected, actual } => {
                write!(f, "node height is {} but its children imply {}", actual, expected)
            },
            Error::Unbalanced { balance } => {
                write!(f, "subtree heights differ by {}", balance)
            },
            Error::RedRoot => write!(f, "root is red"),
            Error::RedViolation => write!(f, "red node has a red child"),
            Error::BlackHeightMismatch { left, right } => write!(
                f,
                "left black-height {} differs from right black-height {}",
                left, right,
            ),
            Error::BrokenParentLink => write!(f, "child does not link back to its parent"),
            Error::LengthMismatch { expected, actual } => {
                write!(f, "length is {} but {} nodes are reachable", actual, expected)
            },
        }
    }
}

/// Convenience `Result` type for tree validation.
pub type Result<T> = result::Result<T, Error>;
