use crate::arena::Handle;
use crate::error::{Error, Result};
use crate::red_black_tree::node::{Color, Node};
use crate::red_black_tree::tree::Tree;
use crate::side::Side;
use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::borrow::Borrow;
use std::cmp;
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;

/// The number of nodes per arena chunk used by `RedBlackSet::new`.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// An ordered set implemented using a red black tree.
///
/// A red black tree is a self-balancing binary search tree where every node is colored red or
/// black. The root is black, a red node never has a red child, and every path from a node down to
/// an absent child crosses the same number of black nodes. Together these keep the longest path
/// at most twice as long as the shortest one.
///
/// Nodes live in an arena and refer to their children and parent through handles, so the parent
/// back-references never own anything.
///
/// # Examples
///
/// ```
/// use balanced_trees::red_black_tree::RedBlackSet;
///
/// let mut set = RedBlackSet::new();
/// assert!(set.insert(0));
/// assert!(set.insert(3));
/// assert!(!set.insert(3));
///
/// assert_eq!(set.len(), 2);
///
/// assert_eq!(set.min(), Some(&0));
/// assert_eq!(set.ceil(&2), Some(&3));
///
/// assert_eq!(set.remove(&0), Some(0));
/// assert_eq!(set.remove(&1), None);
/// ```
pub struct RedBlackSet<T> {
    tree: Tree<T>,
}

impl<T> RedBlackSet<T> {
    /// Constructs a new, empty `RedBlackSet<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = RedBlackSet::new();
    /// ```
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `RedBlackSet<T>` whose node arena grows `chunk_size` nodes at a
    /// time. A chunk size of zero is treated as one.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::with_chunk_size(16);
    /// set.insert(1);
    /// assert!(set.contains(&1));
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        RedBlackSet {
            tree: Tree::new(chunk_size),
        }
    }

    /// Inserts a key into the set. Returns `false` and leaves the set unchanged if an equal key is
    /// already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// assert!(set.insert(1));
    /// assert!(set.contains(&1));
    /// assert!(!set.insert(1));
    /// ```
    pub fn insert(&mut self, key: T) -> bool
    where
        T: Ord,
    {
        self.tree.insert(key)
    }

    /// Removes a key from the set. If the key exists in the set, it will return the removed key.
    /// Otherwise it will return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert_eq!(set.remove(&1), Some(1));
    /// assert_eq!(set.remove(&1), None);
    /// ```
    pub fn remove<V>(&mut self, key: &V) -> Option<T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.remove(key)
    }

    /// Checks if a key exists in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert!(!set.contains(&0));
    /// assert!(set.contains(&1));
    /// ```
    pub fn contains<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.get(key).is_some()
    }

    /// Returns a reference to the key in the set that is equal to a particular key. Returns
    /// `None` if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(String::from("a"));
    /// assert_eq!(set.get("a").map(String::as_str), Some("a"));
    /// assert_eq!(set.get("b"), None);
    /// ```
    pub fn get<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.get(key)
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.tree.arena.len()
    }

    /// Returns `true` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = RedBlackSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.tree.root.is_none()
    }

    /// Clears the set, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(2);
    /// set.clear();
    /// assert_eq!(set.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the height of the tree, counted in nodes. An empty set has height zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(2);
    /// assert_eq!(set.height(), 2);
    /// ```
    pub fn height(&self) -> usize {
        self.tree.height(self.tree.root)
    }

    /// Returns the number of black nodes on every path from the root down to an absent child,
    /// not counting the root itself. An empty set has black-height zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(2);
    /// assert_eq!(set.black_height(), 0);
    ///
    /// set.insert(1);
    /// set.insert(3);
    /// set.insert(4);
    /// assert_eq!(set.black_height(), 1);
    /// ```
    pub fn black_height(&self) -> usize {
        self.tree.black_height()
    }

    /// Returns the color of the root, or `None` if the set is empty. A non-empty set always has a
    /// black root.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::{Color, RedBlackSet};
    ///
    /// let mut set = RedBlackSet::new();
    /// assert_eq!(set.root_color(), None);
    ///
    /// set.insert(1);
    /// set.insert(2);
    /// assert_eq!(set.root_color(), Some(Color::Black));
    /// ```
    pub fn root_color(&self) -> Option<Color> {
        self.tree.root.map(|root| self.tree.node(root).color)
    }

    /// Returns a key in the set that is less than or equal to a particular key. Returns `None` if
    /// such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert_eq!(set.floor(&0), None);
    /// assert_eq!(set.floor(&2), Some(&1));
    /// ```
    pub fn floor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.floor(key)
    }

    /// Returns a key in the set that is greater than or equal to a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert_eq!(set.ceil(&0), Some(&1));
    /// assert_eq!(set.ceil(&2), None);
    /// ```
    pub fn ceil<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.ceil(key)
    }

    /// Returns the minimum key of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(3);
    /// assert_eq!(set.min(), Some(&1));
    /// ```
    pub fn min(&self) -> Option<&T> {
        self.extreme(Side::Left)
    }

    /// Returns the maximum key of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(3);
    /// assert_eq!(set.max(), Some(&3));
    /// ```
    pub fn max(&self) -> Option<&T> {
        self.extreme(Side::Right)
    }

    fn extreme(&self, side: Side) -> Option<&T> {
        self.tree
            .root
            .map(|root| &self.tree.node(self.tree.extreme(root, side)).key)
    }

    /// Returns an iterator over the set. The iterator will yield keys using in-order traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(3);
    /// set.insert(1);
    ///
    /// let mut iterator = set.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> RedBlackSetIter<'_, T> {
        RedBlackSetIter {
            tree: &self.tree,
            current: self.tree.root,
            stack: Vec::new(),
        }
    }

    /// Returns an iterator that yields every key together with its color before the keys of its
    /// subtrees, left subtree first. Useful for inspecting the shape of the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::{Color, RedBlackSet};
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(2);
    /// set.insert(3);
    ///
    /// assert_eq!(
    ///     set.pre_order().collect::<Vec<(&u32, Color)>>(),
    ///     vec![(&2, Color::Black), (&1, Color::Red), (&3, Color::Red)],
    /// );
    /// ```
    pub fn pre_order(&self) -> RedBlackSetPreOrderIter<'_, T> {
        RedBlackSetPreOrderIter {
            tree: &self.tree,
            stack: self.tree.root.into_iter().collect(),
        }
    }

    /// Checks every structural invariant of the tree: a black root, no red node with a red
    /// child, equal black-heights, consistent parent links, strictly ascending keys and no
    /// unreachable nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// for key in &[10, 40, 30, 60, 90, 70, 20, 50, 80] {
    ///     set.insert(*key);
    ///     assert!(set.validate().is_ok());
    /// }
    /// ```
    pub fn validate(&self) -> Result<()>
    where
        T: Ord,
    {
        let len = self.tree.check()?;
        if len != self.len() {
            return Err(Error::LengthMismatch {
                expected: len,
                actual: self.len(),
            });
        }

        let mut prev = None;
        for key in self.iter() {
            if prev.map_or(false, |prev| prev >= key) {
                return Err(Error::Unordered);
            }
            prev = Some(key);
        }
        Ok(())
    }
}

impl<T> IntoIterator for RedBlackSet<T> {
    type IntoIter = RedBlackSetIntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            current: self.tree.root,
            tree: self.tree,
            stack: Vec::new(),
        }
    }
}

impl<'a, T> IntoIterator for &'a RedBlackSet<T>
where
    T: 'a,
{
    type IntoIter = RedBlackSetIter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `RedBlackSet<T>`.
///
/// This iterator traverses the elements of the set in-order and yields owned keys.
pub struct RedBlackSetIntoIter<T> {
    tree: Tree<T>,
    current: Option<Handle>,
    stack: Vec<Handle>,
}

impl<T> Iterator for RedBlackSetIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = self.tree.node(handle).left;
        }
        self.stack.pop().map(|handle| {
            let Node { key, right, .. } = self.tree.arena.free(handle);
            self.current = right;
            key
        })
    }
}

/// An iterator for `RedBlackSet<T>`.
///
/// This iterator traverses the elements of the set in-order and yields immutable references.
pub struct RedBlackSetIter<'a, T> {
    tree: &'a Tree<T>,
    current: Option<Handle>,
    stack: Vec<Handle>,
}

impl<'a, T> Iterator for RedBlackSetIter<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = tree.node(handle).left;
        }
        self.stack.pop().map(|handle| {
            let node = tree.node(handle);
            self.current = node.right;
            &node.key
        })
    }
}

/// A pre-order iterator for `RedBlackSet<T>`.
///
/// This iterator yields a node's key and color before the keys in its left and then right
/// subtree.
pub struct RedBlackSetPreOrderIter<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<Handle>,
}

impl<'a, T> Iterator for RedBlackSetPreOrderIter<'a, T>
where
    T: 'a,
{
    type Item = (&'a T, Color);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.stack.pop().map(|handle| {
            let node = tree.node(handle);
            self.stack.extend(node.right);
            self.stack.extend(node.left);
            (&node.key, node.color)
        })
    }
}

impl<T> Default for RedBlackSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PartialEq for RedBlackSet<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &RedBlackSet<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T> Eq for RedBlackSet<T> where T: Eq {}

impl<T> fmt::Debug for RedBlackSet<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for RedBlackSet<T>
where
    T: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<T> FromIterator<T> for RedBlackSet<T>
where
    T: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut set = RedBlackSet::new();
        set.extend(iter);
        set
    }
}

impl<T> Serialize for RedBlackSet<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for key in self {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

struct RedBlackSetVisitor<T> {
    marker: PhantomData<T>,
}

impl<'de, T> Visitor<'de> for RedBlackSetVisitor<T>
where
    T: Deserialize<'de> + Ord,
{
    type Value = RedBlackSet<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence of keys")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        // The length prefix is untrusted; it may lower the chunk size but never raise it.
        let chunk_size = cmp::min(
            seq.size_hint().unwrap_or(DEFAULT_CHUNK_SIZE),
            DEFAULT_CHUNK_SIZE,
        );
        let mut set = RedBlackSet::with_chunk_size(chunk_size);
        while let Some(key) = seq.next_element()? {
            set.insert(key);
        }
        Ok(set)
    }
}

impl<'de, T> Deserialize<'de> for RedBlackSet<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(RedBlackSetVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RedBlackSet;
    use crate::red_black_tree::Color;
    use serde_test::{assert_de_tokens, assert_tokens, Token};

    #[test]
    fn test_len_empty() {
        let set: RedBlackSet<u32> = RedBlackSet::new();
        assert_eq!(set.len(), 0);
        assert_eq!(set.height(), 0);
        assert_eq!(set.black_height(), 0);
        assert_eq!(set.root_color(), None);
    }

    #[test]
    fn test_is_empty() {
        let set: RedBlackSet<u32> = RedBlackSet::new();
        assert!(set.is_empty());
    }

    #[test]
    fn test_min_max_empty() {
        let set: RedBlackSet<u32> = RedBlackSet::new();
        assert_eq!(set.min(), None);
        assert_eq!(set.max(), None);
    }

    #[test]
    fn test_insert() {
        let mut set = RedBlackSet::new();
        assert!(set.insert(1));
        assert!(set.contains(&1));
        assert_eq!(set.get(&1), Some(&1));
        assert_eq!(set.root_color(), Some(Color::Black));
    }

    #[test]
    fn test_insert_duplicate() {
        let mut set = RedBlackSet::new();
        assert!(set.insert(1));
        assert!(!set.insert(1));
        assert_eq!(set.len(), 1);
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_remove() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        assert_eq!(set.remove(&1), Some(1));
        assert!(!set.contains(&1));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_missing() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        assert_eq!(set.remove(&2), None);
        assert_eq!(set.len(), 1);

        let mut empty: RedBlackSet<u32> = RedBlackSet::new();
        assert_eq!(empty.remove(&2), None);
    }

    #[test]
    fn test_min_max() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        set.insert(3);
        set.insert(5);

        assert_eq!(set.min(), Some(&1));
        assert_eq!(set.max(), Some(&5));
    }

    #[test]
    fn test_floor_ceil() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        set.insert(3);
        set.insert(5);

        assert_eq!(set.floor(&0), None);
        assert_eq!(set.floor(&2), Some(&1));
        assert_eq!(set.floor(&4), Some(&3));
        assert_eq!(set.floor(&6), Some(&5));

        assert_eq!(set.ceil(&0), Some(&1));
        assert_eq!(set.ceil(&2), Some(&3));
        assert_eq!(set.ceil(&4), Some(&5));
        assert_eq!(set.ceil(&6), None);
    }

    #[test]
    fn test_into_iter() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        set.insert(5);
        set.insert(3);

        assert_eq!(set.into_iter().collect::<Vec<u32>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_into_iter_partial() {
        let set: RedBlackSet<String> = (0..20).map(|key| format!("{:02}", key)).collect();
        let mut iter = set.into_iter();
        assert_eq!(iter.next().as_ref().map(String::as_str), Some("00"));
        assert_eq!(iter.next().as_ref().map(String::as_str), Some("01"));
        // remaining keys are dropped with the iterator
    }

    #[test]
    fn test_iter() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        set.insert(5);
        set.insert(3);

        assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&1, &3, &5]);
        assert_eq!(set.iter().count(), 3);
    }

    #[test]
    fn test_pre_order() {
        let set: RedBlackSet<u32> = vec![10, 40, 30, 60, 90, 70, 20, 50, 80].into_iter().collect();
        assert_eq!(
            set.pre_order().map(|(key, _)| *key).collect::<Vec<u32>>(),
            vec![30, 10, 20, 60, 40, 50, 80, 70, 90],
        );
    }

    #[test]
    fn test_clear() {
        let mut set: RedBlackSet<u32> = (0..10).collect();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.iter().next(), None);
        assert!(set.insert(3));
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_with_zero_chunk_size() {
        let mut set = RedBlackSet::with_chunk_size(0);
        for key in 0..10 {
            set.insert(key);
        }
        assert_eq!(set.len(), 10);
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_eq_ignores_shape() {
        let ascending: RedBlackSet<u32> = (0..8).collect();
        let descending: RedBlackSet<u32> = (0..8).rev().collect();
        assert_eq!(ascending, descending);

        let shorter: RedBlackSet<u32> = (0..7).collect();
        assert_ne!(ascending, shorter);
    }

    #[test]
    fn test_debug() {
        let set: RedBlackSet<u32> = vec![3, 1, 2].into_iter().collect();
        assert_eq!(format!("{:?}", set), "{1, 2, 3}");
    }

    #[test]
    fn test_serde() {
        let set: RedBlackSet<u32> = vec![2, 1, 3].into_iter().collect();
        assert_tokens(
            &set,
            &[
                Token::Seq { len: Some(3) },
                Token::U32(1),
                Token::U32(2),
                Token::U32(3),
                Token::SeqEnd,
            ],
        );
    }

    #[test]
    fn test_deserialize_unsorted_with_duplicates() {
        let set: RedBlackSet<u32> = vec![1, 2].into_iter().collect();
        assert_de_tokens(
            &set,
            &[
                Token::Seq { len: Some(3) },
                Token::U32(2),
                Token::U32(1),
                Token::U32(2),
                Token::SeqEnd,
            ],
        );
    }

    #[test]
    fn test_deserialize_oversized_length_prefix() {
        let set: RedBlackSet<u32> = vec![1].into_iter().collect();
        assert_de_tokens(
            &set,
            &[
                Token::Seq { len: Some(1 << 40) },
                Token::U32(1),
                Token::SeqEnd,
            ],
        );
    }
}
