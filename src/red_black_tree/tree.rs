use crate::arena::{Handle, TypedArena};
use crate::error::{Error, Result};
use crate::red_black_tree::node::{Color, Node};
use crate::side::Side;
use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::mem;

/// The nodes of a red black tree together with the handle of its root.
pub struct Tree<T> {
    pub arena: TypedArena<Node<T>>,
    pub root: Option<Handle>,
}

impl<T> Tree<T> {
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            arena: TypedArena::new(chunk_size),
            root: None,
        }
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    pub fn node(&self, handle: Handle) -> &Node<T> {
        &self.arena[handle]
    }

    fn node_mut(&mut self, handle: Handle) -> &mut Node<T> {
        &mut self.arena[handle]
    }

    pub fn child(&self, handle: Handle, side: Side) -> Option<Handle> {
        self.node(handle).child(side)
    }

    fn parent_of(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).parent
    }

    fn color_of(&self, tree: Option<Handle>) -> Color {
        match tree {
            None => Color::Black,
            Some(handle) => self.node(handle).color,
        }
    }

    fn is_red(&self, tree: Option<Handle>) -> bool {
        self.color_of(tree) == Color::Red
    }

    fn set_color(&mut self, tree: Option<Handle>, color: Color) {
        if let Some(handle) = tree {
            self.node_mut(handle).color = color;
        }
    }

    // precondition: `child` is a child of `parent`
    fn side_of(&self, parent: Handle, child: Handle) -> Side {
        if self.node(parent).left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    // Points whatever referenced `old` (its parent's child slot, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_of(parent, old);
                *self.node_mut(parent).child_mut(side) = new;
            },
        }
    }

    // Moves `node` down toward `side`; its child on the opposite side takes its place.
    fn rotate(&mut self, node: Handle, side: Side) {
        let child = self
            .child(node, side.opposite())
            .expect("Expected a child node to rotate into place.");

        let inner = self.child(child, side);
        *self.node_mut(node).child_mut(side.opposite()) = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(node);
        }

        let parent = self.parent_of(node);
        self.node_mut(child).parent = parent;
        self.replace_child(parent, node, Some(child));

        *self.node_mut(child).child_mut(side) = Some(node);
        self.node_mut(node).parent = Some(child);
    }

    pub fn extreme(&self, mut handle: Handle, side: Side) -> Handle {
        while let Some(child) = self.child(handle, side) {
            handle = child;
        }
        handle
    }

    fn find<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = self.node(handle);
            match key.cmp(node.key.borrow()) {
                Ordering::Less => curr = node.left,
                Ordering::Greater => curr = node.right,
                Ordering::Equal => return Some(handle),
            }
        }
        None
    }

    pub fn insert(&mut self, key: T) -> bool
    where
        T: Ord,
    {
        let mut parent = None;
        let mut side = Side::Left;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = self.node(handle);
            side = match key.cmp(&node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return false,
            };
            parent = Some(handle);
            curr = node.child(side);
        }

        let new_node = self.arena.allocate(Node::new(key, parent));
        match parent {
            None => self.root = Some(new_node),
            Some(parent) => *self.node_mut(parent).child_mut(side) = Some(new_node),
        }
        self.insert_fix_up(new_node);
        true
    }

    fn insert_fix_up(&mut self, mut node: Handle) {
        while let Some(mut parent) = self
            .parent_of(node)
            .filter(|&parent| self.is_red(Some(parent)))
        {
            // a red node is never the root
            let grandparent = self
                .parent_of(parent)
                .expect("Expected a red node to have a parent.");
            let parent_side = self.side_of(grandparent, parent);
            let uncle = self.child(grandparent, parent_side.opposite());

            if self.is_red(uncle) {
                trace!("rb insert fix-up: red uncle, recoloring");
                self.set_color(Some(parent), Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(Some(grandparent), Color::Red);
                node = grandparent;
                continue;
            }

            if self.side_of(parent, node) != parent_side {
                trace!("rb insert fix-up: black uncle, inner child");
                self.rotate(parent, parent_side);
                node = parent;
                parent = self
                    .parent_of(node)
                    .expect("Expected a rotated node to have a parent.");
            }

            trace!("rb insert fix-up: black uncle, outer child");
            self.set_color(Some(parent), Color::Black);
            self.set_color(Some(grandparent), Color::Red);
            self.rotate(grandparent, parent_side.opposite());
        }

        self.set_color(self.root, Color::Black);
    }

    pub fn remove<V>(&mut self, key: &V) -> Option<T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let target = self.find(key)?;

        // a node with two children keeps its place and takes its successor's key instead
        let victim = match (self.node(target).left, self.node(target).right) {
            (Some(_), Some(right)) => self.extreme(right, Side::Left),
            _ => target,
        };

        let (color, replacement) = {
            let node = self.node(victim);
            (node.color, node.left.or(node.right))
        };
        let parent = self.parent_of(victim);

        match (replacement, parent) {
            (Some(child), _) => {
                self.node_mut(child).parent = parent;
                self.replace_child(parent, victim, Some(child));
                if color == Color::Black {
                    self.delete_fix_up(child);
                }
            },
            (None, None) => self.root = None,
            (None, Some(_)) => {
                // the victim stands in for the absent child while the tree is repaired
                if color == Color::Black {
                    self.delete_fix_up(victim);
                }
                let parent = self.parent_of(victim);
                self.replace_child(parent, victim, None);
            },
        }

        let Node { key: removed, .. } = self.arena.free(victim);
        if victim == target {
            Some(removed)
        } else {
            Some(mem::replace(&mut self.node_mut(target).key, removed))
        }
    }

    fn delete_fix_up(&mut self, mut node: Handle) {
        while Some(node) != self.root && !self.is_red(Some(node)) {
            let parent = self
                .parent_of(node)
                .expect("Expected a non-root node to have a parent.");
            let side = self.side_of(parent, node);
            let mut sibling = self.child(parent, side.opposite());

            if self.is_red(sibling) {
                trace!("rb delete fix-up: red sibling");
                self.set_color(sibling, Color::Black);
                self.set_color(Some(parent), Color::Red);
                self.rotate(parent, side);
                sibling = self.child(parent, side.opposite());
            }

            let near = sibling.and_then(|sibling| self.child(sibling, side));
            let far = sibling.and_then(|sibling| self.child(sibling, side.opposite()));

            if !self.is_red(near) && !self.is_red(far) {
                trace!("rb delete fix-up: black sibling, black nephews");
                self.set_color(sibling, Color::Red);
                node = parent;
                continue;
            }

            if !self.is_red(far) {
                trace!("rb delete fix-up: black sibling, red near nephew");
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(
                    sibling.expect("Expected a sibling with a red child."),
                    side.opposite(),
                );
                sibling = self.child(parent, side.opposite());
            }

            trace!("rb delete fix-up: black sibling, red far nephew");
            let parent_color = self.color_of(Some(parent));
            self.set_color(sibling, parent_color);
            self.set_color(Some(parent), Color::Black);
            let far = sibling.and_then(|sibling| self.child(sibling, side.opposite()));
            self.set_color(far, Color::Black);
            self.rotate(parent, side);
            node = self.root.expect("Expected a non-empty tree.");
        }

        self.set_color(Some(node), Color::Black);
    }

    pub fn get<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.find(key).map(|handle| &self.node(handle).key)
    }

    pub fn floor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut best = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = self.node(handle);
            match key.cmp(node.key.borrow()) {
                Ordering::Less => curr = node.left,
                Ordering::Greater => {
                    best = Some(&node.key);
                    curr = node.right;
                },
                Ordering::Equal => return Some(&node.key),
            }
        }
        best
    }

    pub fn ceil<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut best = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = self.node(handle);
            match key.cmp(node.key.borrow()) {
                Ordering::Greater => curr = node.right,
                Ordering::Less => {
                    best = Some(&node.key);
                    curr = node.left;
                },
                Ordering::Equal => return Some(&node.key),
            }
        }
        best
    }

    pub fn height(&self, tree: Option<Handle>) -> usize {
        match tree {
            None => 0,
            Some(handle) => {
                let node = self.node(handle);
                cmp::max(self.height(node.left), self.height(node.right)) + 1
            },
        }
    }

    // Counts the black nodes on the leftmost path below the root.
    pub fn black_height(&self) -> usize {
        let mut count = 0;
        let mut curr = self.root.and_then(|root| self.node(root).left);
        while let Some(handle) = curr {
            let node = self.node(handle);
            if node.color == Color::Black {
                count += 1;
            }
            curr = node.left;
        }
        count
    }

    // Returns the black-height (root included) and node count of a valid subtree.
    fn check_subtree(&self, tree: Option<Handle>, parent: Option<Handle>) -> Result<(usize, usize)> {
        let handle = match tree {
            None => return Ok((0, 0)),
            Some(handle) => handle,
        };
        let node = self.node(handle);

        if node.parent != parent {
            return Err(Error::BrokenParentLink);
        }
        if node.color == Color::Red && (self.is_red(node.left) || self.is_red(node.right)) {
            return Err(Error::RedViolation);
        }

        let (left, left_len) = self.check_subtree(node.left, tree)?;
        let (right, right_len) = self.check_subtree(node.right, tree)?;
        if left != right {
            return Err(Error::BlackHeightMismatch { left, right });
        }

        let own = match node.color {
            Color::Black => 1,
            Color::Red => 0,
        };
        Ok((left + own, left_len + right_len + 1))
    }

    // Checks colors, black-heights and parent links. Returns the number of reachable nodes.
    pub fn check(&self) -> Result<usize> {
        if self.is_red(self.root) {
            return Err(Error::RedRoot);
        }
        self.check_subtree(self.root, None).map(|(_, len)| len)
    }
}
