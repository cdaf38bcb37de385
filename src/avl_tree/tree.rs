use crate::avl_tree::node::Node;
use crate::error::{Error, Result};
use crate::side::Side;
use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::mem;

pub type Tree<T> = Option<Box<Node<T>>>;

pub fn height<T>(tree: &Tree<T>) -> usize {
    match tree {
        None => 0,
        Some(ref node) => node.height,
    }
}

// Moves `node` down toward `side`; its child on the opposite side takes its place.
fn rotate<T>(mut node: Box<Node<T>>, side: Side) -> Box<Node<T>> {
    let mut child = node
        .child_mut(side.opposite())
        .take()
        .expect("Expected a child node to rotate into place.");
    *node.child_mut(side.opposite()) = child.child_mut(side).take();
    node.update();
    *child.child_mut(side) = Some(node);
    child.update();
    child
}

fn balance<T>(tree: &mut Tree<T>) {
    let mut node = match tree.take() {
        Some(node) => node,
        None => return,
    };

    node.update();

    let heavy = match node.balance() {
        balance if balance > 1 => Side::Left,
        balance if balance < -1 => Side::Right,
        _ => {
            *tree = Some(node);
            return;
        },
    };

    if let Some(mut child) = node.child_mut(heavy).take() {
        let outer = height(child.child(heavy));
        let inner = height(child.child(heavy.opposite()));
        let case = match (heavy, inner > outer) {
            (Side::Left, false) => "LL",
            (Side::Left, true) => "LR",
            (Side::Right, false) => "RR",
            (Side::Right, true) => "RL",
        };
        trace!("avl rebalance: {} case", case);
        if inner > outer {
            child = rotate(child, heavy);
        }
        *node.child_mut(heavy) = Some(child);
    }

    *tree = Some(rotate(node, heavy.opposite()));
}

// precondition: the tree is not empty
fn remove_min<T>(tree: &mut Tree<T>) -> T {
    let mut node = tree.take().expect("Expected a non-empty tree.");
    if node.left.is_some() {
        let ret = remove_min(&mut node.left);
        *tree = Some(node);
        balance(tree);
        ret
    } else {
        *tree = node.right.take();
        node.key
    }
}

pub fn insert<T>(tree: &mut Tree<T>, key: T) -> bool
where
    T: Ord,
{
    let inserted = match tree {
        Some(ref mut node) => match key.cmp(&node.key) {
            Ordering::Less => insert(&mut node.left, key),
            Ordering::Greater => insert(&mut node.right, key),
            Ordering::Equal => return false,
        },
        None => {
            *tree = Some(Box::new(Node::new(key)));
            return true;
        },
    };

    if inserted {
        balance(tree);
    }
    inserted
}

pub fn remove<T, V>(tree: &mut Tree<T>, key: &V) -> Option<T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut node = tree.take()?;
    let ret = match key.cmp(node.key.borrow()) {
        Ordering::Less => remove(&mut node.left, key),
        Ordering::Greater => remove(&mut node.right, key),
        Ordering::Equal => {
            if node.left.is_some() && node.right.is_some() {
                let successor = remove_min(&mut node.right);
                Some(mem::replace(&mut node.key, successor))
            } else {
                let Node {
                    key, left, right, ..
                } = *node;
                *tree = left.or(right);
                return Some(key);
            }
        },
    };

    *tree = Some(node);
    if ret.is_some() {
        balance(tree);
    }
    ret
}

pub fn get<'a, T, V>(tree: &'a Tree<T>, key: &V) -> Option<&'a T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut curr = tree;
    while let Some(ref node) = curr {
        match key.cmp(node.key.borrow()) {
            Ordering::Less => curr = &node.left,
            Ordering::Greater => curr = &node.right,
            Ordering::Equal => return Some(&node.key),
        }
    }
    None
}

pub fn ceil<'a, T, V>(tree: &'a Tree<T>, key: &V) -> Option<&'a T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    tree.as_ref().and_then(|node| match key.cmp(node.key.borrow()) {
        Ordering::Greater => ceil(&node.right, key),
        Ordering::Less => match ceil(&node.left, key) {
            None => Some(&node.key),
            res => res,
        },
        Ordering::Equal => Some(&node.key),
    })
}

pub fn floor<'a, T, V>(tree: &'a Tree<T>, key: &V) -> Option<&'a T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    tree.as_ref().and_then(|node| match key.cmp(node.key.borrow()) {
        Ordering::Less => floor(&node.left, key),
        Ordering::Greater => match floor(&node.right, key) {
            None => Some(&node.key),
            res => res,
        },
        Ordering::Equal => Some(&node.key),
    })
}

pub fn extreme<T>(tree: &Tree<T>, side: Side) -> Option<&T> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref child) = curr.child(side) {
            curr = child;
        }
        &curr.key
    })
}

// Checks stored heights and balance factors. Returns the height and node count of the subtree.
pub fn check<T>(tree: &Tree<T>) -> Result<(usize, usize)> {
    match tree {
        None => Ok((0, 0)),
        Some(ref node) => {
            let (left_height, left_len) = check(&node.left)?;
            let (right_height, right_len) = check(&node.right)?;

            let expected = cmp::max(left_height, right_height) + 1;
            if node.height != expected {
                return Err(Error::StaleHeight {
                    expected,
                    actual: node.height,
                });
            }

            let balance = left_height as isize - right_height as isize;
            if balance.abs() > 1 {
                return Err(Error::Unbalanced { balance });
            }

            Ok((expected, left_len + right_len + 1))
        },
    }
}
