//! Binary search tree with derived canvas layout.
//!
//! Children are exclusively owned by their parent. Keys are unique: inserting
//! a key that is already present is rejected rather than descending forever or
//! silently going right. A tree holds at most [`MAX_KEYS`] keys, which bounds
//! the depth of the recursive walks below.
//!
//! # Layout
//!
//! After every structural change each node gets a position:
//! - `y = level * LEVEL_SPACING + TOP_MARGIN`, root at level 1
//! - `x` is the midpoint of the node's horizontal band, starting from `[0, width]`
//! - with `scale = max(width / 2^height, MIN_SCALE)`, the left child gets
//!   `[left, mid - scale/4]` and the right child `[mid + scale/4, right]`

use crate::error::{MutationError, Result};
use crate::Point;

/// Vertical distance between tree levels.
pub const LEVEL_SPACING: f64 = 80.0;

/// Offset of the first level from the top of the canvas.
pub const TOP_MARGIN: f64 = 50.0;

/// Lower bound on the horizontal scale so deep trees stay readable.
pub const MIN_SCALE: f64 = 50.0;

/// Default canvas width used for layout.
pub const DEFAULT_WIDTH: f64 = 800.0;

/// Most keys a tree accepts.
pub const MAX_KEYS: usize = 256;

/// Which child to follow from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
}

/// One node of the search tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeNode {
    pub value: i64,
    pub left: Option<Box<TreeNode>>,
    pub right: Option<Box<TreeNode>>,
    /// Derived; recomputed by [`BinaryTree`] after every structural change.
    pub position: Point,
}

impl TreeNode {
    fn leaf(value: i64) -> Self {
        Self {
            value,
            left: None,
            right: None,
            position: Point::ORIGIN,
        }
    }

    /// Child on the given side.
    pub fn child(&self, side: Side) -> Option<&TreeNode> {
        match side {
            Side::Left => self.left.as_deref(),
            Side::Right => self.right.as_deref(),
        }
    }

    fn child_slot_mut(&mut self, side: Side) -> &mut Option<Box<TreeNode>> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// A binary search tree owning its root.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryTree {
    root: Option<Box<TreeNode>>,
    width: f64,
}

impl Default for BinaryTree {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl BinaryTree {
    /// Create an empty tree laid out on a canvas of `width`.
    pub fn new(width: f64) -> Self {
        Self { root: None, width }
    }

    /// Root node, if any.
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_deref()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        fn count(node: Option<&TreeNode>) -> usize {
            node.map_or(0, |n| 1 + count(n.left.as_deref()) + count(n.right.as_deref()))
        }
        count(self.root())
    }

    /// Number of levels (0 for an empty tree).
    pub fn height(&self) -> usize {
        fn depth(node: Option<&TreeNode>) -> usize {
            node.map_or(0, |n| 1 + depth(n.left.as_deref()).max(depth(n.right.as_deref())))
        }
        depth(self.root())
    }

    /// Whether `value` is stored in the tree.
    pub fn contains(&self, value: i64) -> bool {
        let mut current = self.root();
        while let Some(node) = current {
            if value == node.value {
                return true;
            }
            current = node.child(if value < node.value { Side::Left } else { Side::Right });
        }
        false
    }

    /// Node reached by following `path` from the root.
    pub fn node_at(&self, path: &[Side]) -> Option<&TreeNode> {
        let mut current = self.root()?;
        for &side in path {
            current = current.child(side)?;
        }
        Some(current)
    }

    /// Insert `value` without animation (user edit).
    pub fn insert(&mut self, value: i64) -> Result<()> {
        let mut path = Vec::new();
        let mut current = self.root();
        while let Some(node) = current {
            if value == node.value {
                return Err(MutationError::DuplicateKey(value));
            }
            let side = if value < node.value { Side::Left } else { Side::Right };
            path.push(side);
            current = node.child(side);
        }
        self.attach(&path, value)
    }

    /// Attach a new leaf at the empty slot reached by `path`.
    ///
    /// Used by the animated insert once its descent has found the slot. The
    /// caller is responsible for the path respecting the search order.
    pub fn attach(&mut self, path: &[Side], value: i64) -> Result<()> {
        if self.len() >= MAX_KEYS {
            return Err(MutationError::TreeFull(MAX_KEYS));
        }

        fn slot_at<'a>(
            slot: &'a mut Option<Box<TreeNode>>,
            path: &[Side],
        ) -> Option<&'a mut Option<Box<TreeNode>>> {
            match path.split_first() {
                None => Some(slot),
                Some((&side, rest)) => match slot {
                    Some(node) => slot_at(node.child_slot_mut(side), rest),
                    None => None,
                },
            }
        }

        let slot = slot_at(&mut self.root, path)
            .ok_or(MutationError::InvalidParameter("path leaves the tree"))?;
        if let Some(existing) = slot.as_deref() {
            return Err(MutationError::DuplicateKey(existing.value));
        }
        *slot = Some(Box::new(TreeNode::leaf(value)));
        self.layout();
        Ok(())
    }

    /// Values in ascending (in-order) order.
    pub fn in_order(&self) -> Vec<i64> {
        fn walk(node: Option<&TreeNode>, out: &mut Vec<i64>) {
            if let Some(n) = node {
                walk(n.left.as_deref(), out);
                out.push(n.value);
                walk(n.right.as_deref(), out);
            }
        }
        let mut out = Vec::with_capacity(self.len());
        walk(self.root(), &mut out);
        out
    }

    /// Remove every node.
    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Recompute every node position.
    pub fn layout(&mut self) {
        let height = self.height();
        let scale = (self.width / 2f64.powi(height as i32)).max(MIN_SCALE);
        let width = self.width;

        fn place(node: &mut TreeNode, level: usize, left: f64, right: f64, scale: f64) {
            let mid = left + (right - left) / 2.0;
            node.position = Point::new(
                mid.max(scale / 2.0),
                level as f64 * LEVEL_SPACING + TOP_MARGIN,
            );
            if let Some(child) = node.left.as_deref_mut() {
                place(child, level + 1, left, mid - scale / 4.0, scale);
            }
            if let Some(child) = node.right.as_deref_mut() {
                place(child, level + 1, mid + scale / 4.0, right, scale);
            }
        }

        if let Some(root) = self.root.as_deref_mut() {
            place(root, 1, 0.0, width, scale);
        }
    }
}
