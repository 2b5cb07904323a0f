//! Binary search tree insert, search and in-order traversal.

use algoviz_model::{BinaryTree, Side, TreeNode};
use futures::future::{BoxFuture, FutureExt};

use super::Outcome;
use crate::emitter::{ElementRef, StepEmitter, StepKind};
use crate::error::Result;

fn direction(value: i64, node: &TreeNode) -> Side {
    if value < node.value {
        Side::Left
    } else {
        Side::Right
    }
}

/// Descend to the empty slot for `value` and attach it there.
///
/// A key that is already present yields [`Outcome::DuplicateKey`] and leaves
/// the tree untouched.
pub async fn insert(tree: &mut BinaryTree, value: i64, emitter: &mut StepEmitter) -> Result<Outcome> {
    let mut path = Vec::new();
    let mut current = tree.root();
    while let Some(node) = current {
        emitter.emit(StepKind::Visit, [ElementRef::Key(node.value)], &*tree).await?;
        if node.value == value {
            return Ok(Outcome::DuplicateKey { value });
        }
        let side = direction(value, node);
        path.push(side);
        current = node.child(side);
    }

    tree.attach(&path, value)?;
    emitter.emit(StepKind::Place, [ElementRef::Key(value)], &*tree).await?;
    Ok(Outcome::Inserted { value })
}

/// Descend towards `value`, reporting the keys visited on the way.
pub async fn search(tree: &BinaryTree, value: i64, emitter: &mut StepEmitter) -> Result<Outcome> {
    let mut path = Vec::new();
    let mut current = tree.root();
    while let Some(node) = current {
        path.push(node.value);
        emitter.emit(StepKind::Visit, [ElementRef::Key(node.value)], tree).await?;
        if node.value == value {
            return Ok(Outcome::Found { path });
        }
        current = node.child(direction(value, node));
    }
    Ok(Outcome::NotFound { value })
}

/// Visit every node in ascending key order.
pub async fn in_order(tree: &BinaryTree, emitter: &mut StepEmitter) -> Result<Outcome> {
    let mut values = Vec::with_capacity(tree.len());
    walk(tree.root(), tree, emitter, &mut values).await?;
    Ok(Outcome::Traversed { values })
}

fn walk<'a>(
    node: Option<&'a TreeNode>,
    tree: &'a BinaryTree,
    emitter: &'a mut StepEmitter,
    out: &'a mut Vec<i64>,
) -> BoxFuture<'a, Result<()>> {
    async move {
        let Some(node) = node else {
            return Ok(());
        };
        walk(node.left.as_deref(), tree, emitter, out).await?;
        out.push(node.value);
        emitter.emit(StepKind::Visit, [ElementRef::Key(node.value)], tree).await?;
        walk(node.right.as_deref(), tree, emitter, out).await
    }
    .boxed()
}
