//! Observable heap insert (sift-up) and extract (sift-down).

use algoviz_model::{parent, Heap};

use super::Outcome;
use crate::emitter::{ElementRef, StepEmitter, StepKind};
use crate::error::{Error, Precondition, Result};

/// Append `value` and sift it up to its place.
pub async fn insert(heap: &mut Heap, value: i64, emitter: &mut StepEmitter) -> Result<Outcome> {
    let mut i = heap.append(value);
    emitter.emit(StepKind::Place, [ElementRef::Index(i)], &*heap).await?;

    while i > 0 && heap.outranks(i, parent(i)) {
        let p = parent(i);
        heap.swap(i, p);
        emitter
            .emit(StepKind::Swap, [ElementRef::Index(i), ElementRef::Index(p)], &*heap)
            .await?;
        i = p;
    }

    debug_assert!(heap.check_invariant());
    Ok(Outcome::HeapInserted { value, index: i })
}

/// Remove the root, move the last element up and sift it down.
///
/// Fails with [`Precondition::EmptyStructure`] on an empty heap.
pub async fn extract(heap: &mut Heap, emitter: &mut StepEmitter) -> Result<Outcome> {
    let Some(value) = heap.take_root() else {
        return Err(Error::MissingPrecondition {
            algorithm: "heap_extract",
            missing: Precondition::EmptyStructure,
        });
    };

    if heap.is_empty() {
        emitter.emit(StepKind::Place, [], &*heap).await?;
        return Ok(Outcome::Extracted { value });
    }

    emitter.emit(StepKind::Place, [ElementRef::Index(0)], &*heap).await?;
    let mut i = 0;
    while let Some(child) = heap.preferred_child(i) {
        if !heap.outranks(child, i) {
            break;
        }
        heap.swap(i, child);
        emitter
            .emit(StepKind::Swap, [ElementRef::Index(i), ElementRef::Index(child)], &*heap)
            .await?;
        i = child;
    }

    debug_assert!(heap.check_invariant());
    Ok(Outcome::Extracted { value })
}
