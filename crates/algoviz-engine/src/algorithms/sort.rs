//! Sorting family over a [`Sequence`].
//!
//! All three sort ascending in place. Indices highlighted by each step refer
//! to positions in the sequence at the moment the step was emitted.

use algoviz_model::Sequence;
use futures::future::{BoxFuture, FutureExt};

use crate::emitter::{ElementRef, StepEmitter, StepKind};
use crate::error::Result;

fn pair(i: usize, j: usize) -> [ElementRef; 2] {
    [ElementRef::Index(i), ElementRef::Index(j)]
}

/// Adjacent compare-and-swap passes. Stops after a pass with no exchange.
pub async fn bubble_sort(seq: &mut Sequence, emitter: &mut StepEmitter) -> Result<()> {
    let n = seq.len();
    for pass in 0..n.saturating_sub(1) {
        let mut swapped = false;
        for j in 0..n - 1 - pass {
            emitter.emit(StepKind::Compare, pair(j, j + 1), &*seq).await?;
            if seq.values()[j] > seq.values()[j + 1] {
                seq.swap(j, j + 1);
                swapped = true;
                emitter.emit(StepKind::Swap, pair(j, j + 1), &*seq).await?;
            }
        }
        if !swapped {
            break;
        }
    }
    debug_assert!(seq.is_sorted());
    Ok(())
}

/// Lomuto quicksort with the rightmost element as pivot.
pub async fn quick_sort(seq: &mut Sequence, emitter: &mut StepEmitter) -> Result<()> {
    if seq.len() > 1 {
        let hi = seq.len() - 1;
        quick_sort_range(seq, 0, hi, emitter).await?;
    }
    debug_assert!(seq.is_sorted());
    Ok(())
}

fn quick_sort_range<'a>(
    seq: &'a mut Sequence,
    lo: usize,
    hi: usize,
    emitter: &'a mut StepEmitter,
) -> BoxFuture<'a, Result<()>> {
    async move {
        if lo >= hi {
            return Ok(());
        }
        let p = partition(seq, lo, hi, emitter).await?;
        if p > lo {
            quick_sort_range(seq, lo, p - 1, emitter).await?;
        }
        quick_sort_range(seq, p + 1, hi, emitter).await
    }
    .boxed()
}

async fn partition(seq: &mut Sequence, lo: usize, hi: usize, emitter: &mut StepEmitter) -> Result<usize> {
    let pivot = seq.values()[hi];
    let mut i = lo;
    for j in lo..hi {
        emitter.emit(StepKind::Compare, pair(j, hi), &*seq).await?;
        if seq.values()[j] < pivot {
            // Exchanging a position with itself is not shown.
            if i != j {
                seq.swap(i, j);
                emitter.emit(StepKind::Swap, pair(i, j), &*seq).await?;
            }
            i += 1;
        }
    }
    if i != hi {
        seq.swap(i, hi);
        emitter.emit(StepKind::Swap, pair(i, hi), &*seq).await?;
    }
    Ok(i)
}

/// Top-down merge sort. Every element written back is a `place` step.
///
/// A merge overwrites positions instead of exchanging them, so these writes
/// stand in for swaps on screen but are counted in `placements`; `swaps`
/// stays zero for merge sort.
pub async fn merge_sort(seq: &mut Sequence, emitter: &mut StepEmitter) -> Result<()> {
    if seq.len() > 1 {
        let hi = seq.len() - 1;
        merge_sort_range(seq, 0, hi, emitter).await?;
    }
    debug_assert!(seq.is_sorted());
    Ok(())
}

fn merge_sort_range<'a>(
    seq: &'a mut Sequence,
    lo: usize,
    hi: usize,
    emitter: &'a mut StepEmitter,
) -> BoxFuture<'a, Result<()>> {
    async move {
        if lo >= hi {
            return Ok(());
        }
        let mid = (lo + hi) / 2;
        merge_sort_range(seq, lo, mid, emitter).await?;
        merge_sort_range(seq, mid + 1, hi, emitter).await?;
        merge(seq, lo, mid, hi, emitter).await
    }
    .boxed()
}

async fn merge(seq: &mut Sequence, lo: usize, mid: usize, hi: usize, emitter: &mut StepEmitter) -> Result<()> {
    let left = seq.slice_to_vec(lo..mid + 1);
    let right = seq.slice_to_vec(mid + 1..hi + 1);
    let (mut i, mut j, mut k) = (0, 0, lo);

    while i < left.len() && j < right.len() {
        emitter.emit(StepKind::Compare, pair(k, mid + 1 + j), &*seq).await?;
        // `<=` keeps equal elements in their original order.
        let value = if left[i] <= right[j] {
            i += 1;
            left[i - 1]
        } else {
            j += 1;
            right[j - 1]
        };
        seq.put(k, value);
        emitter.emit(StepKind::Place, [ElementRef::Index(k)], &*seq).await?;
        k += 1;
    }

    for &value in left[i..].iter().chain(&right[j..]) {
        seq.put(k, value);
        emitter.emit(StepKind::Place, [ElementRef::Index(k)], &*seq).await?;
        k += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::emitter::{RunControl, Step};
    use std::time::Duration;

    fn recording() -> (Arc<Mutex<Vec<Step>>>, StepEmitter) {
        let steps = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&steps);
        let emitter = StepEmitter::new(RunControl::new(Duration::ZERO), move |step: Step| {
            sink.lock().unwrap().push(step)
        });
        (steps, emitter)
    }

    #[tokio::test]
    async fn bubble_sort_scenario() {
        let mut seq = Sequence::from_values(vec![5, 1, 4]);
        let (steps, mut emitter) = recording();
        bubble_sort(&mut seq, &mut emitter).await.unwrap();

        assert_eq!(seq.values(), &[1, 4, 5]);
        let kinds: Vec<_> = steps.lock().unwrap().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::Compare,
                StepKind::Swap,
                StepKind::Compare,
                StepKind::Swap,
                StepKind::Compare,
            ]
        );
        let stats = emitter.stats();
        assert_eq!((stats.comparisons, stats.swaps), (3, 2));
    }

    #[tokio::test]
    async fn bubble_sort_exits_early_on_sorted_input() {
        let mut seq = Sequence::from_values(vec![1, 2, 3, 4, 5]);
        let mut emitter = StepEmitter::unpaced();
        bubble_sort(&mut seq, &mut emitter).await.unwrap();
        assert_eq!(emitter.stats().comparisons, 4);
        assert_eq!(emitter.stats().swaps, 0);
    }

    #[tokio::test]
    async fn quick_sort_handles_duplicates() {
        let mut seq = Sequence::from_values(vec![3, 1, 3, 2, 1, 3]);
        let mut emitter = StepEmitter::unpaced();
        quick_sort(&mut seq, &mut emitter).await.unwrap();
        assert_eq!(seq.values(), &[1, 1, 2, 3, 3, 3]);
    }

    #[tokio::test]
    async fn quick_sort_never_shows_self_swaps() {
        let mut seq = Sequence::from_values(vec![1, 2, 3, 4]);
        let (steps, mut emitter) = recording();
        quick_sort(&mut seq, &mut emitter).await.unwrap();
        for step in steps.lock().unwrap().iter().filter(|s| s.kind == StepKind::Swap) {
            assert_ne!(step.highlight[0], step.highlight[1]);
        }
        assert_eq!(emitter.stats().swaps, 0);
    }

    #[tokio::test]
    async fn merge_sort_places_every_element_per_merge() {
        let mut seq = Sequence::from_values(vec![4, 3, 2, 1]);
        let mut emitter = StepEmitter::unpaced();
        merge_sort(&mut seq, &mut emitter).await.unwrap();
        assert_eq!(seq.values(), &[1, 2, 3, 4]);
        // Two merges of 2 and one merge of 4.
        assert_eq!(emitter.stats().placements, 8);
        assert_eq!(emitter.stats().swaps, 0);
        assert_eq!(emitter.stats().comparisons, 4);
    }

    #[tokio::test]
    async fn trivial_inputs_emit_nothing() {
        for values in [vec![], vec![7]] {
            let mut seq = Sequence::from_values(values);
            let mut emitter = StepEmitter::unpaced();
            bubble_sort(&mut seq, &mut emitter).await.unwrap();
            quick_sort(&mut seq, &mut emitter).await.unwrap();
            merge_sort(&mut seq, &mut emitter).await.unwrap();
            assert_eq!(emitter.stats().steps, 0);
        }
    }
}
