//! N-Queens by row-by-row backtracking.

use algoviz_model::{Board, Coord};
use futures::future::{BoxFuture, FutureExt};

use super::Outcome;
use crate::emitter::{ElementRef, StepEmitter, StepKind};
use crate::error::Result;

/// Clear the board and search for the first solution, trying columns left to
/// right in every row.
pub async fn solve(board: &mut Board, emitter: &mut StepEmitter) -> Result<Outcome> {
    board.clear();
    if place_row(board, 0, emitter).await? {
        debug_assert!(board.is_solved());
        Ok(Outcome::Solved {
            queens: board.queens(),
        })
    } else {
        Ok(Outcome::NoSolution { size: board.size() })
    }
}

fn place_row<'a>(board: &'a mut Board, row: usize, emitter: &'a mut StepEmitter) -> BoxFuture<'a, Result<bool>> {
    async move {
        if row == board.size() {
            return Ok(true);
        }
        for col in 0..board.size() {
            let at = Coord::new(row, col);
            if !board.is_safe(at) {
                continue;
            }
            board.place(at)?;
            emitter.emit(StepKind::Place, [ElementRef::Cell(at)], &*board).await?;
            if place_row(board, row + 1, emitter).await? {
                return Ok(true);
            }
            board.remove(at)?;
            emitter.emit(StepKind::Visit, [ElementRef::Cell(at)], &*board).await?;
        }
        Ok(false)
    }
    .boxed()
}
