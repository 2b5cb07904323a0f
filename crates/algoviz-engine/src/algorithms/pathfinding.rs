//! Dijkstra's shortest path on a grid with unit edge weights.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use algoviz_model::{Coord, Grid};

use super::{Outcome, Path};
use crate::emitter::{ElementRef, StepEmitter, StepKind};
use crate::error::Result;

/// Settle cells in distance order from `start` until `end` is reached.
///
/// Settled cells are marked visited; on success the path is marked cell by
/// cell from start to end. Marks from a previous search are cleared first.
pub async fn dijkstra(grid: &mut Grid, start: Coord, end: Coord, emitter: &mut StepEmitter) -> Result<Outcome> {
    grid.clear_search();

    let cells = grid.rows() * grid.cols();
    let mut dist = vec![usize::MAX; cells];
    let mut prev: Vec<Option<usize>> = vec![None; cells];
    let mut settled = vec![false; cells];

    // (distance, insertion order, cell): equal distances settle first-in first.
    let mut frontier = BinaryHeap::new();
    let mut inserted: u64 = 0;
    let source = grid.index(start);
    dist[source] = 0;
    frontier.push(Reverse((0, inserted, source)));

    while let Some(Reverse((d, _, idx))) = frontier.pop() {
        if settled[idx] {
            continue;
        }
        settled[idx] = true;

        let at = grid.coord(idx);
        grid.mark_visited(at);
        emitter.emit(StepKind::Visit, [ElementRef::Cell(at)], &*grid).await?;

        if at == end {
            let path = reconstruct(grid, &prev, idx);
            for &cell in &path {
                grid.mark_path(cell);
                emitter.emit(StepKind::Place, [ElementRef::Cell(cell)], &*grid).await?;
            }
            debug_assert_eq!(path.len(), d + 1);
            return Ok(Outcome::PathFound { path: Path::Cells(path) });
        }

        for next in grid.neighbors(at) {
            let n = grid.index(next);
            if !settled[n] && d + 1 < dist[n] {
                dist[n] = d + 1;
                prev[n] = Some(idx);
                inserted += 1;
                frontier.push(Reverse((d + 1, inserted, n)));
            }
        }
    }

    Ok(Outcome::NoPath)
}

fn reconstruct(grid: &Grid, prev: &[Option<usize>], end: usize) -> Vec<Coord> {
    let mut path = vec![grid.coord(end)];
    let mut idx = end;
    while let Some(p) = prev[idx] {
        path.push(grid.coord(p));
        idx = p;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_model::CellRole;

    fn open_grid(rows: usize, cols: usize) -> Grid {
        let mut grid = Grid::new(rows, cols);
        grid.set_start(Coord::new(0, 0)).unwrap();
        grid.set_end(Coord::new(rows - 1, cols - 1)).unwrap();
        grid
    }

    #[tokio::test]
    async fn open_grid_path_is_manhattan() {
        let mut grid = open_grid(5, 5);
        let mut emitter = StepEmitter::unpaced();
        let outcome = dijkstra(&mut grid, Coord::new(0, 0), Coord::new(4, 4), &mut emitter)
            .await
            .unwrap();

        let path = outcome.path().unwrap();
        assert_eq!(path.hops(), 8);
        // Start and end keep their markers.
        assert_eq!(grid.count(CellRole::Path), 7);
        assert_eq!(grid.get(Coord::new(0, 0)), Some(CellRole::Start));
        assert_eq!(emitter.stats().placements, 9);
    }

    #[tokio::test]
    async fn wall_scenario_detours() {
        // Column 2 walled off except the bottom row.
        let mut grid = open_grid(4, 5);
        for row in 0..3 {
            grid.toggle_wall(Coord::new(row, 2)).unwrap();
        }
        let mut emitter = StepEmitter::unpaced();
        let outcome = dijkstra(&mut grid, Coord::new(0, 0), Coord::new(3, 4), &mut emitter)
            .await
            .unwrap();
        assert_eq!(outcome.path().map(Path::hops), Some(7));
        assert_eq!(grid.get(Coord::new(3, 2)), Some(CellRole::Path));
    }

    #[tokio::test]
    async fn enclosed_end_is_no_path() {
        let mut grid = open_grid(3, 3);
        grid.toggle_wall(Coord::new(1, 2)).unwrap();
        grid.toggle_wall(Coord::new(2, 1)).unwrap();
        let mut emitter = StepEmitter::unpaced();
        let outcome = dijkstra(&mut grid, Coord::new(0, 0), Coord::new(2, 2), &mut emitter)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::NoPath);
        assert_eq!(grid.count(CellRole::Path), 0);
        assert!(grid.count(CellRole::Visited) > 0);
    }

    #[tokio::test]
    async fn rerun_clears_previous_marks() {
        let mut grid = open_grid(3, 3);
        let mut emitter = StepEmitter::unpaced();
        dijkstra(&mut grid, Coord::new(0, 0), Coord::new(2, 2), &mut emitter).await.unwrap();
        let first = grid.clone();
        dijkstra(&mut grid, Coord::new(0, 0), Coord::new(2, 2), &mut emitter).await.unwrap();
        assert_eq!(grid, first);
    }
}
