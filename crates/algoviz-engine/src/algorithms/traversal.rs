//! Breadth-first and depth-first search over a [`Graph`].
//!
//! Neighbors are expanded in ascending id order, so both searches are
//! deterministic for a given graph.

use std::collections::{HashMap, HashSet, VecDeque};

use algoviz_model::{Graph, NodeId};
use futures::future::{BoxFuture, FutureExt};

use super::{Outcome, Path};
use crate::emitter::{ElementRef, StepEmitter, StepKind};
use crate::error::Result;

/// FIFO search from `start`; the path found has the fewest hops.
pub async fn bfs(graph: &Graph, start: NodeId, end: NodeId, emitter: &mut StepEmitter) -> Result<Outcome> {
    let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        emitter.emit(StepKind::Visit, [ElementRef::Node(node)], graph).await?;
        if node == end {
            return Ok(Outcome::PathFound {
                path: Path::Nodes(backtrack(&parents, start, end)),
            });
        }
        for next in graph.neighbors(node) {
            if seen.insert(next) {
                parents.insert(next, node);
                queue.push_back(next);
            }
        }
    }
    Ok(Outcome::NoPath)
}

fn backtrack(parents: &HashMap<NodeId, NodeId>, start: NodeId, end: NodeId) -> Vec<NodeId> {
    let mut path = vec![end];
    let mut node = end;
    while node != start {
        match parents.get(&node) {
            Some(&parent) => {
                path.push(parent);
                node = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Recursive search from `start`; the first path found is reported.
pub async fn dfs(graph: &Graph, start: NodeId, end: NodeId, emitter: &mut StepEmitter) -> Result<Outcome> {
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    if descend(graph, start, end, &mut visited, &mut path, emitter).await? {
        Ok(Outcome::PathFound {
            path: Path::Nodes(path),
        })
    } else {
        Ok(Outcome::NoPath)
    }
}

fn descend<'a>(
    graph: &'a Graph,
    node: NodeId,
    end: NodeId,
    visited: &'a mut HashSet<NodeId>,
    path: &'a mut Vec<NodeId>,
    emitter: &'a mut StepEmitter,
) -> BoxFuture<'a, Result<bool>> {
    async move {
        visited.insert(node);
        path.push(node);
        emitter.emit(StepKind::Visit, [ElementRef::Node(node)], graph).await?;
        if node == end {
            return Ok(true);
        }
        for next in graph.neighbors(node) {
            if !visited.contains(&next) && descend(graph, next, end, visited, path, emitter).await? {
                return Ok(true);
            }
        }
        path.pop();
        Ok(false)
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_model::Point;

    /// Square 0-1-2-3-0 with a tail 2-4.
    fn square() -> Graph {
        let mut graph = Graph::new();
        for i in 0..5 {
            graph.add_node(Point::new(f64::from(i) * 100.0, 0.0));
        }
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0), (2, 4)] {
            graph.add_edge(NodeId(a), NodeId(b)).unwrap();
        }
        graph
    }

    #[tokio::test]
    async fn bfs_finds_fewest_hops() {
        let graph = square();
        let mut emitter = StepEmitter::unpaced();
        let outcome = bfs(&graph, NodeId(0), NodeId(2), &mut emitter).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::PathFound {
                path: Path::Nodes(vec![NodeId(0), NodeId(1), NodeId(2)])
            }
        );
    }

    #[tokio::test]
    async fn dfs_follows_ascending_neighbors() {
        let graph = square();
        let mut emitter = StepEmitter::unpaced();
        let outcome = dfs(&graph, NodeId(0), NodeId(3), &mut emitter).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::PathFound {
                path: Path::Nodes(vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)])
            }
        );
        let bfs_outcome = bfs(&graph, NodeId(0), NodeId(3), &mut emitter).await.unwrap();
        assert_eq!(bfs_outcome.path().map(Path::hops), Some(1));
    }

    #[tokio::test]
    async fn disconnected_end_is_no_path() {
        let mut graph = square();
        let island = graph.add_node(Point::new(900.0, 900.0));
        let mut emitter = StepEmitter::unpaced();
        assert_eq!(bfs(&graph, NodeId(0), island, &mut emitter).await.unwrap(), Outcome::NoPath);
        assert_eq!(dfs(&graph, NodeId(0), island, &mut emitter).await.unwrap(), Outcome::NoPath);
    }

    #[tokio::test]
    async fn start_equal_to_end_is_a_single_node_path() {
        let graph = square();
        let mut emitter = StepEmitter::unpaced();
        let outcome = bfs(&graph, NodeId(4), NodeId(4), &mut emitter).await.unwrap();
        assert_eq!(outcome.path().map(Path::hops), Some(0));
        assert_eq!(emitter.stats().visits, 1);
    }
}
