//! Breadth-first degrees of separation.
//!
//! Every edge costs one hop regardless of how many movies back it. Neighbors
//! are expanded in node-index order, so the concrete chain returned by
//! [`separation_path`] is deterministic for a given dataset.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::error::{Entity, QueryError, QueryResult};
use crate::id::{ActorId, MovieId};

use super::CollaborationGraph;

/// Outcome of a separation query between two actors that both exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Separation {
    /// Shortest path length in edges.
    Degrees(usize),
    /// The actors are in different connected components.
    Unreachable,
}

impl Separation {
    /// Hop count, if reachable.
    pub fn degrees(self) -> Option<usize> {
        match self {
            Separation::Degrees(d) => Some(d),
            Separation::Unreachable => None,
        }
    }

    pub fn is_reachable(self) -> bool {
        matches!(self, Separation::Degrees(_))
    }
}

impl std::fmt::Display for Separation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Separation::Degrees(d) => write!(f, "{d}"),
            Separation::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// One hop of a separation chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from: ActorId,
    pub to: ActorId,
    /// A movie both actors appear in (the lowest id when they share several).
    pub movie: MovieId,
}

struct Search {
    depth: Vec<Option<usize>>,
    parent: Vec<Option<NodeIndex>>,
}

/// BFS from `start`, stopping early once `target` is labeled.
fn bfs(graph: &CollaborationGraph, start: NodeIndex, target: Option<NodeIndex>) -> Search {
    let g = graph.inner();
    let mut depth = vec![None; g.node_count()];
    let mut parent = vec![None; g.node_count()];
    let mut queue = VecDeque::new();

    depth[start.index()] = Some(0);
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        if Some(node) == target {
            break;
        }
        let next_depth = depth[node.index()].map_or(0, |d| d + 1);

        let mut neighbors: Vec<NodeIndex> = g.neighbors(node).collect();
        neighbors.sort_unstable();
        for n in neighbors {
            if depth[n.index()].is_none() {
                depth[n.index()] = Some(next_depth);
                parent[n.index()] = Some(node);
                queue.push_back(n);
            }
        }
    }

    Search { depth, parent }
}

fn node(graph: &CollaborationGraph, actor: &str) -> QueryResult<NodeIndex> {
    graph
        .index_of(actor)
        .ok_or_else(|| QueryError::not_found(Entity::ActorId, actor))
}

/// Shortest-path length between two actors.
///
/// Fails with `NotFound` if either actor is not a node. Disconnected actors
/// are reported as [`Separation::Unreachable`], not as an error.
pub fn separation(graph: &CollaborationGraph, from: &str, to: &str) -> QueryResult<Separation> {
    let (start, goal) = (node(graph, from)?, node(graph, to)?);
    if start == goal {
        return Ok(Separation::Degrees(0));
    }
    let search = bfs(graph, start, Some(goal));
    Ok(search.depth[goal.index()].map_or(Separation::Unreachable, Separation::Degrees))
}

/// One shortest chain of shared-movie links from `from` to `to`.
///
/// Returns `Ok(None)` when the actors are disconnected and an empty chain
/// when they are the same actor.
pub fn separation_path(
    graph: &CollaborationGraph,
    from: &str,
    to: &str,
) -> QueryResult<Option<Vec<Link>>> {
    let (start, goal) = (node(graph, from)?, node(graph, to)?);
    if start == goal {
        return Ok(Some(Vec::new()));
    }
    let search = bfs(graph, start, Some(goal));
    if search.depth[goal.index()].is_none() {
        return Ok(None);
    }

    let mut hops = Vec::new();
    let mut current = goal;
    while let Some(prev) = search.parent[current.index()] {
        let Some(movie) = graph
            .shared_movies_at(prev, current)
            .and_then(|movies| movies.first())
        else {
            return Ok(None);
        };
        hops.push(Link {
            from: graph.actor_at(prev).clone(),
            to: graph.actor_at(current).clone(),
            movie: movie.clone(),
        });
        current = prev;
    }
    hops.reverse();
    Ok(Some(hops))
}

/// Distance from `from` to every actor reachable from it, itself included.
pub fn separations_from(
    graph: &CollaborationGraph,
    from: &str,
) -> QueryResult<HashMap<ActorId, usize>> {
    let start = node(graph, from)?;
    let search = bfs(graph, start, None);
    Ok(graph
        .inner()
        .node_indices()
        .filter_map(|idx| {
            search.depth[idx.index()].map(|d| (graph.actor_at(idx).clone(), d))
        })
        .collect())
}
