//! Collaboration graph: actors as nodes, shared movies as edges.
//!
//! The graph is undirected and simple. Two actors are adjacent when at least
//! one movie lists both of them; the edge carries the set of every such
//! movie. Every actor in the directory is a node, including actors who never
//! share a cast with anyone.
//!
//! - [`traverse`]: breadth-first degrees of separation
//! - [`analytics`]: connected components and degree centrality

pub mod analytics;
pub mod traverse;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::id::{ActorId, MovieId};
use crate::relation::{ActorDirectory, CastRelation};

pub use traverse::{Link, Separation};

/// Edge attribute: every movie two actors appear in together.
pub type SharedMovies = BTreeSet<MovieId>;

/// Undirected actor collaboration graph backed by petgraph.
///
/// Immutable once built. Node indices follow actor directory order.
pub struct CollaborationGraph {
    graph: UnGraph<ActorId, SharedMovies>,
    /// ActorId → NodeIndex mapping for O(1) node lookups.
    node_index: HashMap<ActorId, NodeIndex>,
}

impl CollaborationGraph {
    /// Build the graph from the actor directory and cast relation.
    ///
    /// Rows are grouped by movie and each cast group of size k expands into
    /// its k·(k-1)/2 unordered pairs. Pairs seen in several movies merge into
    /// a single edge whose attribute is the union of those movies. The result
    /// does not depend on row order.
    pub fn build(actors: &ActorDirectory, cast: &CastRelation) -> Self {
        let mut graph = UnGraph::with_capacity(actors.len(), 0);
        let mut node_index = HashMap::with_capacity(actors.len());
        for actor in actors.iter() {
            let idx = graph.add_node(actor.id.clone());
            node_index.insert(actor.id.clone(), idx);
        }

        let mut pairs: BTreeMap<(NodeIndex, NodeIndex), SharedMovies> = BTreeMap::new();
        for (movie, members) in cast.group_by_movie() {
            let mut group: Vec<NodeIndex> = Vec::with_capacity(members.len());
            for actor in members {
                match node_index.get(actor) {
                    Some(&idx) => group.push(idx),
                    None => {
                        tracing::warn!(movie = %movie, actor = %actor, "cast row references unknown actor, skipping")
                    }
                }
            }
            group.sort_unstable();
            group.dedup();

            for (i, &a) in group.iter().enumerate() {
                for &b in &group[i + 1..] {
                    pairs.entry((a, b)).or_default().insert(movie.clone());
                }
            }
        }

        graph.reserve_edges(pairs.len());
        for ((a, b), movies) in pairs {
            graph.add_edge(a, b, movies);
        }

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built collaboration graph"
        );
        Self { graph, node_index }
    }

    /// Node index of an actor, if present.
    pub(crate) fn index_of(&self, actor: &str) -> Option<NodeIndex> {
        self.node_index.get(actor).copied()
    }

    /// Actor at a node index.
    pub(crate) fn actor_at(&self, idx: NodeIndex) -> &ActorId {
        &self.graph[idx]
    }

    /// The underlying petgraph graph.
    pub(crate) fn inner(&self) -> &UnGraph<ActorId, SharedMovies> {
        &self.graph
    }

    /// Check if a node exists.
    pub fn has_node(&self, actor: &str) -> bool {
        self.node_index.contains_key(actor)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges (co-star pairs).
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All actor nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &ActorId> {
        self.graph.node_weights()
    }

    /// Neighbors of an actor. `None` if the actor is not a node.
    pub fn neighbors(&self, actor: &str) -> Option<BTreeSet<ActorId>> {
        let idx = self.index_of(actor)?;
        Some(
            self.graph
                .neighbors(idx)
                .map(|n| self.graph[n].clone())
                .collect(),
        )
    }

    /// Movies shared by two actors, or `None` if they are not adjacent.
    pub fn shared_movies(&self, a: &str, b: &str) -> Option<&SharedMovies> {
        let (a, b) = (self.index_of(a)?, self.index_of(b)?);
        self.shared_movies_at(a, b)
    }

    pub(crate) fn shared_movies_at(&self, a: NodeIndex, b: NodeIndex) -> Option<&SharedMovies> {
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge)
    }

    /// Every edge as `(lower, higher, movies)` with endpoints in id order,
    /// sorted by endpoints.
    pub fn edges(&self) -> Vec<(&ActorId, &ActorId, &SharedMovies)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| {
                let (s, t) = (&self.graph[e.source()], &self.graph[e.target()]);
                let (lo, hi) = if s <= t { (s, t) } else { (t, s) };
                (lo, hi, e.weight())
            })
            .collect();
        edges.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));
        edges
    }
}

impl std::fmt::Debug for CollaborationGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollaborationGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}
