//! Graph analytics: connected components and degree centrality.
//!
//! Results are sorted by relevance (size desc, degree desc) with actor id as
//! the tie-breaker so output is stable across runs.

use petgraph::algo::{connected_components, tarjan_scc};
use serde::Serialize;

use crate::id::ActorId;

use super::CollaborationGraph;

// ---------------------------------------------------------------------------
// Connected components
// ---------------------------------------------------------------------------

/// A connected component of the collaboration graph.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectedComponent {
    /// Position in the sorted component list.
    pub id: usize,
    /// Member actors, sorted by id.
    pub members: Vec<ActorId>,
    pub size: usize,
}

/// Number of connected components, isolated actors included.
pub fn component_count(graph: &CollaborationGraph) -> usize {
    connected_components(graph.inner())
}

/// All connected components, largest first.
pub fn components(graph: &CollaborationGraph) -> Vec<ConnectedComponent> {
    // On an undirected graph every strongly connected component is a
    // connected component.
    let mut groups: Vec<Vec<ActorId>> = tarjan_scc(graph.inner())
        .into_iter()
        .map(|indices| {
            let mut members: Vec<ActorId> = indices
                .into_iter()
                .map(|idx| graph.actor_at(idx).clone())
                .collect();
            members.sort();
            members
        })
        .collect();

    groups.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.first().cmp(&b.first())));
    groups
        .into_iter()
        .enumerate()
        .map(|(id, members)| ConnectedComponent {
            id,
            size: members.len(),
            members,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Degree centrality
// ---------------------------------------------------------------------------

/// Number of distinct co-stars of an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegreeCentrality {
    pub actor: ActorId,
    pub costars: usize,
}

/// Degree of every actor, most connected first.
pub fn degree_centrality(graph: &CollaborationGraph) -> Vec<DegreeCentrality> {
    let g = graph.inner();
    let mut results: Vec<DegreeCentrality> = g
        .node_indices()
        .map(|idx| DegreeCentrality {
            actor: graph.actor_at(idx).clone(),
            costars: g.neighbors(idx).count(),
        })
        .collect();
    results.sort_by(|a, b| b.costars.cmp(&a.costars).then_with(|| a.actor.cmp(&b.actor)));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RawDataset;
    use crate::relation::Relations;

    fn two_islands() -> CollaborationGraph {
        let ds = RawDataset::new()
            .with_actor("1", "Hub")
            .with_actor("2", "A")
            .with_actor("3", "B")
            .with_actor("4", "C")
            .with_actor("5", "D")
            .with_actor("6", "E")
            .with_actor("7", "Loner")
            .with_movie("m1", "Hub One", ["1", "2"])
            .with_movie("m2", "Hub Two", ["1", "3"])
            .with_movie("m3", "Hub Three", ["1", "4"])
            .with_movie("m4", "Pair", ["5", "6"]);
        let rel = Relations::build(&ds).unwrap();
        CollaborationGraph::build(&rel.actors, &rel.cast)
    }

    #[test]
    fn components_largest_first() {
        let g = two_islands();
        let comps = components(&g);
        assert_eq!(comps.len(), 3);
        assert_eq!(comps[0].size, 4);
        assert_eq!(comps[1].members, vec![ActorId::new("5"), ActorId::new("6")]);
        assert_eq!(comps[2].members, vec![ActorId::new("7")]);
        assert_eq!(component_count(&g), 3);
    }

    #[test]
    fn hub_has_highest_degree() {
        let g = two_islands();
        let ranks = degree_centrality(&g);
        assert_eq!(ranks[0].actor, ActorId::new("1"));
        assert_eq!(ranks[0].costars, 3);
        assert_eq!(ranks.last().unwrap().costars, 0);
    }
}
