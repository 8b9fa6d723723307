//! Query engine facade: top-level API for movie-query.
//!
//! A [`QueryEngine`] is built once per dataset load. It owns an immutable
//! snapshot of the normalized relations and the collaboration graph; every
//! query is a pure read, so a cloned engine can be shared across threads
//! without locking. Loading a different dataset means building a new engine.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::DatasetConfig;
use crate::dataset::RawDataset;
use crate::error::{Entity, MovieQueryResult, QueryError, QueryResult, RelationResult};
use crate::graph::analytics::{self, ConnectedComponent, DegreeCentrality};
use crate::graph::traverse;
use crate::graph::{CollaborationGraph, Link, Separation};
use crate::id::{ActorId, MovieId};
use crate::loader;
use crate::relation::Relations;

/// Read-only query surface over one dataset.
#[derive(Clone)]
pub struct QueryEngine {
    relations: Arc<Relations>,
    graph: Arc<CollaborationGraph>,
}

impl QueryEngine {
    /// Build relations and graph from a raw dataset.
    ///
    /// Either both are built or the whole build fails; no partial engine is
    /// ever returned.
    pub fn from_dataset(dataset: &RawDataset) -> RelationResult<Self> {
        let relations = Relations::build(dataset)?;
        let graph = CollaborationGraph::build(&relations.actors, &relations.cast);
        tracing::info!(
            actors = relations.actors.len(),
            movies = relations.movies.len(),
            cast_rows = relations.cast.len(),
            edges = graph.edge_count(),
            "query engine ready"
        );
        Ok(Self {
            relations: Arc::new(relations),
            graph: Arc::new(graph),
        })
    }

    /// Parse a JSON dataset document and build an engine from it.
    pub fn from_json(json: &str) -> MovieQueryResult<Self> {
        let dataset = RawDataset::from_json_str(json)?;
        Ok(Self::from_dataset(&dataset)?)
    }

    /// Load the configured dataset and build an engine from it.
    pub fn from_config(config: &DatasetConfig) -> MovieQueryResult<Self> {
        let dataset = loader::load(config)?;
        Ok(Self::from_dataset(&dataset)?)
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// First actor, in directory order, named exactly `name`.
    ///
    /// Names are not unique. When several actors share a name the first one
    /// wins; use [`actor_ids_by_name`](Self::actor_ids_by_name) to see all.
    pub fn actor_id_by_name(&self, name: &str) -> QueryResult<ActorId> {
        self.relations
            .actors
            .first_by_name(name)
            .cloned()
            .ok_or_else(|| QueryError::not_found(Entity::ActorName, name))
    }

    /// Every actor named exactly `name`, in directory order.
    pub fn actor_ids_by_name(&self, name: &str) -> Vec<ActorId> {
        self.relations.actors.all_by_name(name).cloned().collect()
    }

    pub fn actor_name_by_id(&self, id: &str) -> QueryResult<&str> {
        self.relations
            .actors
            .name_of(id)
            .ok_or_else(|| QueryError::not_found(Entity::ActorId, id))
    }

    pub fn movie_title_by_id(&self, id: &str) -> QueryResult<&str> {
        self.relations
            .movies
            .title_of(id)
            .ok_or_else(|| QueryError::not_found(Entity::MovieId, id))
    }

    /// Resolve a token that may be either an actor id or an exact name.
    /// Ids take precedence.
    pub fn resolve_actor(&self, id_or_name: &str) -> QueryResult<ActorId> {
        if self.relations.actors.contains(id_or_name) {
            return Ok(ActorId::new(id_or_name));
        }
        self.actor_id_by_name(id_or_name)
    }

    /// Movies an actor appears in, in relation order.
    ///
    /// An actor in no cast gets an empty list, whether or not the id is in
    /// the directory.
    pub fn movies_for_actor(&self, actor: &str) -> QueryResult<Vec<MovieId>> {
        Ok(self.relations.cast.movies_for(actor))
    }

    /// Movies an actor appears in, paired with their titles.
    pub fn movies_with_titles(&self, actor: &str) -> QueryResult<Vec<(MovieId, String)>> {
        self.movies_for_actor(actor)?
            .into_iter()
            .map(|id| {
                let title = self.movie_title_by_id(id.as_str())?.to_string();
                Ok((id, title))
            })
            .collect()
    }

    /// Cast of a movie in source order.
    pub fn cast_of(&self, movie: &str) -> QueryResult<&[ActorId]> {
        self.relations
            .movies
            .get(movie)
            .map(|m| m.cast.as_slice())
            .ok_or_else(|| QueryError::not_found(Entity::MovieId, movie))
    }

    // -----------------------------------------------------------------------
    // Graph queries
    // -----------------------------------------------------------------------

    /// Every actor who shares at least one movie with `actor`.
    pub fn costars_of(&self, actor: &str) -> QueryResult<BTreeSet<ActorId>> {
        self.graph
            .neighbors(actor)
            .ok_or_else(|| QueryError::not_found(Entity::ActorId, actor))
    }

    /// Co-stars derived from the relations instead of the graph.
    ///
    /// Always equal to [`costars_of`](Self::costars_of); kept as a
    /// cross-check of the graph build.
    pub fn costars_via_relations(&self, actor: &str) -> QueryResult<BTreeSet<ActorId>> {
        self.require_actor(actor)?;
        let mut costars = BTreeSet::new();
        for movie in self.movies_for_actor(actor)? {
            for other in self.cast_of(movie.as_str())? {
                if other.as_str() != actor {
                    costars.insert(other.clone());
                }
            }
        }
        Ok(costars)
    }

    /// Movies two actors appear in together. Empty if they never co-starred.
    pub fn shared_movies(&self, a: &str, b: &str) -> QueryResult<BTreeSet<MovieId>> {
        self.require_actor(a)?;
        self.require_actor(b)?;
        Ok(self.graph.shared_movies(a, b).cloned().unwrap_or_default())
    }

    /// Length of a shortest shared-movie chain between two actors.
    pub fn degrees_of_separation(&self, a: &str, b: &str) -> QueryResult<Separation> {
        traverse::separation(&self.graph, a, b)
    }

    /// One shortest shared-movie chain between two actors, `None` if they
    /// are not connected.
    pub fn separation_path(&self, a: &str, b: &str) -> QueryResult<Option<Vec<Link>>> {
        traverse::separation_path(&self.graph, a, b)
    }

    /// Distance from `actor` to everyone reachable from them.
    pub fn separations_from(&self, actor: &str) -> QueryResult<HashMap<ActorId, usize>> {
        traverse::separations_from(&self.graph, actor)
    }

    /// Answer many separation queries in parallel. Results keep input order.
    pub fn degrees_of_separation_many<A, B>(&self, pairs: &[(A, B)]) -> Vec<QueryResult<Separation>>
    where
        A: AsRef<str> + Sync,
        B: AsRef<str> + Sync,
    {
        pairs
            .par_iter()
            .map(|(a, b)| self.degrees_of_separation(a.as_ref(), b.as_ref()))
            .collect()
    }

    /// Connected components, largest first.
    pub fn components(&self) -> Vec<ConnectedComponent> {
        analytics::components(&self.graph)
    }

    /// The `k` actors with the most distinct co-stars.
    pub fn most_connected(&self, k: usize) -> Vec<DegreeCentrality> {
        let mut ranks = analytics::degree_centrality(&self.graph);
        ranks.truncate(k);
        ranks
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    pub fn graph(&self) -> &CollaborationGraph {
        &self.graph
    }

    /// Summary statistics for the loaded dataset.
    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            actors: self.relations.actors.len(),
            movies: self.relations.movies.len(),
            cast_rows: self.relations.cast.len(),
            edges: self.graph.edge_count(),
            components: analytics::component_count(&self.graph),
        }
    }

    fn require_actor(&self, actor: &str) -> QueryResult<()> {
        if self.relations.actors.contains(actor) {
            Ok(())
        } else {
            Err(QueryError::not_found(Entity::ActorId, actor))
        }
    }
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("actors", &self.relations.actors.len())
            .field("movies", &self.relations.movies.len())
            .field("graph", &self.graph)
            .finish()
    }
}

/// Dataset statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineInfo {
    pub actors: usize,
    pub movies: usize,
    pub cast_rows: usize,
    pub edges: usize,
    pub components: usize,
}

impl std::fmt::Display for EngineInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "movie-query dataset info")?;
        writeln!(f, "  actors:      {}", self.actors)?;
        writeln!(f, "  movies:      {}", self.movies)?;
        writeln!(f, "  cast rows:   {}", self.cast_rows)?;
        writeln!(f, "  co-star edges: {}", self.edges)?;
        writeln!(f, "  components:  {}", self.components)?;
        Ok(())
    }
}
