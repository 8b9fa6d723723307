//! Relation builder: normalizes raw dataset records into flat relations.
//!
//! Produces three read-only relations from a [`RawDataset`]:
//!
//! - [`ActorDirectory`]: actor id ↔ name, in source order
//! - [`MovieIndex`]: movie id → title and cast
//! - [`CastRelation`]: one `(movie_id, actor_id)` row per cast membership
//!
//! Construction is all-or-nothing: the first malformed record aborts the
//! build and no partial relations are returned.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dataset::RawDataset;
use crate::error::{RelationError, RelationResult};
use crate::id::{ActorId, MovieId, canonical_token};

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// An actor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
}

/// Actor id → name mapping. Ids are unique; names need not be.
#[derive(Debug, Clone, Default)]
pub struct ActorDirectory {
    actors: Vec<Actor>,
    by_id: HashMap<ActorId, usize>,
}

impl ActorDirectory {
    fn insert(&mut self, actor: Actor) {
        self.by_id.insert(actor.id.clone(), self.actors.len());
        self.actors.push(actor);
    }

    /// Look up an actor by id.
    pub fn get(&self, id: &str) -> Option<&Actor> {
        self.by_id.get(id).map(|&i| &self.actors[i])
    }

    /// Name of the actor with the given id.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|a| a.name.as_str())
    }

    /// First actor, in directory order, whose name equals `name` exactly.
    pub fn first_by_name(&self, name: &str) -> Option<&ActorId> {
        self.actors.iter().find(|a| a.name == name).map(|a| &a.id)
    }

    /// Every actor whose name equals `name` exactly, in directory order.
    pub fn all_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ActorId> + 'a {
        self.actors
            .iter()
            .filter(move |a| a.name == name)
            .map(|a| &a.id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Iterate over actors in directory order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

/// A movie record with its (deduplicated) cast in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub cast: Vec<ActorId>,
}

/// Movie id → movie record.
#[derive(Debug, Clone, Default)]
pub struct MovieIndex {
    movies: Vec<Movie>,
    by_id: HashMap<MovieId, usize>,
}

impl MovieIndex {
    fn insert(&mut self, movie: Movie) {
        self.by_id.insert(movie.id.clone(), self.movies.len());
        self.movies.push(movie);
    }

    pub fn get(&self, id: &str) -> Option<&Movie> {
        self.by_id.get(id).map(|&i| &self.movies[i])
    }

    /// Title of the movie with the given id.
    pub fn title_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|m| m.title.as_str())
    }

    /// Iterate over movies in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Movie> {
        self.movies.iter()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Cast relation
// ---------------------------------------------------------------------------

/// One cast membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastRow {
    pub movie_id: MovieId,
    pub actor_id: ActorId,
}

impl CastRow {
    pub fn new(movie_id: impl Into<MovieId>, actor_id: impl Into<ActorId>) -> Self {
        Self {
            movie_id: movie_id.into(),
            actor_id: actor_id.into(),
        }
    }
}

/// Flattened movie/actor join table.
///
/// Rows keep relation order. A secondary index maps each actor to the
/// positions of its rows so per-actor lookups do not scan the table.
#[derive(Debug, Clone, Default)]
pub struct CastRelation {
    rows: Vec<CastRow>,
    by_actor: HashMap<ActorId, Vec<usize>>,
}

impl CastRelation {
    /// Build a relation from rows in the given order.
    pub fn from_rows(rows: Vec<CastRow>) -> Self {
        let mut by_actor: HashMap<ActorId, Vec<usize>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            by_actor.entry(row.actor_id.clone()).or_default().push(i);
        }
        Self { rows, by_actor }
    }

    pub fn rows(&self) -> &[CastRow] {
        &self.rows
    }

    /// Movie ids of every row for `actor`, in relation order.
    pub fn movies_for(&self, actor: &str) -> Vec<MovieId> {
        self.by_actor
            .get(actor)
            .map(|idx| idx.iter().map(|&i| self.rows[i].movie_id.clone()).collect())
            .unwrap_or_default()
    }

    /// Group rows by movie id. Within a group, actors keep relation order.
    pub fn group_by_movie(&self) -> HashMap<&MovieId, Vec<&ActorId>> {
        let mut groups: HashMap<&MovieId, Vec<&ActorId>> = HashMap::new();
        for row in &self.rows {
            groups.entry(&row.movie_id).or_default().push(&row.actor_id);
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// The normalized relation triple derived from one dataset load.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    pub actors: ActorDirectory,
    pub movies: MovieIndex,
    pub cast: CastRelation,
}

impl Relations {
    /// Normalize a raw dataset.
    pub fn build(dataset: &RawDataset) -> RelationResult<Self> {
        Self::from_raw(&dataset.movies, &dataset.actors)
    }

    /// Normalize raw movie and actor maps.
    ///
    /// Fails with `MalformedRecord` on the first record that violates the
    /// dataset shape, or when a cast list references an unknown actor.
    pub fn from_raw(
        raw_movies: &Map<String, Value>,
        raw_actors: &Map<String, Value>,
    ) -> RelationResult<Self> {
        let mut actors = ActorDirectory::default();
        for (id, name) in raw_actors {
            let name = name.as_str().ok_or_else(|| {
                RelationError::malformed(format!("actor {id}"), "name is not a string")
            })?;
            actors.insert(Actor {
                id: ActorId::new(id.as_str()),
                name: name.to_string(),
            });
        }

        let mut movies = MovieIndex::default();
        let mut rows = Vec::new();
        for (id, record) in raw_movies {
            let movie = parse_movie(id, record, &actors)?;
            rows.extend(
                movie
                    .cast
                    .iter()
                    .map(|actor| CastRow::new(movie.id.clone(), actor.clone())),
            );
            movies.insert(movie);
        }

        let cast = CastRelation::from_rows(rows);
        tracing::debug!(
            actors = actors.len(),
            movies = movies.len(),
            cast_rows = cast.len(),
            "built relations"
        );
        Ok(Self {
            actors,
            movies,
            cast,
        })
    }
}

fn parse_movie(id: &str, record: &Value, actors: &ActorDirectory) -> RelationResult<Movie> {
    let record_name = || format!("movie {id}");

    let fields = record
        .as_object()
        .ok_or_else(|| RelationError::malformed(record_name(), "record is not an object"))?;
    let title = fields
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| RelationError::malformed(record_name(), "missing or non-string `title`"))?;
    let raw_cast = fields
        .get("actors")
        .and_then(Value::as_array)
        .ok_or_else(|| RelationError::malformed(record_name(), "`actors` is not a sequence"))?;

    let mut seen = HashSet::with_capacity(raw_cast.len());
    let mut cast = Vec::with_capacity(raw_cast.len());
    for token in raw_cast {
        let actor = canonical_token(token).ok_or_else(|| {
            RelationError::malformed(record_name(), format!("invalid actor id token {token}"))
        })?;
        if !actors.contains(&actor) {
            return Err(RelationError::malformed(
                record_name(),
                format!("cast references unknown actor {actor}"),
            ));
        }
        if seen.insert(actor.clone()) {
            cast.push(ActorId::new(actor));
        } else {
            tracing::debug!(movie = id, actor = %actor, "dropping repeated cast member");
        }
    }

    Ok(Movie {
        id: MovieId::new(id),
        title: title.to_string(),
        cast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset(value: Value) -> RawDataset {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn flattens_cast_lists() {
        let ds = dataset(json!({
            "movies": {
                "m1": {"title": "Apollo 13", "actors": ["1", "2"]},
                "m2": {"title": "Big", "actors": [1]}
            },
            "actors": {"1": "Tom Hanks", "2": "Kevin Bacon"}
        }));
        let rel = Relations::build(&ds).unwrap();

        assert_eq!(rel.actors.len(), 2);
        assert_eq!(rel.movies.len(), 2);
        assert_eq!(
            rel.cast.rows(),
            &[
                CastRow::new("m1", "1"),
                CastRow::new("m1", "2"),
                CastRow::new("m2", "1"),
            ]
        );
        assert_eq!(rel.movies.title_of("m2"), Some("Big"));
    }

    #[test]
    fn numeric_ids_are_normalized() {
        let ds = dataset(json!({
            "movies": {"603": {"title": "The Matrix", "actors": [6384, "2975"]}},
            "actors": {"6384": "Keanu Reeves", "2975": "Laurence Fishburne"}
        }));
        let rel = Relations::build(&ds).unwrap();
        assert_eq!(rel.cast.movies_for("6384"), vec![MovieId::new("603")]);
        assert_eq!(rel.cast.movies_for("2975"), vec![MovieId::new("603")]);
    }

    #[test]
    fn movies_for_keeps_relation_order() {
        let ds = RawDataset::new()
            .with_actor("1", "A")
            .with_movie("z", "Zeta", ["1"])
            .with_movie("a", "Alpha", ["1"]);
        let rel = Relations::build(&ds).unwrap();
        assert_eq!(
            rel.cast.movies_for("1"),
            vec![MovieId::new("z"), MovieId::new("a")]
        );
    }

    #[test]
    fn repeated_cast_member_collapses() {
        let ds = dataset(json!({
            "movies": {"m1": {"title": "T", "actors": ["1", 1, "1"]}},
            "actors": {"1": "A"}
        }));
        let rel = Relations::build(&ds).unwrap();
        assert_eq!(rel.cast.len(), 1);
        assert_eq!(rel.movies.get("m1").unwrap().cast, vec![ActorId::new("1")]);
    }

    #[test]
    fn empty_cast_is_valid() {
        let ds = RawDataset::new()
            .with_actor("1", "A")
            .with_movie("m1", "Silent", Vec::<String>::new());
        let rel = Relations::build(&ds).unwrap();
        assert!(rel.cast.is_empty());
        assert_eq!(rel.movies.len(), 1);
    }

    #[test]
    fn unknown_actor_is_malformed() {
        let ds = RawDataset::new()
            .with_actor("1", "A")
            .with_movie("m1", "T", ["1", "99"]);
        let err = Relations::build(&ds).unwrap_err();
        let RelationError::MalformedRecord { record, message } = err;
        assert_eq!(record, "movie m1");
        assert!(message.contains("99"));
    }

    #[test]
    fn non_sequence_actors_is_malformed() {
        let ds = dataset(json!({
            "movies": {"m1": {"title": "T", "actors": "1"}},
            "actors": {"1": "A"}
        }));
        assert!(matches!(
            Relations::build(&ds),
            Err(RelationError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn missing_title_is_malformed() {
        let ds = dataset(json!({
            "movies": {"m1": {"actors": []}},
            "actors": {}
        }));
        assert!(Relations::build(&ds).is_err());
    }

    #[test]
    fn float_actor_token_is_malformed() {
        let ds = dataset(json!({
            "movies": {"m1": {"title": "T", "actors": [1.5]}},
            "actors": {"1": "A"}
        }));
        assert!(Relations::build(&ds).is_err());
    }

    #[test]
    fn non_string_name_is_malformed() {
        let ds = dataset(json!({"movies": {}, "actors": {"1": 42}}));
        let RelationError::MalformedRecord { record, .. } = Relations::build(&ds).unwrap_err();
        assert_eq!(record, "actor 1");
    }

    #[test]
    fn name_lookup_is_first_match_in_directory_order() {
        let ds = RawDataset::new()
            .with_actor("7", "Chris Evans")
            .with_actor("3", "Chris Evans")
            .with_actor("5", "Someone Else");
        let rel = Relations::build(&ds).unwrap();
        assert_eq!(rel.actors.first_by_name("Chris Evans"), Some(&ActorId::new("7")));
        assert_eq!(rel.actors.all_by_name("Chris Evans").count(), 2);
        assert_eq!(rel.actors.first_by_name("chris evans"), None);
    }

    #[test]
    fn group_by_movie_collects_cast() {
        let rel = CastRelation::from_rows(vec![
            CastRow::new("m2", "3"),
            CastRow::new("m1", "1"),
            CastRow::new("m1", "2"),
        ]);
        let groups = rel.group_by_movie();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&MovieId::new("m1")].len(), 2);
    }
}
