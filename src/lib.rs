// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # movie-query
//!
//! Relationship queries over a movie/actor dataset: an actor's movies and
//! co-stars, and the degrees of separation between two actors.
//!
//! ## Architecture
//!
//! - **Dataset** (`dataset`, `loader`): raw `movies` / `actors` relations from a
//!   local file or a dataset server with HTTP caching
//! - **Relations** (`relation`): actor directory, movie index, flattened cast table
//! - **Collaboration graph** (`graph`): undirected petgraph graph of actors joined
//!   by shared movies, with BFS separation and component analytics
//! - **Query engine** (`engine`): the read-only lookup and traversal facade
//!
//! ## Library usage
//!
//! ```
//! use movie_query::engine::QueryEngine;
//! use movie_query::graph::Separation;
//!
//! let engine = QueryEngine::from_json(
//!     r#"{"movies": {"m1": {"title": "Apollo 13", "actors": ["1", "2"]}},
//!         "actors": {"1": "Tom Hanks", "2": "Kevin Bacon"}}"#,
//! )
//! .unwrap();
//! let bacon = engine.actor_id_by_name("Kevin Bacon").unwrap();
//! assert_eq!(
//!     engine.degrees_of_separation("1", bacon.as_str()).unwrap(),
//!     Separation::Degrees(1)
//! );
//! ```

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod graph;
pub mod id;
pub mod loader;
pub mod relation;
