//! Raw dataset shape at the loader boundary.
//!
//! ```json
//! {"movies": {"<id>": {"title": "...", "actors": [<id>, ...]}},
//!  "actors": {"<id>": "<name>"}}
//! ```
//!
//! Records are kept as loose JSON values here. Per-record validation belongs
//! to [`Relations::build`](crate::relation::Relations::build). A document that
//! is not JSON, or whose `movies`/`actors` are missing or not maps, is
//! rejected here as `MalformedRecord` as well. Map order follows the source
//! document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LoadError, MovieQueryError, MovieQueryResult, RelationError, RelationResult};

/// The two raw relations supplied by a dataset loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDataset {
    /// Movie id → `{"title": ..., "actors": [...]}`.
    pub movies: Map<String, Value>,
    /// Actor id → name.
    pub actors: Map<String, Value>,
}

impl RawDataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a dataset from a JSON document.
    pub fn from_json_str(json: &str) -> RelationResult<Self> {
        serde_json::from_str(json).map_err(malformed_document)
    }

    /// Parse a dataset from a reader producing a JSON document.
    ///
    /// Read failures are `LoadError::Read`; everything else is a malformed
    /// document.
    pub fn from_reader(reader: impl std::io::Read) -> MovieQueryResult<Self> {
        serde_json::from_reader(std::io::BufReader::new(reader)).map_err(|e| -> MovieQueryError {
            if e.is_io() {
                LoadError::Read {
                    message: e.to_string(),
                }
                .into()
            } else {
                malformed_document(e).into()
            }
        })
    }

    /// Add an actor record.
    pub fn with_actor(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.actors.insert(id.into(), Value::String(name.into()));
        self
    }

    /// Add a movie record with string actor ids.
    pub fn with_movie<I, S>(mut self, id: impl Into<String>, title: impl Into<String>, cast: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let actors: Vec<Value> = cast.into_iter().map(|a| Value::String(a.into())).collect();
        let mut record = Map::new();
        record.insert("title".into(), Value::String(title.into()));
        record.insert("actors".into(), Value::Array(actors));
        self.movies.insert(id.into(), Value::Object(record));
        self
    }
}

fn malformed_document(e: serde_json::Error) -> RelationError {
    RelationError::malformed("dataset", e.to_string())
}
