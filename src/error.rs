//! Rich diagnostic error types for movie-query.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Build-time failures (`RelationError`)
//! abort construction entirely; lookup failures (`QueryError`) are recoverable
//! by the caller. An unreachable actor pair is not an error at all, see
//! [`crate::graph::Separation`].

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for movie-query.
#[derive(Debug, Error, Diagnostic)]
pub enum MovieQueryError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Relation(#[from] RelationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Relation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RelationError {
    #[error("malformed record {record}: {message}")]
    #[diagnostic(
        code(mq::relation::malformed_record),
        help(
            "Every movie needs a string `title` and an `actors` array of ids \
             (strings or integers), and every listed actor id must appear in \
             the `actors` directory. Fix the dataset and reload it."
        )
    )]
    MalformedRecord { record: String, message: String },
}

impl RelationError {
    pub(crate) fn malformed(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            record: record.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

/// What kind of key a failed lookup was keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    ActorId,
    ActorName,
    MovieId,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::ActorId => write!(f, "actor id"),
            Entity::ActorName => write!(f, "actor name"),
            Entity::MovieId => write!(f, "movie id"),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("{entity} not found: \"{key}\"")]
    #[diagnostic(
        code(mq::query::not_found),
        help(
            "Names are matched exactly and case-sensitively. Check the spelling, \
             or look the actor up by id instead."
        )
    )]
    NotFound { entity: Entity, key: String },
}

impl QueryError {
    pub(crate) fn not_found(entity: Entity, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("failed to read dataset file: {path}")]
    #[diagnostic(
        code(mq::load::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error {status} fetching {url}")]
    #[diagnostic(
        code(mq::load::http_status),
        help("The dataset server rejected the request. Verify `base_url` and the dataset size.")
    )]
    HttpStatus { url: String, status: u16 },

    #[error("transport error fetching {url}: {message}")]
    #[diagnostic(
        code(mq::load::transport),
        help(
            "The dataset server could not be reached and no cached copy exists. \
             Check your network connection, or point `dataset.file` at a local copy."
        )
    )]
    Transport { url: String, message: String },

    #[error("dataset cache error at {path}")]
    #[diagnostic(
        code(mq::load::cache),
        help("Ensure the cache directory is writable, or disable caching with `--no-cache`.")
    )]
    Cache {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read dataset stream: {message}")]
    #[diagnostic(
        code(mq::load::read),
        help("The dataset source stopped producing data mid-document. Retry the load.")
    )]
    Read { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(mq::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(mq::config::parse),
        help("Check the TOML syntax. Valid dataset sizes are `small`, `medium` and `large`.")
    )]
    Parse { path: String, message: String },
}

pub type RelationResult<T> = std::result::Result<T, RelationError>;
pub type QueryResult<T> = std::result::Result<T, QueryError>;
pub type LoadResult<T> = std::result::Result<T, LoadError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type MovieQueryResult<T> = std::result::Result<T, MovieQueryError>;
