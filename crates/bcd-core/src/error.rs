//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BcdError {
    #[error("IO/{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PARSE/{0}")]
    ParseError(String),

    #[error("SCHEMA/{0}")]
    SchemaError(String),

    #[error("MERGE/{0}")]
    MergeError(String),

    #[error("SERIALIZE/{0}")]
    SerializeError(String),

    #[error("CONFIG/{0}")]
    ConfigError(String),
}

impl BcdError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Misuse of the traversal API (as opposed to problems in the data).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
    #[error("WALK/'{0}' is not a valid tree identifier")]
    UnknownEntryPoint(String),

    #[error("WALK/'{0}' does not point at a feature or grouping node")]
    NotTraversable(String),
}
