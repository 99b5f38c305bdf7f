//! Error types for rewrite passes
use bcd_core::{BcdError, WalkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanonError {
    #[error(transparent)]
    Core(#[from] BcdError),

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("MIRROR/unknown browser '{0}'")]
    UnknownBrowser(String),

    #[error("MIRROR/'{0}' has no upstream browser to mirror from")]
    NoUpstream(String),

    #[error("MIRROR/upstream chain of '{0}' loops back on itself")]
    UpstreamCycle(String),

    #[error("MIRROR/unknown mirror mode '{0}' (expected nonreal, bool or always)")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, CanonError>;
