//! Linter errors
use bcd_core::{BcdError, WalkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LintError {
    #[error(transparent)]
    Core(#[from] BcdError),

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("PROFILE/{0}")]
    ProfileError(String),

    #[error("LINT/unknown rule '{0}'")]
    UnknownRule(String),
}
