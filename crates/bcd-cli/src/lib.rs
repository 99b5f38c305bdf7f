//! BCD CLI: curation commands over a browser compat dataset
//!
//! The binary is a thin layer over this library: configuration, document
//! rewriting, statistics, traversal and release bundling live here so they
//! can be tested without a process boundary.

pub mod config;
pub mod documents;
pub mod release;
pub mod stats;
pub mod traverse;

pub use config::{CurationConfig, DEFAULT_CONFIG_FILE};
pub use documents::{documents_under, rewrite_documents};
pub use release::{build_bundle, write_release, ReleaseManifest};
pub use stats::{collect_stats, render_markdown, SupportCounts, SupportStats};
pub use traverse::{traverse, TraverseOptions};
