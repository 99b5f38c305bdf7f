//! BCD Core: tree model, queries, walkers and visitors
//!
//! The dataset is loaded once into a [`Tree`] whose nodes are tagged as
//! grouping, feature or browser nodes. Everything else in the workspace
//! reads the tree through [`query`], [`walk`] and [`visit`], and rewrites
//! it through [`visit_mut`].
//!
//! # Example
//!
//! ```ignore
//! use bcd_core::{loader, walk};
//!
//! let tree = loader::load_dir(Path::new("data"), loader::DEFAULT_CATEGORIES)?;
//! for step in walk(&tree, &["api.Document"])? {
//!     println!("{}", step.path);
//! }
//! ```

pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod model;
pub mod primitives;
pub mod query;
pub mod tree;
pub mod version;
pub mod visit;
pub mod walk;

pub use diagnostics::{Diagnostic, DiagnosticSink, Level, TracingSink};
pub use error::{BcdError, WalkError};
pub use model::{
    Browser, Browsers, CompatRecord, Flag, FlagType, OneOrMany, Release, ReleaseStatus,
    StatusBlock, SupportBlock, SupportEntry, SupportStatement, VersionValue, COMPAT_KEY, META_KEY,
};
pub use primitives::{child_path, join_path};
pub use query::{query, NodeRef};
pub use tree::{Children, Feature, Group, Node, Tree};
pub use visit::{visit, visit_mut, visit_mut_with, Flow, VisitOptions, Visitor};
pub use walk::{low_level_walk, walk, walk_with_depth, FeatureStep, LowLevelWalk, StepNode, WalkStep};

/// Version of the toolkit.
pub const BCD_VERSION: &str = env!("CARGO_PKG_VERSION");
