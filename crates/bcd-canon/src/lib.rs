//! BCD Canon: canonical form and rewrite passes
//!
//! Everything here takes data in and hands data back in a normalized
//! shape. Passes are idempotent: running one twice changes nothing the
//! second time.
//!
//! # Example
//!
//! ```ignore
//! use bcd_canon::{fix_dir, IdentifierFirst};
//!
//! let summary = fix_dir(Path::new("data"), DEFAULT_CATEGORIES, &IdentifierFirst)?;
//! println!("{} documents rewritten", summary.changed.len());
//! ```

pub mod error;
pub mod fix;
pub mod flags;
pub mod mirror;
pub mod order;
pub mod serialize;

pub use error::{CanonError, Result};
pub use fix::{fix_dir, fix_document, write_if_changed, FixSummary};
pub use flags::{
    prune_redundant_flags, remove_flags, remove_flags_in_tree, FlagDisposition, FlagPruner,
    FlagRemovalRule, PruneOptions, DEFAULT_CUTOFF_MONTHS,
};
pub use mirror::{map_version, mirror_record, mirror_support, mirror_tree, resolve_mirrors, MirrorMode};
pub use order::{
    canonicalize_group, canonicalize_record, canonicalize_tree, compare_statements, find_disorder,
    order_properties, Disorder, DisorderKind, FeatureOrder, IdentifierFirst,
};
pub use serialize::{to_canonical_string, to_pretty_string, to_stable_string};
