//! Built-in lint rules.

pub mod browsers;
pub mod descriptions;
pub mod obsolete;
pub mod schema;
pub mod status;
pub mod style;
pub mod versions;

pub use browsers::BrowserDataRule;
pub use descriptions::DescriptionsRule;
pub use obsolete::ObsoleteRule;
pub use schema::SchemaRule;
pub use status::StatusRule;
pub use style::StyleRule;
pub use versions::VersionsRule;

use crate::rule::Rule;

/// Every built-in rule, in reporting order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(StyleRule),
        Box::new(SchemaRule),
        Box::new(BrowserDataRule),
        Box::new(VersionsRule),
        Box::new(StatusRule),
        Box::new(ObsoleteRule),
        Box::new(DescriptionsRule),
    ]
}
