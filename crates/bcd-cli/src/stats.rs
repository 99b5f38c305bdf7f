//! Support statistics: how much of the data is backed by real versions.
//!
//! Every (feature, browser) pair falls in exactly one bucket. Unknown
//! support wins over `true`, which wins over ranged versions; what is left
//! is real data.

use handlebars::{Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use bcd_core::{walk, BcdError, SupportEntry, Tree, VersionValue, WalkError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportCounts {
    pub real: usize,
    pub ranged: usize,
    #[serde(rename = "true")]
    pub true_values: usize,
    #[serde(rename = "null")]
    pub null_values: usize,
}

impl SupportCounts {
    pub fn total(&self) -> usize {
        self.real + self.ranged + self.true_values + self.null_values
    }

    fn add(&mut self, other: &SupportCounts) {
        self.real += other.real;
        self.ranged += other.ranged;
        self.true_values += other.true_values;
        self.null_values += other.null_values;
    }

    fn record(&mut self, entry: Option<&SupportEntry>) {
        let statements = entry.map(SupportEntry::statements).unwrap_or_default();
        let any = |f: fn(&VersionValue) -> bool| statements.iter().any(|s| f(&s.version_added));

        if statements.is_empty() || any(|v| *v == VersionValue::Unknown) {
            self.null_values += 1;
        } else if any(|v| *v == VersionValue::Supported) {
            self.true_values += 1;
        } else if any(VersionValue::is_ranged) {
            self.ranged += 1;
        } else {
            self.real += 1;
        }
    }
}

/// Counts per browser, in the order requested, plus their sum.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportStats {
    pub browsers: IndexMap<String, SupportCounts>,
    pub all: SupportCounts,
    pub features: usize,
}

/// Collects statistics for `browsers` (every known browser when empty)
/// over the features below `entry_points`.
pub fn collect_stats(tree: &Tree, browsers: &[&str], entry_points: &[&str]) -> Result<SupportStats, WalkError> {
    let ids: Vec<String> = if browsers.is_empty() {
        tree.browsers().keys().cloned().collect()
    } else {
        browsers.iter().map(|b| b.to_string()).collect()
    };

    let mut stats = SupportStats::default();
    for id in &ids {
        stats.browsers.insert(id.clone(), SupportCounts::default());
    }

    for step in walk(tree, entry_points)? {
        stats.features += 1;
        for (id, counts) in stats.browsers.iter_mut() {
            counts.record(step.compat.support.get(id));
        }
    }

    let mut all = SupportCounts::default();
    for counts in stats.browsers.values() {
        all.add(counts);
    }
    stats.all = all;
    Ok(stats)
}

const TABLE_TEMPLATE: &str = "\
| browser | real values | ranged values | `true` values | `null` values |
| --- | --- | --- | --- | --- |
{{#each rows}}
| {{name}} | {{cell real total}} | {{cell ranged total}} | {{cell supported total}} | {{cell unknown total}} |
{{/each}}
";

/// Writes a count, or its share of `total` when rendering percentages.
struct CellHelper {
    percent: bool,
}

impl HelperDef for CellHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let value = h.param(0).and_then(|v| v.value().as_u64()).unwrap_or(0);
        let total = h.param(1).and_then(|v| v.value().as_u64()).unwrap_or(0);

        if self.percent {
            let share = if total == 0 { 0.0 } else { value as f64 * 100.0 / total as f64 };
            out.write(&format!("{share:.2}%"))?;
        } else {
            out.write(&value.to_string())?;
        }
        Ok(())
    }
}

/// Renders the statistics as a markdown table.
pub fn render_markdown(stats: &SupportStats, percent: bool) -> Result<String, BcdError> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_helper("cell", Box::new(CellHelper { percent }));

    let row = |name: &str, counts: &SupportCounts| {
        json!({
            "name": name,
            "real": counts.real,
            "ranged": counts.ranged,
            "supported": counts.true_values,
            "unknown": counts.null_values,
            "total": counts.total(),
        })
    };
    let mut rows: Vec<_> = stats.browsers.iter().map(|(name, counts)| row(name, counts)).collect();
    rows.push(row("Total", &stats.all));

    handlebars
        .render_template(TABLE_TEMPLATE, &json!({ "rows": rows }))
        .map_err(|e| BcdError::SerializeError(format!("render error: {e}")))
}
