// Curation commands for browser compat data

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use bcd_canon::{
    fix_dir, mirror_tree, remove_flags_in_tree, FlagDisposition, FlagPruner, FlagRemovalRule, IdentifierFirst,
    MirrorMode, PruneOptions,
};
use bcd_cli::{
    collect_stats, documents_under, render_markdown, rewrite_documents, traverse, write_release, CurationConfig,
    TraverseOptions,
};
use bcd_core::loader::load_dir;
use bcd_core::walk::UNLIMITED_DEPTH;
use bcd_core::{Tree, TracingSink};
use bcd_lint::{LintProfile, Linter};

#[derive(Parser)]
#[command(name = "bcd")]
#[command(about = "Browser compat data curation tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (defaults to ./bcd.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Dataset root, overriding the config file
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the dataset for errors
    Lint {
        /// Only run these rules
        #[arg(short, long = "rule")]
        rules: Vec<String>,

        /// Lint profile (standard, relaxed) replacing the configured one
        #[arg(short, long)]
        profile: Option<String>,

        /// Date to judge obsolescence against (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite every document into canonical form
    Fix,

    /// Drop flags that a long-shipped release made redundant
    PruneFlags {
        /// Only prune this browser
        #[arg(short, long)]
        browser: Option<String>,

        /// Months a flag must have been redundant for
        #[arg(short, long)]
        months: Option<u32>,

        /// Date the cutoff is counted from (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Remove flag data of one browser, or apply the configured removals
    RemoveFlags {
        /// Browser whose flags go away
        #[arg(short, long)]
        browser: Option<String>,

        /// What happened to the flagged features
        #[arg(long, value_enum, default_value = "unsupported")]
        disposition: Disposition,

        /// Feature path prefixes to limit the removal to
        #[arg(short, long)]
        scope: Vec<String>,
    },

    /// Copy a browser's data from its upstream
    Mirror {
        /// Destination browser
        browser: String,

        /// Feature path to start at
        #[arg(short, long)]
        path: Option<String>,

        /// When to overwrite existing data (nonreal, bool, always)
        #[arg(short, long)]
        mode: Option<MirrorMode>,
    },

    /// Show how much of the data is real
    Stats {
        /// Browsers to count (all by default)
        browsers: Vec<String>,

        /// Feature paths to start at
        #[arg(short, long = "path")]
        paths: Vec<String>,

        /// Show percentages instead of counts
        #[arg(long)]
        percent: bool,
    },

    /// List features holding given support values
    Traverse {
        /// Feature paths to start at
        paths: Vec<String>,

        /// Browsers to inspect (all by default)
        #[arg(short, long = "browser")]
        browsers: Vec<String>,

        /// Values to look for: null, true, false or a version
        #[arg(short = 'f', long = "value")]
        values: Vec<String>,

        /// Levels below each start path to descend
        #[arg(long)]
        depth: Option<usize>,

        /// Mark matches made through a prefix or alternative name
        #[arg(short, long)]
        annotate: bool,
    },

    /// Build the release bundle and its manifest
    Release {
        /// Version written to the bundle metadata
        #[arg(long)]
        version: String,

        /// Output directory
        #[arg(short, long, default_value = "build")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Disposition {
    Unsupported,
    Unflag,
}

impl From<Disposition> for FlagDisposition {
    fn from(value: Disposition) -> Self {
        match value {
            Disposition::Unsupported => FlagDisposition::Unsupported,
            Disposition::Unflag => FlagDisposition::Unflag,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = CurationConfig::discover(cli.config.as_deref()).context("loading configuration")?;
    if let Some(data) = cli.data {
        config.data_root = data;
    }

    match cli.command {
        Commands::Lint { rules, profile, today, json } => lint(&config, &rules, profile.as_deref(), today, json),
        Commands::Fix => fix(&config),
        Commands::PruneFlags { browser, months, today } => prune_flags(&config, browser, months, today),
        Commands::RemoveFlags { browser, disposition, scope } => remove_flags(&config, browser, disposition, scope),
        Commands::Mirror { browser, path, mode } => mirror(&config, &browser, path.as_deref(), mode),
        Commands::Stats { browsers, paths, percent } => stats(&config, &browsers, &paths, percent),
        Commands::Traverse { paths, browsers, values, depth, annotate } => {
            let mut options = TraverseOptions {
                browsers,
                entry_points: paths,
                depth: depth.unwrap_or(UNLIMITED_DEPTH),
                annotate,
                ..TraverseOptions::default()
            };
            if !values.is_empty() {
                options.values = values;
            }
            list_features(&config, &options)
        }
        Commands::Release { version, out } => release(&config, &version, &out),
    }
}

fn load_tree(config: &CurationConfig) -> Result<Tree> {
    load_dir(&config.data_root, &config.category_refs())
        .with_context(|| format!("loading dataset from {}", config.data_root.display()))
}

fn today_or_now(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Utc::now().date_naive())
}

fn lint(
    config: &CurationConfig,
    rules: &[String],
    profile: Option<&str>,
    today: Option<NaiveDate>,
    json: bool,
) -> Result<ExitCode> {
    let profile = profile.map(LintProfile::for_name).unwrap_or_else(|| config.lint.clone());
    let mut linter = Linter::new(profile);
    if !rules.is_empty() {
        let names: Vec<&str> = rules.iter().map(String::as_str).collect();
        linter = linter.only(&names)?;
    }

    let report = linter.lint_dir(&config.data_root, &config.category_refs(), today_or_now(today))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for diagnostic in report.diagnostics() {
            println!("{diagnostic}");
        }
        println!("{}: {} ({} documents, {} features)", report.verdict, report.summary, report.documents, report.features);
    }

    Ok(if report.is_failure() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn fix(config: &CurationConfig) -> Result<ExitCode> {
    let summary = fix_dir(&config.data_root, &config.category_refs(), &IdentifierFirst)?;
    for file in &summary.changed {
        println!("fixed {}", file.display());
    }
    for (file, reason) in &summary.failed {
        println!("cannot fix {}: {reason}", file.display());
    }
    Ok(if summary.failed.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn prune_flags(
    config: &CurationConfig,
    browser: Option<String>,
    months: Option<u32>,
    today: Option<NaiveDate>,
) -> Result<ExitCode> {
    let browsers = load_tree(config)?.browsers();
    let mut options = PruneOptions::months_before(today_or_now(today), months.unwrap_or(config.prune_cutoff_months));
    if let Some(browser) = browser {
        if !browsers.contains_key(&browser) {
            bail!("unknown browser: {browser}");
        }
        options = options.limit_to(browser);
    }
    info!(cutoff = %options.cutoff, "pruning flags");

    let pruner = FlagPruner::new(&browsers, options);
    let mut sink = TracingSink::default();
    let documents = documents_under(&config.data_root, &config.category_refs(), None)?;
    let written = rewrite_documents(&documents, |_, tree| Ok(pruner.prune_tree(tree, &mut sink)?))?;
    report_written(&written);
    Ok(ExitCode::SUCCESS)
}

fn remove_flags(
    config: &CurationConfig,
    browser: Option<String>,
    disposition: Disposition,
    scope: Vec<String>,
) -> Result<ExitCode> {
    let rules = match browser {
        Some(browser) => vec![FlagRemovalRule { browser, scope, disposition: disposition.into() }],
        None if config.flag_removals.is_empty() => bail!("no browser given and no flag_removals configured"),
        None => config.flag_removals.clone(),
    };

    let documents = documents_under(&config.data_root, &config.category_refs(), None)?;
    let written = rewrite_documents(&documents, |_, tree| {
        let mut changed = 0;
        for rule in &rules {
            changed += remove_flags_in_tree(tree, rule)?;
        }
        Ok(changed)
    })?;
    report_written(&written);
    Ok(ExitCode::SUCCESS)
}

fn mirror(config: &CurationConfig, browser: &str, path: Option<&str>, mode: Option<MirrorMode>) -> Result<ExitCode> {
    let browsers = load_tree(config)?.browsers();
    let mode = mode.unwrap_or(config.mirror_mode);

    let documents = documents_under(&config.data_root, &config.category_refs(), path)?;
    if documents.is_empty() {
        bail!("no data found at {}", path.unwrap_or("the dataset root"));
    }
    let written = rewrite_documents(&documents, |_, tree| Ok(mirror_tree(tree, &browsers, browser, path, mode)?))?;
    report_written(&written);
    Ok(ExitCode::SUCCESS)
}

fn stats(config: &CurationConfig, browsers: &[String], paths: &[String], percent: bool) -> Result<ExitCode> {
    let tree = load_tree(config)?;
    let browsers: Vec<&str> = browsers.iter().map(String::as_str).collect();
    let paths: Vec<&str> = paths.iter().map(String::as_str).collect();

    let stats = collect_stats(&tree, &browsers, &paths)?;
    println!("{} features", stats.features);
    print!("{}", render_markdown(&stats, percent)?);
    Ok(ExitCode::SUCCESS)
}

fn list_features(config: &CurationConfig, options: &TraverseOptions) -> Result<ExitCode> {
    let tree = load_tree(config)?;
    let found = traverse(&tree, options)?;
    for path in &found {
        println!("{path}");
    }
    println!("{} features", found.len());
    Ok(ExitCode::SUCCESS)
}

fn release(config: &CurationConfig, version: &str, out: &Path) -> Result<ExitCode> {
    let tree = load_tree(config)?;
    let manifest = write_release(&tree, out, version, Utc::now())?;
    println!("{} ({} bytes, {} features)", manifest.digest, manifest.bytes, manifest.features);
    Ok(ExitCode::SUCCESS)
}

fn report_written(written: &[PathBuf]) {
    for file in written {
        println!("updated {}", file.display());
    }
    println!("{} documents updated", written.len());
}
