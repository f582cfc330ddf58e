//! Lineage CLI - def-use lineage for JavaScript sources

use anyhow::Context;
use clap::{Parser, Subcommand};
use lineage::config::{self, LineageConfig};
use lineage::ignore::IgnoreFilter;
use lineage::report::{self, ReportFormat, ReportOptions};
use lineage::ui::{self, FileStatsRow, Icons};
use lineage::{GraphStats, LineageGraph, LineageTracker};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "lineage")]
#[command(version)]
#[command(about = "Scope resolution and def-use lineage for JavaScript")]
#[command(long_about = r#"
Lineage maps every identifier use to the declaration that binds it, together
with the chain of lexical scopes connecting them.

Example usage:
  lineage analyze src/app.js
  lineage analyze src --name config --format json
  lineage scopes src/app.js
  lineage stats src
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file (defaults to ./lineage.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every reference in a file or directory
    Analyze {
        /// File or directory to analyze
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,

        /// Only report declarations with this name
        #[arg(short, long)]
        name: Option<String>,

        /// Print the scope tree before the lineage
        #[arg(long)]
        scopes: bool,

        /// Leave unresolved references out of the report
        #[arg(long)]
        hide_unresolved: bool,
    },

    /// Print the scope tree of a file
    Scopes {
        /// File to analyze
        file: PathBuf,
    },

    /// Show per-file statistics
    Stats {
        /// File or directory to analyze
        path: PathBuf,
    },

    /// Write a default lineage.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Analyze { path, format, name, scopes, hide_unresolved } => {
            let format = format.unwrap_or_else(|| config.format());
            let options = ReportOptions {
                name,
                show_unresolved: config.show_unresolved() && !hide_unresolved,
                show_scopes: scopes || config.show_scopes(),
            };
            run_analyze(&path, &config, format, &options)
        }

        Commands::Scopes { file } => {
            let tracker = LineageTracker::with_extensions(&config.extensions());
            let graph = tracker
                .analyze_file(&file)
                .with_context(|| format!("failed to analyze {}", file.display()))?;

            ui::header(Icons::TREE, &format!("Scopes in {}", file.display()));
            print!("{}", report::render_scopes(&graph));
            Ok(())
        }

        Commands::Stats { path } => run_stats(&path, &config),

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &LineageConfig::with_defaults(), force)?;
            ui::success(&format!("Wrote {}", path.display()));
            Ok(())
        }
    }
}

fn run_analyze(path: &Path, config: &LineageConfig, format: ReportFormat, options: &ReportOptions) -> anyhow::Result<()> {
    let started = Instant::now();
    let tracker = LineageTracker::with_extensions(&config.extensions());
    let files = collect_files(path, &tracker, config);
    if files.is_empty() {
        ui::warn(&format!("no analyzable files under {}", path.display()));
    }

    if format == ReportFormat::Text {
        ui::header(Icons::SEARCH, &format!("Analyzing {} ({} files)", path.display(), files.len()));
    }

    let (results, failures) = analyze_all(&tracker, path, &files);

    match format {
        ReportFormat::Json => {
            // A single file prints its graph directly
            let output = if path.is_file() {
                match results.first() {
                    Some((_, graph)) => serde_json::to_value(graph)?,
                    None => serde_json::Value::Null,
                }
            } else {
                let mut all = serde_json::Map::new();
                for (relative, graph) in &results {
                    all.insert(relative.clone(), serde_json::to_value(graph)?);
                }
                serde_json::Value::Object(all)
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        ReportFormat::Text => {
            for (relative, graph) in &results {
                if files.len() > 1 {
                    ui::section(&format!("{} {}", Icons::FILE, relative));
                }
                print!("{}", report::render_text(graph, options));
            }
            ui::timing(&format!("{:.2?}", started.elapsed()));
        }
    }

    finish(failures)
}

fn run_stats(path: &Path, config: &LineageConfig) -> anyhow::Result<()> {
    let tracker = LineageTracker::with_extensions(&config.extensions());
    let files = collect_files(path, &tracker, config);
    let (results, failures) = analyze_all(&tracker, path, &files);

    let mut total = GraphStats::default();
    let rows: Vec<FileStatsRow> = results
        .iter()
        .map(|(relative, graph)| {
            let stats = graph.stats();
            total.merge(&stats);
            FileStatsRow::new(relative.clone(), &stats)
        })
        .collect();

    ui::header(Icons::STATS, &format!("Lineage statistics for {}", path.display()));
    println!("{}", ui::stats_table(&rows));
    ui::info("Files analyzed", &rows.len().to_string());
    if rows.len() > 1 {
        print!("{}", total);
    }

    finish(failures)
}

/// Analyze each file independently; failures are reported and counted
fn analyze_all(tracker: &LineageTracker, root: &Path, files: &[PathBuf]) -> (Vec<(String, LineageGraph)>, usize) {
    let mut results = Vec::new();
    let mut failures = 0;

    for file in files {
        let relative = file
            .strip_prefix(root)
            .ok()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(file)
            .display()
            .to_string();

        match tracker.analyze_file(file) {
            Ok(graph) => results.push((relative, graph)),
            Err(e) => {
                tracing::error!("Failed to analyze {}: {}", file.display(), e);
                ui::error(&format!("{}: {}", relative, e));
                failures += 1;
            }
        }
    }

    (results, failures)
}

fn finish(failures: usize) -> anyhow::Result<()> {
    if failures > 0 {
        anyhow::bail!("{} file(s) could not be analyzed", failures);
    }
    Ok(())
}

/// A single file as given, or every analyzable file below a directory
fn collect_files(path: &Path, tracker: &LineageTracker, config: &LineageConfig) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }

    let filter = IgnoreFilter::new(path, config.exclude());
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !filter.is_ignored(e.path(), e.file_type().is_dir()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && tracker.can_analyze(e.path()))
        .map(|e| e.into_path())
        .collect();

    files.sort();
    tracing::debug!(root = %path.display(), files = files.len(), "collected files");
    files
}
