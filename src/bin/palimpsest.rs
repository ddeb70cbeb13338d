//! # Palimpsest CLI - compare archived and live pages
//!
//! A command-line interface for the palimpsest comparison engine.
//!
//! ## Features
//! - Compare two saved HTML documents word-by-word
//! - Write both annotated renderings plus the metadata diff table
//! - Decode and print CDX snapshot listings
//!
//! ## Usage
//! ```bash
//! # Compare a saved snapshot against a saved live page
//! palimpsest compare archived.html current.html -o out/
//!
//! # Inspect a CDX listing saved from the archive's API
//! palimpsest listing snapshots.json --limit 10
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use palimpsest::{archive, compare_documents, CompareOptions, ComparisonReport};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Palimpsest CLI - word-level diffing of archived and live web pages
#[derive(Parser)]
#[command(name = "palimpsest")]
#[command(version)]
#[command(about = "Compare an archived snapshot of a page against its live version")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two saved HTML documents
    #[command(alias = "cmp")]
    Compare {
        /// Path to the archived snapshot markup
        archived: PathBuf,

        /// Path to the current page markup
        current: PathBuf,

        /// Directory for the annotated output files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Word-overlap threshold for fuzzy pairing
        #[arg(long)]
        threshold: Option<f64>,

        /// Keep archive-service toolbar/footer chrome in the snapshot
        #[arg(long)]
        keep_chrome: bool,
    },

    /// Decode a saved CDX snapshot listing
    #[command(alias = "ls")]
    Listing {
        /// Path to the CDX JSON payload
        file: PathBuf,

        /// Show at most this many snapshots
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compare {
            archived,
            current,
            output,
            threshold,
            keep_chrome,
        } => cmd_compare(&archived, &current, &output, threshold, keep_chrome),
        Commands::Listing { file, limit } => cmd_listing(&file, limit),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "palimpsest=debug"
    } else {
        "palimpsest=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

fn cmd_compare(
    archived: &Path,
    current: &Path,
    output: &Path,
    threshold: Option<f64>,
    keep_chrome: bool,
) -> anyhow::Result<()> {
    let archived_markup = fs::read_to_string(archived)
        .with_context(|| format!("reading archived markup from {}", archived.display()))?;
    let current_markup = fs::read_to_string(current)
        .with_context(|| format!("reading current markup from {}", current.display()))?;

    let mut options = CompareOptions {
        strip_archive_chrome: !keep_chrome,
        ..Default::default()
    };
    if let Some(threshold) = threshold {
        options.similarity_threshold = threshold;
    }

    let report = compare_documents(&archived_markup, &current_markup, &options)
        .context("comparison failed")?;

    fs::create_dir_all(output)?;
    fs::write(output.join("archived.diff.html"), &report.archived_html)?;
    fs::write(output.join("current.diff.html"), &report.current_html)?;
    fs::write(output.join("meta.diff.html"), &report.meta_table_html)?;

    print_report(&report, output);
    Ok(())
}

fn print_report(report: &ComparisonReport, output: &Path) {
    let score = format!("{}%", report.similarity);
    let score = match report.similarity {
        80..=100 => score.green().bold(),
        50..=79 => score.yellow().bold(),
        _ => score.red().bold(),
    };
    println!("Similarity: {score}");

    let stats = &report.stats;
    println!(
        "Text:   {} anchored, {} reworded, {} removed, {} added",
        stats.anchored.to_string().bold(),
        (stats.word_diffed + stats.degraded_pairs).to_string().bold(),
        stats.leaves_removed.to_string().red(),
        stats.leaves_added.to_string().green(),
    );
    println!(
        "Images: {} removed, {} added",
        stats.images_removed.to_string().red(),
        stats.images_added.to_string().green(),
    );
    println!("Meta:   {} changed", stats.meta_changed.to_string().bold());
    if !stats.has_changes() {
        println!("{}", "No differences found.".green());
    }
    println!(
        "Wrote {}, {}, {}",
        output.join("archived.diff.html").display(),
        output.join("current.diff.html").display(),
        output.join("meta.diff.html").display(),
    );
}

fn cmd_listing(file: &Path, limit: Option<usize>) -> anyhow::Result<()> {
    let payload = fs::read_to_string(file)
        .with_context(|| format!("reading listing from {}", file.display()))?;
    let snapshots = archive::parse_cdx_listing(&payload).context("decoding CDX listing")?;

    println!(
        "Total results found: {}",
        snapshots.len().to_string().bold()
    );
    let shown = limit.unwrap_or(snapshots.len());
    for snapshot in snapshots.iter().take(shown) {
        let when = snapshot
            .captured_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| snapshot.timestamp.clone());
        println!(
            "{}  {}  {:>5}  {}",
            when.cyan(),
            snapshot.statuscode,
            snapshot.length,
            snapshot.url
        );
    }
    if shown < snapshots.len() {
        println!("... and {} more", snapshots.len() - shown);
    }
    Ok(())
}
