//! # CLI Module
//!
//! Command-line interface for the scan and deduplication engine.
//!
//! ## Usage
//! ```bash
//! # Scan one or more directories for duplicates
//! photo-dedup scan ~/Photos
//!
//! # Include hidden files, use a custom cache location
//! photo-dedup scan ~/Photos --include-hidden --cache ~/.cache/photo-dedup/hashes.db
//!
//! # JSON output for scripting
//! photo-dedup scan ~/Photos --output json
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use crate::core::cache::{open_with_fallback, CacheBackend};
use crate::core::scanner::DiscoverConfig;
use crate::core::{LogicalPhoto, ScanOrchestrator};
use crate::error::Result;
use crate::events::{Event, EventChannel, Phase};

/// The scan and deduplication engine - find exact-duplicate photos without fear
#[derive(Parser, Debug)]
#[command(name = "photo-dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan directories for duplicate photos
    Scan {
        /// Directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Include hidden files and directories
        #[arg(long)]
        include_hidden: bool,

        /// Follow symlinks during traversal
        #[arg(long)]
        follow_symlinks: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Hash cache database path
        #[arg(long)]
        cache: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (duplicate paths only, one per line)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            paths,
            output,
            include_hidden,
            follow_symlinks,
            verbose,
            cache,
        } => run_scan(paths, output, include_hidden, follow_symlinks, verbose, cache),
    }
}

fn run_scan(
    paths: Vec<PathBuf>,
    output: OutputFormat,
    include_hidden: bool,
    follow_symlinks: bool,
    verbose: bool,
    cache_path: Option<PathBuf>,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Photo Dedup").bold().cyan(),
            style(env!("CARGO_PKG_VERSION")).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let cache_path = cache_path.unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("photo-dedup")
            .join("hashes.db")
    });

    let cache: Box<dyn CacheBackend> = open_with_fallback(&cache_path);

    let discover_config = DiscoverConfig {
        follow_symlinks,
        include_hidden,
        ..DiscoverConfig::default()
    };

    let orchestrator = ScanOrchestrator::new(cache).with_discover_config(discover_config);

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose_clone = verbose;

    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            if let Event::ScanProgress(p) = event {
                if let Some(ref pb) = progress_clone {
                    if p.total > 0 {
                        pb.set_length(p.total as u64);
                        pb.set_position(p.current as u64);
                    }
                    let message = if p.message.is_empty() {
                        format!("{}", p.phase)
                    } else {
                        p.message.clone()
                    };
                    pb.set_message(message);
                    if verbose_clone {
                        pb.println(format!("{}", p.phase));
                    }
                    if matches!(p.phase, Phase::Complete | Phase::Cancelled) {
                        pb.finish_and_clear();
                    }
                }
            }
        }
    });

    let started = std::time::Instant::now();
    let photos = orchestrator.scan_with_events(paths, &sender)?;
    let duration_ms = started.elapsed().as_millis();

    drop(sender);
    event_thread.join().ok();

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &photos, duration_ms, verbose),
        OutputFormat::Json => print_json_results(&photos, duration_ms),
        OutputFormat::Minimal => print_minimal_results(&photos),
    }

    Ok(())
}

/// Group annotated photos by keeper id for display purposes.
fn duplicate_groups(photos: &[LogicalPhoto]) -> Vec<Vec<&LogicalPhoto>> {
    let mut by_keeper: HashMap<&str, Vec<&LogicalPhoto>> = HashMap::new();

    for photo in photos {
        if let Some(keeper_id) = &photo.duplicate_of {
            by_keeper.entry(keeper_id.as_str()).or_default().push(photo);
        }
    }

    for photo in photos {
        if let Some(members) = by_keeper.get_mut(photo.id.as_str()) {
            members.push(photo);
        }
    }

    by_keeper.into_values().collect()
}

fn print_pretty_results(term: &Term, photos: &[LogicalPhoto], duration_ms: u128, verbose: bool) {
    let groups = duplicate_groups(photos);
    let duplicate_count = photos.iter().filter(|p| p.is_duplicate).count();
    let savings: u64 = photos
        .iter()
        .filter(|p| p.is_duplicate)
        .map(|p| p.size)
        .sum();

    term.write_line("").ok();
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} photos scanned in {:.1}s",
        style(photos.len()).cyan(),
        duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate groups found",
        style(groups.len()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate photos",
        style(duplicate_count).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} potential space savings",
        style(format_bytes(savings)).yellow()
    ))
    .ok();
    term.write_line("").ok();

    if groups.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("done").green()))
            .ok();
        return;
    }

    term.write_line(&format!("{}", style("Duplicate Groups:").bold()))
        .ok();
    term.write_line("").ok();

    for (i, group) in groups.iter().enumerate() {
        let group_size: u64 = group.iter().map(|p| p.size).sum();
        term.write_line(&format!(
            "  {} ({} files, {})",
            style(format!("Group {}:", i + 1)).bold(),
            group.len(),
            format_bytes(group_size)
        ))
        .ok();

        for photo in group {
            let marker = if photo.is_duplicate {
                style("○").dim().to_string()
            } else {
                style("★").green().to_string()
            };
            term.write_line(&format!("    {} {}", marker, photo.primary.path.display()))
                .ok();
        }

        if verbose {
            term.write_line(&format!(
                "    {} keep the starred (★) photo",
                style("recommended:").dim()
            ))
            .ok();
        }

        term.write_line("").ok();
    }

    term.write_line(&format!(
        "{}",
        style("No files were deleted. Review carefully before taking action.").dim()
    ))
    .ok();
}

fn print_json_results(photos: &[LogicalPhoto], duration_ms: u128) {
    let groups = duplicate_groups(photos);
    let duplicate_count = photos.iter().filter(|p| p.is_duplicate).count();
    let savings: u64 = photos
        .iter()
        .filter(|p| p.is_duplicate)
        .map(|p| p.size)
        .sum();

    let output = serde_json::json!({
        "total_photos": photos.len(),
        "duplicate_groups": groups.len(),
        "duplicate_count": duplicate_count,
        "potential_savings_bytes": savings,
        "duration_ms": duration_ms,
        "photos": photos,
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn print_minimal_results(photos: &[LogicalPhoto]) {
    for photo in photos {
        if photo.is_duplicate {
            println!("{}", photo.primary.path.display());
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
