//! # Zoolog CLI (`zlog`)
//!
//! The `zlog` binary maintains and queries the post archive. It provides
//! commands for database initialization, full-archive rebuilds, filtered
//! and searchable listings, single-post navigation, search suggestions,
//! and archive statistics.
//!
//! ## Usage
//!
//! ```bash
//! zlog --config ./config/zoolog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `zlog init` | Create the SQLite database and run schema migrations |
//! | `zlog rebuild` | Re-extract every post file and rebuild the archive |
//! | `zlog posts` | List posts with filters, search, and pagination |
//! | `zlog post <id>` | Show one post with previous/next navigation |
//! | `zlog suggest <prefix>` | Suggest search terms for a prefix |
//! | `zlog timeline` | Per-month post counts for timeline rendering |
//! | `zlog stats` | Archive-wide summary statistics |
//!
//! Query commands accept `--json` to emit the structured result shapes
//! directly for downstream presentation layers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use zoolog::config;
use zoolog::db;
use zoolog::engine::{QueryEngine, QueryError};
use zoolog::filter::{PageRequest, PostFilter};
use zoolog::ingest;
use zoolog::migrate;
use zoolog::models::{CategoryFilter, PostDetail, PostPage};

/// Zoolog — a searchable chronological archive for short personal log
/// posts.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with the database path, the posts directory, and query limits.
#[derive(Parser)]
#[command(
    name = "zlog",
    about = "Zoolog — a searchable chronological archive for short personal log posts",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/zoolog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Shared filter flags for `posts` and `post`.
#[derive(clap::Args, Debug, Clone)]
struct FilterArgs {
    /// Filter by category: A, D, AHNS, J, or US (the A+D union).
    #[arg(long)]
    category: Option<String>,

    /// Only posts on or after this date (YYYY-MM-DD).
    #[arg(long)]
    start_date: Option<String>,

    /// Only posts on or before this date (YYYY-MM-DD, inclusive).
    #[arg(long)]
    end_date: Option<String>,

    /// Full-text search term. FTS operators are stripped before matching.
    #[arg(long)]
    search: Option<String>,
}

impl FilterArgs {
    fn into_filter(self) -> anyhow::Result<PostFilter> {
        let category = match self.category.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(CategoryFilter::parse(raw).ok_or_else(|| {
                anyhow::anyhow!("unknown category: {} (expected A, D, AHNS, J, or US)", raw)
            })?),
            None => None,
        };

        Ok(PostFilter {
            category,
            start_date: self.start_date,
            end_date: self.end_date,
            search: self.search,
        })
    }
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file, the posts table, the FTS5 shadow
    /// index with its sync triggers, and the secondary indexes. This
    /// command is idempotent — running it multiple times is safe.
    Init,

    /// Re-extract every post file and rebuild the archive from scratch.
    ///
    /// Wipes all stored posts (the FTS index follows via triggers) and
    /// re-indexes the posts directory in one transaction. Malformed files
    /// are skipped and reported, never fatal. Safe to re-run.
    Rebuild,

    /// List posts with optional filters, search, and pagination.
    Posts {
        #[command(flatten)]
        filter: FilterArgs,

        /// Page size (clamped to the configured maximum).
        #[arg(long)]
        limit: Option<i64>,

        /// Number of matching posts to skip.
        #[arg(long)]
        offset: Option<i64>,

        /// Emit the structured result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show a single post with previous/next navigation.
    ///
    /// Takes the same filter flags as `posts` so that previous/next thread
    /// through the same virtual result set the listing produced.
    Post {
        /// Post id.
        id: i64,

        #[command(flatten)]
        filter: FilterArgs,

        /// Emit the structured result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Suggest search terms for a prefix (at least 2 characters).
    Suggest {
        /// Query prefix.
        query: String,

        /// Emit the structured result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Per-month post counts for timeline rendering.
    Timeline {
        /// Emit the structured result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Archive-wide summary statistics.
    Stats {
        /// Emit the structured result as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Rebuild => {
            ingest::run_rebuild(&cfg).await?;
        }
        Commands::Posts {
            filter,
            limit,
            offset,
            json,
        } => {
            let filter = filter.into_filter()?;
            let pool = db::connect(&cfg).await?;
            let engine = QueryEngine::new(pool, cfg.query);
            let page = engine
                .list_posts(&filter, &PageRequest { limit, offset })
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print_page(&page);
            }
        }
        Commands::Post { id, filter, json } => {
            let filter = filter.into_filter()?;
            let pool = db::connect(&cfg).await?;
            let engine = QueryEngine::new(pool, cfg.query);
            match engine.get_post(id, &filter).await {
                Ok(detail) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&detail)?);
                    } else {
                        print_detail(&detail);
                    }
                }
                Err(QueryError::NotFound(id)) => {
                    eprintln!("Error: post not found: {}", id);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Suggest { query, json } => {
            let pool = db::connect(&cfg).await?;
            let engine = QueryEngine::new(pool, cfg.query);
            let suggestions = engine.suggestions(&query).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else if suggestions.is_empty() {
                println!("No suggestions.");
            } else {
                for suggestion in &suggestions {
                    println!("{}", suggestion);
                }
            }
        }
        Commands::Timeline { json } => {
            let pool = db::connect(&cfg).await?;
            let engine = QueryEngine::new(pool, cfg.query);
            let view = engine.timeline().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_timeline(&view);
            }
        }
        Commands::Stats { json } => {
            let pool = db::connect(&cfg).await?;
            let engine = QueryEngine::new(pool, cfg.query);
            let stats = engine.stats().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
    }

    Ok(())
}

fn print_page(page: &PostPage) {
    println!(
        "{} post(s) total, showing {} (limit {}, offset {})",
        page.total,
        page.posts.len(),
        page.limit,
        page.offset
    );
    for post in &page.posts {
        println!(
            "{:>5}  {}  [{:<4}]  {}",
            post.id, post.date, post.category, post.title
        );
    }
}

fn print_detail(detail: &PostDetail) {
    let post = &detail.post;
    println!("--- Post {} ---", post.id);
    println!("date:     {}", post.date);
    println!("category: {}", post.category);
    println!("title:    {}", post.title);
    println!("file:     {}", post.filename);
    println!();
    println!("{}", post.content);
    println!();

    if let Some(ref prev) = detail.prev {
        println!("prev: {} {} ({})", prev.id, prev.date, prev.title);
    }
    if let Some(ref next) = detail.next {
        println!("next: {} {} ({})", next.id, next.date, next.title);
    }
    if let Some(ref terms) = detail.search_terms {
        println!("search terms: {}", terms.join(" "));
    }
}

fn print_timeline(view: &zoolog::models::TimelineView) {
    println!(
        "  {:<8} {:>5} {:>5} {:>5} {:>5} {:>5} {:>6}",
        "MONTH", "A", "D", "AHNS", "J", "US", "TOTAL"
    );
    for (month, bucket) in &view.timeline {
        println!(
            "  {:<8} {:>5} {:>5} {:>5} {:>5} {:>5} {:>6}",
            month, bucket.a, bucket.d, bucket.ahns, bucket.j, bucket.us, bucket.total
        );
    }
    if let Some(ref range) = view.date_range {
        println!();
        println!("  range: {} to {}", range.start, range.end);
    }
}

fn print_stats(stats: &zoolog::models::ArchiveStats) {
    println!("Zoolog — Archive Stats");
    println!("======================");
    println!();
    println!("  Total posts: {}", stats.total_posts);

    if !stats.categories.is_empty() {
        println!();
        println!("  By category:");
        for (category, count) in &stats.categories {
            println!("    {:<5} {}", category, count);
        }
    }

    if let Some(ref range) = stats.date_range {
        println!();
        println!("  Date range:  {} to {}", range.start, range.end);
    }

    if !stats.yearly_counts.is_empty() {
        println!();
        println!("  By year:");
        for (year, count) in &stats.yearly_counts {
            println!("    {:<5} {}", year, count);
        }
    }

    println!();
}
