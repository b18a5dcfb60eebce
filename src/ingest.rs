//! Posts-directory scan and full-archive rebuild.
//!
//! The rebuild is the only writer in the system: it wipes every stored
//! post inside one transaction (the FTS index follows via triggers) and
//! re-inserts whatever the extractor accepts. Malformed files are counted
//! and reported, never fatal to the batch, and re-running on unchanged
//! sources produces the same archive.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use sqlx::SqlitePool;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::config::Config;
use crate::db;
use crate::extract::{extract_post, ExtractError};
use crate::models::PostRecord;

/// A candidate post file found by the scan.
#[derive(Debug, Clone)]
pub struct PostFile {
    pub filename: String,
    pub path: PathBuf,
}

/// Outcome counts for one rebuild run.
#[derive(Debug, Default)]
pub struct RebuildReport {
    pub scanned: usize,
    pub indexed: usize,
    /// Skipped files with the reason each was rejected.
    pub skipped: Vec<(String, String)>,
}

/// Scan the posts directory for files matching the include globs.
/// Sorted by filename for deterministic ordering.
pub fn scan_posts(config: &Config) -> Result<Vec<PostFile>> {
    let root = &config.posts.dir;
    if !root.exists() {
        bail!("posts directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.posts.include_globs)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let filename = entry.file_name().to_string_lossy().to_string();
        if !include_set.is_match(&filename) {
            continue;
        }

        files.push(PostFile {
            filename,
            path: entry.path().to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.filename.cmp(&b.filename));

    Ok(files)
}

/// Wipe and re-index the whole archive in one transaction.
pub async fn rebuild(pool: &SqlitePool, config: &Config) -> Result<RebuildReport> {
    let files = scan_posts(config)?;
    let mut report = RebuildReport {
        scanned: files.len(),
        ..Default::default()
    };

    let mut tx = pool.begin().await?;

    // The delete trigger retracts every FTS entry along with its row
    sqlx::query("DELETE FROM posts").execute(&mut *tx).await?;

    for file in &files {
        let raw = match std::fs::read_to_string(&file.path) {
            Ok(raw) => raw,
            Err(e) => {
                let reason = ExtractError::MalformedContent(e.to_string()).to_string();
                report.skipped.push((file.filename.clone(), reason));
                continue;
            }
        };

        match extract_post(&file.filename, &raw) {
            Ok(record) => {
                insert_post(&mut tx, &record).await?;
                report.indexed += 1;
            }
            Err(e) => report.skipped.push((file.filename.clone(), e.to_string())),
        }
    }

    tx.commit().await?;
    Ok(report)
}

async fn insert_post(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    record: &PostRecord,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO posts (filename, date, category, title, content, excerpt, year, month, day)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(filename) DO UPDATE SET
            date = excluded.date,
            category = excluded.category,
            title = excluded.title,
            content = excluded.content,
            excerpt = excluded.excerpt,
            year = excluded.year,
            month = excluded.month,
            day = excluded.day
        "#,
    )
    .bind(&record.filename)
    .bind(record.date.format("%Y-%m-%d").to_string())
    .bind(record.category.as_str())
    .bind(&record.title)
    .bind(&record.content)
    .bind(&record.excerpt)
    .bind(record.year as i64)
    .bind(record.month as i64)
    .bind(record.day as i64)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// CLI entry point: run a rebuild and print the summary.
pub async fn run_rebuild(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let report = rebuild(&pool, config).await?;

    println!("rebuild {}", config.posts.dir.display());
    println!("  scanned: {} files", report.scanned);
    println!("  indexed: {} posts", report.indexed);
    println!("  skipped: {}", report.skipped.len());
    for (filename, reason) in &report.skipped {
        println!("    {}: {}", filename, reason);
    }
    println!("ok");

    pool.close().await;
    Ok(())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
