use anyhow::Result;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Main posts table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT UNIQUE NOT NULL,
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            excerpt TEXT NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            day INTEGER NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Full-text shadow index over posts.
    // FTS5 CREATE is not idempotent natively, so we check first
    let fts_exists: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='posts_fts'",
    )
    .fetch_one(&pool)
    .await?;

    if !fts_exists {
        sqlx::query(
            r#"
            CREATE VIRTUAL TABLE posts_fts USING fts5(
                filename, title, content, category,
                content='posts',
                content_rowid='id'
            )
            "#,
        )
        .execute(&pool)
        .await?;
    }

    // Sync triggers. An update retracts the old entry and inserts a fresh
    // one; patching in place would leak stale terms.
    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS posts_ai AFTER INSERT ON posts BEGIN
            INSERT INTO posts_fts(rowid, filename, title, content, category)
            VALUES (new.id, new.filename, new.title, new.content, new.category);
        END
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS posts_ad AFTER DELETE ON posts BEGIN
            INSERT INTO posts_fts(posts_fts, rowid, filename, title, content, category)
            VALUES ('delete', old.id, old.filename, old.title, old.content, old.category);
        END
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS posts_au AFTER UPDATE ON posts BEGIN
            INSERT INTO posts_fts(posts_fts, rowid, filename, title, content, category)
            VALUES ('delete', old.id, old.filename, old.title, old.content, old.category);
            INSERT INTO posts_fts(rowid, filename, title, content, category)
            VALUES (new.id, new.filename, new.title, new.content, new.category);
        END
        "#,
    )
    .execute(&pool)
    .await?;

    // Secondary indexes for the range and aggregate queries
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_date ON posts(date)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_category ON posts(category)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_year_month ON posts(year, month)")
        .execute(&pool)
        .await?;

    pool.close().await;
    Ok(())
}
