//! The read-side query engine.
//!
//! Answers filtered, paginated, and navigable queries over the archive
//! store, plus search suggestions and whole-archive aggregates. Every
//! operation is stateless and runs against pool-scoped reads. Ordering is
//! chronological everywhere: `date ASC, id ASC` for listings, nearest date
//! on either side for navigation. Relevance never orders results, so a
//! result set reads the same with or without a search term.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::config::QueryConfig;
use crate::filter::{bind_args, ConditionSet, PageRequest, PostFilter};
use crate::models::{
    AdjacentPost, ArchiveStats, DateRange, PostDetail, PostFull, PostPage, PostSummary,
    TimelineBucket, TimelineView,
};
use crate::sanitize::sanitize_match_query;

/// Suggestion queries shorter than this return nothing (usability floor).
const SUGGESTION_MIN_CHARS: usize = 2;
/// Suggested tokens must be longer than this.
const SUGGESTION_MIN_TOKEN_CHARS: usize = 2;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("post not found: {0}")]
    NotFound(i64),
    #[error("archive store unavailable: {0}")]
    Store(#[from] sqlx::Error),
}

/// Read-only query interface over the archive store.
///
/// Owns a connection pool and the pagination limits fixed at construction;
/// safe to share across concurrent callers.
pub struct QueryEngine {
    pool: SqlitePool,
    limits: QueryConfig,
}

enum Direction {
    Prev,
    Next,
}

impl Direction {
    fn comparison(&self) -> &'static str {
        match self {
            Direction::Prev => "posts.date < ?",
            Direction::Next => "posts.date > ?",
        }
    }

    fn ordering(&self) -> &'static str {
        match self {
            Direction::Prev => "posts.date DESC, posts.id DESC",
            Direction::Next => "posts.date ASC, posts.id ASC",
        }
    }
}

impl QueryEngine {
    pub fn new(pool: SqlitePool, limits: QueryConfig) -> Self {
        Self { pool, limits }
    }

    /// Filtered, paginated listing in stable chronological order.
    ///
    /// `total` always reflects the full filtered count, independent of
    /// pagination. A search term that sanitizes to empty short-circuits to
    /// an empty page rather than submitting an empty MATCH expression.
    pub async fn list_posts(
        &self,
        filter: &PostFilter,
        page: &PageRequest,
    ) -> Result<PostPage, QueryError> {
        let (limit, offset) = page.clamp(&self.limits);
        let conditions = ConditionSet::from_filter(filter);

        let match_expr = match active_search(filter) {
            Some(raw) => {
                let sanitized = sanitize_match_query(raw);
                if sanitized.is_empty() {
                    return Ok(PostPage::empty(limit, offset));
                }
                Some(sanitized)
            }
            None => None,
        };

        let (fetch_sql, count_sql) = match match_expr {
            Some(_) => (
                format!(
                    "SELECT posts.id, posts.filename, posts.date, posts.category, posts.title, \
                     posts.excerpt, posts.year, posts.month, posts.day \
                     FROM posts_fts JOIN posts ON posts.id = posts_fts.rowid \
                     WHERE posts_fts MATCH ?{} \
                     ORDER BY posts.date ASC, posts.id ASC LIMIT ? OFFSET ?",
                    conditions.and_clause()
                ),
                format!(
                    "SELECT COUNT(*) FROM posts_fts JOIN posts ON posts.id = posts_fts.rowid \
                     WHERE posts_fts MATCH ?{}",
                    conditions.and_clause()
                ),
            ),
            None => (
                format!(
                    "SELECT id, filename, date, category, title, excerpt, year, month, day \
                     FROM posts{} ORDER BY date ASC, id ASC LIMIT ? OFFSET ?",
                    conditions.where_clause()
                ),
                format!("SELECT COUNT(*) FROM posts{}", conditions.where_clause()),
            ),
        };

        let mut fetch = sqlx::query(&fetch_sql);
        if let Some(ref expr) = match_expr {
            fetch = fetch.bind(expr.as_str());
        }
        fetch = bind_args(fetch, conditions.args());
        let rows = fetch
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let posts = rows.iter().map(summary_from_row).collect();

        let mut count = sqlx::query(&count_sql);
        if let Some(ref expr) = match_expr {
            count = count.bind(expr.as_str());
        }
        count = bind_args(count, conditions.args());
        let total: i64 = count.fetch_one(&self.pool).await?.get(0);

        Ok(PostPage {
            posts,
            total,
            limit,
            offset,
        })
    }

    /// Single post plus previous/next within the same filter/search
    /// context the caller was browsing.
    pub async fn get_post(&self, id: i64, filter: &PostFilter) -> Result<PostDetail, QueryError> {
        let row = sqlx::query(
            "SELECT id, filename, date, category, title, content, excerpt, year, month, day \
             FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(QueryError::NotFound(id))?;

        let post = full_from_row(&row);
        let conditions = ConditionSet::from_filter(filter);
        let raw_search = active_search(filter);

        let (prev, next) = match raw_search {
            Some(raw) => {
                let sanitized = sanitize_match_query(raw);
                if sanitized.is_empty() {
                    // Sanitization consumed the whole query: no context to
                    // navigate within.
                    (None, None)
                } else {
                    (
                        self.adjacent_fts(&sanitized, &conditions, &post.date, Direction::Prev)
                            .await?,
                        self.adjacent_fts(&sanitized, &conditions, &post.date, Direction::Next)
                            .await?,
                    )
                }
            }
            None => (
                self.adjacent_plain(&conditions, &post.date, Direction::Prev)
                    .await?,
                self.adjacent_plain(&conditions, &post.date, Direction::Next)
                    .await?,
            ),
        };

        // Raw terms, for caller-side highlighting
        let search_terms =
            raw_search.map(|s| s.split_whitespace().map(str::to_string).collect());

        Ok(PostDetail {
            post,
            prev,
            next,
            search_terms,
        })
    }

    async fn adjacent_plain(
        &self,
        conditions: &ConditionSet,
        date: &str,
        direction: Direction,
    ) -> Result<Option<AdjacentPost>, QueryError> {
        let sql = format!(
            "SELECT posts.id, posts.title, posts.date FROM posts WHERE {}{} ORDER BY {} LIMIT 1",
            direction.comparison(),
            conditions.and_clause(),
            direction.ordering()
        );

        let mut query = sqlx::query(&sql).bind(date);
        query = bind_args(query, conditions.args());
        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(adjacent_from_row))
    }

    async fn adjacent_fts(
        &self,
        match_expr: &str,
        conditions: &ConditionSet,
        date: &str,
        direction: Direction,
    ) -> Result<Option<AdjacentPost>, QueryError> {
        let sql = format!(
            "SELECT posts.id, posts.title, posts.date \
             FROM posts_fts JOIN posts ON posts.id = posts_fts.rowid \
             WHERE posts_fts MATCH ? AND {}{} ORDER BY {} LIMIT 1",
            direction.comparison(),
            conditions.and_clause(),
            direction.ordering()
        );

        let mut query = sqlx::query(&sql).bind(match_expr).bind(date);
        query = bind_args(query, conditions.args());
        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(adjacent_from_row))
    }

    /// Distinct lowercase tokens drawn from posts whose title or body
    /// loosely contains the query. Set semantics; callers must not depend
    /// on ordering.
    pub async fn suggestions(&self, query: &str) -> Result<Vec<String>, QueryError> {
        let query = query.trim();
        if query.chars().count() < SUGGESTION_MIN_CHARS {
            return Ok(Vec::new());
        }

        let cap = self.limits.suggestion_limit.max(1) as usize;
        let pattern = format!("%{}%", query);
        let rows = sqlx::query(
            "SELECT title, content FROM posts WHERE title LIKE ? OR content LIKE ? LIMIT ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(self.limits.suggestion_limit)
        .fetch_all(&self.pool)
        .await?;

        let needle = query.to_lowercase();
        let mut suggestions = BTreeSet::new();
        'rows: for row in &rows {
            let title: String = row.get("title");
            let content: String = row.get("content");
            let text = format!("{} {}", title, content).to_lowercase();
            for token in text.split_whitespace() {
                if token.contains(&needle) && token.chars().count() > SUGGESTION_MIN_TOKEN_CHARS {
                    suggestions.insert(token.to_string());
                    if suggestions.len() >= cap {
                        break 'rows;
                    }
                }
            }
        }

        Ok(suggestions.into_iter().collect())
    }

    /// Per-month category count matrix, with `US` synthesized as `A + D`
    /// alongside the raw counts.
    pub async fn timeline(&self) -> Result<TimelineView, QueryError> {
        let rows = sqlx::query(
            "SELECT year, month, category, COUNT(*) AS count FROM posts \
             GROUP BY year, month, category ORDER BY year, month",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut timeline: BTreeMap<String, TimelineBucket> = BTreeMap::new();
        for row in &rows {
            let year: i64 = row.get("year");
            let month: i64 = row.get("month");
            let category: String = row.get("category");
            let count: i64 = row.get("count");

            let bucket = timeline.entry(format!("{}-{:02}", year, month)).or_default();
            match category.as_str() {
                "A" => {
                    bucket.a += count;
                    bucket.us += count;
                }
                "D" => {
                    bucket.d += count;
                    bucket.us += count;
                }
                "AHNS" => bucket.ahns += count,
                "J" => bucket.j += count,
                _ => {}
            }
            bucket.total += count;
        }

        Ok(TimelineView {
            timeline,
            date_range: self.date_range().await?,
        })
    }

    /// Flat whole-archive summary.
    pub async fn stats(&self) -> Result<ArchiveStats, QueryError> {
        let total_posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query("SELECT category, COUNT(*) AS count FROM posts GROUP BY category")
            .fetch_all(&self.pool)
            .await?;

        let mut categories: BTreeMap<String, i64> = BTreeMap::new();
        let mut us = 0i64;
        for row in &rows {
            let category: String = row.get("category");
            let count: i64 = row.get("count");
            if category == "A" || category == "D" {
                us += count;
            }
            categories.insert(category, count);
        }
        // Individual A and D counts stay; US is the display-time merge
        categories.insert("US".to_string(), us);

        let year_rows =
            sqlx::query("SELECT year, COUNT(*) AS count FROM posts GROUP BY year ORDER BY year")
                .fetch_all(&self.pool)
                .await?;
        let yearly_counts = year_rows
            .iter()
            .map(|row| (row.get::<i64, _>("year"), row.get::<i64, _>("count")))
            .collect();

        Ok(ArchiveStats {
            total_posts,
            categories,
            date_range: self.date_range().await?,
            yearly_counts,
        })
    }

    async fn date_range(&self) -> Result<Option<DateRange>, QueryError> {
        let row = sqlx::query("SELECT MIN(date) AS min_date, MAX(date) AS max_date FROM posts")
            .fetch_one(&self.pool)
            .await?;
        let start: Option<String> = row.get("min_date");
        let end: Option<String> = row.get("max_date");
        Ok(match (start, end) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        })
    }
}

/// A search parameter that is present but blank is no search at all.
fn active_search(filter: &PostFilter) -> Option<&str> {
    filter.search.as_deref().filter(|s| !s.trim().is_empty())
}

fn summary_from_row(row: &SqliteRow) -> PostSummary {
    PostSummary {
        id: row.get("id"),
        filename: row.get("filename"),
        date: row.get("date"),
        category: row.get("category"),
        title: row.get("title"),
        excerpt: row.get("excerpt"),
        year: row.get("year"),
        month: row.get("month"),
        day: row.get("day"),
    }
}

fn adjacent_from_row(row: &SqliteRow) -> AdjacentPost {
    AdjacentPost {
        id: row.get("id"),
        title: row.get("title"),
        date: row.get("date"),
    }
}

fn full_from_row(row: &SqliteRow) -> PostFull {
    PostFull {
        id: row.get("id"),
        filename: row.get("filename"),
        date: row.get("date"),
        category: row.get("category"),
        title: row.get("title"),
        content: row.get("content"),
        excerpt: row.get("excerpt"),
        year: row.get("year"),
        month: row.get("month"),
        day: row.get("day"),
    }
}
