//! Core data types for the zoolog archive.
//!
//! These types represent extracted post records, the projections returned
//! by the query engine, and the aggregate views used for timeline and
//! stats rendering.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Stored post category.
///
/// This is the closed set of values that may appear in the `category`
/// column. `US` is deliberately absent: it exists only as the query-time
/// union of `A` and `D` (see [`CategoryFilter::Us`]) and as a display-time
/// count merge in the aggregate views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    A,
    D,
    #[serde(rename = "AHNS")]
    Ahns,
    J,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::A => "A",
            Category::D => "D",
            Category::Ahns => "AHNS",
            Category::J => "J",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Category::A),
            "D" => Some(Category::D),
            "AHNS" => Some(Category::Ahns),
            "J" => Some(Category::J),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category selector accepted by queries. `Us` expands to `A OR D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    Stored(Category),
    Us,
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Option<Self> {
        if s == "US" {
            Some(CategoryFilter::Us)
        } else {
            Category::parse(s).map(CategoryFilter::Stored)
        }
    }
}

/// Structured record produced by the extractor, ready for insertion.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub filename: String,
    pub date: NaiveDate,
    pub category: Category,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Listing projection: everything a browse view needs, minus the body.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub filename: String,
    pub date: String,
    pub category: String,
    pub title: String,
    pub excerpt: String,
    pub year: i64,
    pub month: i64,
    pub day: i64,
}

/// One page of listing results plus the pagination echo.
///
/// `total` counts every record matching the filter, independent of
/// `limit`/`offset`.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub posts: Vec<PostSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PostPage {
    pub fn empty(limit: i64, offset: i64) -> Self {
        Self {
            posts: Vec::new(),
            total: 0,
            limit,
            offset,
        }
    }
}

/// Full post row, returned by the single-post lookup.
#[derive(Debug, Clone, Serialize)]
pub struct PostFull {
    pub id: i64,
    pub filename: String,
    pub date: String,
    pub category: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub year: i64,
    pub month: i64,
    pub day: i64,
}

/// Neighbor reference for previous/next navigation.
#[derive(Debug, Clone, Serialize)]
pub struct AdjacentPost {
    pub id: i64,
    pub title: String,
    pub date: String,
}

/// Single post plus its neighbors within the active filter/search context.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostFull,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<AdjacentPost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<AdjacentPost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_terms: Option<Vec<String>>,
}

/// Per-month category counts for timeline rendering. `us` mirrors the
/// display-time merge: it counts `A` and `D` posts, which also keep their
/// own columns.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TimelineBucket {
    #[serde(rename = "A")]
    pub a: i64,
    #[serde(rename = "D")]
    pub d: i64,
    #[serde(rename = "AHNS")]
    pub ahns: i64,
    #[serde(rename = "J")]
    pub j: i64,
    #[serde(rename = "US")]
    pub us: i64,
    pub total: i64,
}

/// Archive-wide min/max post dates.
#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Timeline matrix keyed by `YYYY-MM`.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineView {
    pub timeline: BTreeMap<String, TimelineBucket>,
    pub date_range: Option<DateRange>,
}

/// Flat archive summary.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveStats {
    pub total_posts: i64,
    pub categories: BTreeMap<String, i64>,
    pub date_range: Option<DateRange>,
    pub yearly_counts: BTreeMap<i64, i64>,
}
