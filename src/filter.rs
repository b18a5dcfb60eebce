//! Query filter model and the shared predicate builder.
//!
//! Every listing, count, and adjacency query is assembled from the same
//! ordered clause list, so the fetch and count variants of a query can
//! never drift apart. The search term is deliberately not part of the
//! clause list: `MATCH` binds against the FTS table, not `posts`, and the
//! engine handles it separately.

use chrono::NaiveDate;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use crate::config::QueryConfig;
use crate::models::CategoryFilter;

/// Filter context shared by listing and single-post navigation, so that
/// previous/next thread through the same virtual result set the listing
/// produced.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub category: Option<CategoryFilter>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
}

/// Pagination as requested by the caller, before clamping.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageRequest {
    /// Clamp to the configured bounds: limit into `1..=max_limit` (a zero
    /// or negative limit means "one", never "nothing"), offset to
    /// non-negative.
    pub fn clamp(&self, limits: &QueryConfig) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(limits.default_limit)
            .clamp(1, limits.max_limit);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Ordered list of `AND`-joined predicates plus their bind parameters.
/// Every filter parameter is textual (category codes and ISO dates).
#[derive(Debug, Default)]
pub(crate) struct ConditionSet {
    clauses: Vec<String>,
    args: Vec<String>,
}

impl ConditionSet {
    fn push<I>(&mut self, clause: &str, args: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.clauses.push(clause.to_string());
        self.args.extend(args);
    }

    /// Build the category/date conditions for `filter`.
    pub fn from_filter(filter: &PostFilter) -> Self {
        let mut set = ConditionSet::default();

        match filter.category {
            Some(CategoryFilter::Us) => set.push(
                "posts.category IN (?, ?)",
                ["A".to_string(), "D".to_string()],
            ),
            Some(CategoryFilter::Stored(cat)) => {
                set.push("posts.category = ?", [cat.as_str().to_string()])
            }
            None => {}
        }

        if let Some(start) = filter.start_date.as_deref().filter(|s| !s.is_empty()) {
            set.push("posts.date >= ?", [start.to_string()]);
        }

        if let Some(end) = filter.end_date.as_deref().filter(|s| !s.is_empty()) {
            // Inclusive end date: compare against the next calendar day.
            match NaiveDate::parse_from_str(end, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.succ_opt())
            {
                Some(next) => {
                    set.push("posts.date < ?", [next.format("%Y-%m-%d").to_string()])
                }
                // Named fallback for an unparseable end date: keep the
                // request alive with a plain inclusive compare on the raw
                // value instead of rejecting it.
                None => set.push("posts.date <= ?", [end.to_string()]),
            }
        }

        set
    }

    /// Render as ` WHERE a AND b`, or nothing when no clauses.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Render as ` AND a AND b` for appending to an existing WHERE.
    pub fn and_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" AND {}", self.clauses.join(" AND "))
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Bind the collected parameters onto a query, in clause order.
pub(crate) fn bind_args<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    args: &'q [String],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = query.bind(arg.as_str());
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_clamp_defaults() {
        let limits = QueryConfig::default();
        let (limit, offset) = PageRequest::default().clamp(&limits);
        assert_eq!(limit, 50);
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_clamp_zero_limit_means_one() {
        let limits = QueryConfig::default();
        let page = PageRequest {
            limit: Some(0),
            offset: None,
        };
        assert_eq!(page.clamp(&limits).0, 1);
    }

    #[test]
    fn test_clamp_limit_ceiling_and_negative_offset() {
        let limits = QueryConfig::default();
        let page = PageRequest {
            limit: Some(100_000),
            offset: Some(-7),
        };
        let (limit, offset) = page.clamp(&limits);
        assert_eq!(limit, 1000);
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_empty_filter_renders_nothing() {
        let set = ConditionSet::from_filter(&PostFilter::default());
        assert_eq!(set.where_clause(), "");
        assert_eq!(set.and_clause(), "");
        assert!(set.args().is_empty());
    }

    #[test]
    fn test_us_expands_to_a_or_d() {
        let set = ConditionSet::from_filter(&PostFilter {
            category: Some(CategoryFilter::Us),
            ..Default::default()
        });
        assert_eq!(set.where_clause(), " WHERE posts.category IN (?, ?)");
        assert_eq!(set.args(), ["A", "D"]);
    }

    #[test]
    fn test_stored_category_single_clause() {
        let set = ConditionSet::from_filter(&PostFilter {
            category: Some(CategoryFilter::Stored(Category::Ahns)),
            ..Default::default()
        });
        assert_eq!(set.where_clause(), " WHERE posts.category = ?");
        assert_eq!(set.args(), ["AHNS"]);
    }

    #[test]
    fn test_end_date_becomes_exclusive_next_day() {
        let set = ConditionSet::from_filter(&PostFilter {
            end_date: Some("2020-01-02".to_string()),
            ..Default::default()
        });
        assert_eq!(set.where_clause(), " WHERE posts.date < ?");
        assert_eq!(set.args(), ["2020-01-03"]);
    }

    #[test]
    fn test_unparseable_end_date_falls_back_to_inclusive_compare() {
        let set = ConditionSet::from_filter(&PostFilter {
            end_date: Some("not-a-date".to_string()),
            ..Default::default()
        });
        assert_eq!(set.where_clause(), " WHERE posts.date <= ?");
        assert_eq!(set.args(), ["not-a-date"]);
    }

    #[test]
    fn test_clause_and_arg_order_is_stable() {
        let set = ConditionSet::from_filter(&PostFilter {
            category: Some(CategoryFilter::Us),
            start_date: Some("2019-06-01".to_string()),
            end_date: Some("2020-01-02".to_string()),
            search: Some("ignored here".to_string()),
        });
        assert_eq!(
            set.where_clause(),
            " WHERE posts.category IN (?, ?) AND posts.date >= ? AND posts.date < ?"
        );
        assert_eq!(
            set.and_clause(),
            " AND posts.category IN (?, ?) AND posts.date >= ? AND posts.date < ?"
        );
        assert_eq!(set.args(), ["A", "D", "2019-06-01", "2020-01-03"]);
    }
}
