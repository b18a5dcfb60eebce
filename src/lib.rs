//! # Zoolog
//!
//! A chronological archive of short personal log posts with full-text
//! search.
//!
//! Raw post files named `YYYY-MM-DD-<category-marker>-YYYY-MM-DD.txt` are
//! extracted into structured records and bulk-loaded into a SQLite store
//! whose FTS5 shadow index is kept in lockstep by triggers. The read side
//! answers filtered, paginated, and navigable queries (category, date
//! range, free text) in stable chronological order, plus search
//! suggestions and archive-wide statistics.
//!
//! ```text
//! posts/*.txt ──▶ extract ──▶ ingest ──▶ SQLite (posts + posts_fts)
//!                                             │
//!                                             ▼
//!                                        QueryEngine ──▶ CLI / callers
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types and result shapes |
//! | [`extract`] | Filename/body extraction into post records |
//! | [`sanitize`] | FTS MATCH-query sanitizer |
//! | [`filter`] | Filter model and shared predicate builder |
//! | [`engine`] | Listing, navigation, suggestions, aggregates |
//! | [`ingest`] | Posts-directory scan and archive rebuild |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod db;
pub mod engine;
pub mod extract;
pub mod filter;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod sanitize;
