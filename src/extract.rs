//! Post record extraction.
//!
//! Turns a post filename plus raw file content into a structured
//! [`PostRecord`], or a typed rejection. Filenames follow the
//! `YYYY-MM-DD-<category-marker>-YYYY-MM-DD.txt` convention; bodies are
//! quoted-printable transport text whose first line, when it starts with
//! `#`, duplicates metadata already captured structurally and is dropped.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::models::{Category, PostRecord};

const TITLE_CHARS: usize = 50;
const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed filename: {0}")]
    MalformedFilename(String),
    #[error("no category marker in filename: {0}")]
    UncategorizedFilename(String),
    #[error("unreadable content: {0}")]
    MalformedContent(String),
}

/// Extract a structured record from a post file.
pub fn extract_post(filename: &str, raw: &str) -> Result<PostRecord, ExtractError> {
    let date = parse_filename_date(filename)?;
    let category = detect_category(filename)?;

    let content = clean_content(raw);
    let title = derive_title(&content, date, category);
    let excerpt = derive_excerpt(&content);

    Ok(PostRecord {
        filename: filename.to_string(),
        date,
        category,
        title,
        content,
        excerpt,
        year: date.year(),
        month: date.month(),
        day: date.day(),
    })
}

/// Parse the leading `YYYY-MM-DD` out of the filename. The name must carry
/// at least six hyphen-delimited segments once the `.txt` suffix is gone.
fn parse_filename_date(filename: &str) -> Result<NaiveDate, ExtractError> {
    let stem = filename.strip_suffix(".txt").unwrap_or(filename);
    let parts: Vec<&str> = stem.split('-').collect();
    if parts.len() < 6 {
        return Err(ExtractError::MalformedFilename(filename.to_string()));
    }

    let date_str = format!("{}-{}-{}", parts[0], parts[1], parts[2]);
    NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| ExtractError::MalformedFilename(filename.to_string()))
}

/// Category precedence: `AHNS` beats `J` beats `-D-` beats `-A-`. A name
/// matching none of the markers is unindexable; relabeling it would put a
/// fifth value into the four-value stored domain.
fn detect_category(filename: &str) -> Result<Category, ExtractError> {
    if filename.contains("AHNS") {
        Ok(Category::Ahns)
    } else if filename.contains('J') {
        Ok(Category::J)
    } else if filename.contains("-D-") {
        Ok(Category::D)
    } else if filename.contains("-A-") {
        Ok(Category::A)
    } else {
        Err(ExtractError::UncategorizedFilename(filename.to_string()))
    }
}

/// Decode quoted-printable (best effort; the raw text survives any decode
/// or UTF-8 failure) and strip the leading `#` metadata line.
pub fn clean_content(raw: &str) -> String {
    let decoded =
        match quoted_printable::decode(raw.as_bytes(), quoted_printable::ParseMode::Robust) {
            Ok(bytes) => String::from_utf8(bytes).unwrap_or_else(|_| raw.to_string()),
            Err(_) => raw.to_string(),
        };

    let mut lines: Vec<&str> = decoded.trim().lines().collect();
    if lines.first().is_some_and(|line| line.starts_with('#')) {
        lines.remove(0);
    }

    lines.join("\n").trim().to_string()
}

fn derive_title(content: &str, date: NaiveDate, category: Category) -> String {
    if content.is_empty() {
        return format!("{} {}", date.format("%Y-%m-%d"), category);
    }

    let prefix: String = content.chars().take(TITLE_CHARS).collect();
    let mut title = prefix.replace('\n', " ").trim().to_string();
    if content.chars().count() > TITLE_CHARS {
        title.push_str("...");
    }
    title
}

fn derive_excerpt(content: &str) -> String {
    if content.chars().count() > EXCERPT_CHARS {
        let prefix: String = content.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", prefix)
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_filename_yields_consistent_record() {
        let record =
            extract_post("2020-03-04-A-2020-03-04.txt", "# 2020-03-04 A\n\nHello.").unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2020, 3, 4).unwrap());
        assert_eq!(record.year, 2020);
        assert_eq!(record.month, 3);
        assert_eq!(record.day, 4);
        assert_eq!(record.category, Category::A);
        assert_eq!(record.content, "Hello.");
    }

    #[test]
    fn test_too_few_segments_rejected() {
        let err = extract_post("2020-03-04.txt", "body").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedFilename(_)));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let err = extract_post("2020-13-40-A-2020-13-40.txt", "body").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedFilename(_)));
    }

    #[test]
    fn test_category_precedence() {
        // AHNS wins even though the name also matches the D marker
        let record = extract_post("2020-01-01-AHNS-D-2020-01-01.txt", "x").unwrap();
        assert_eq!(record.category, Category::Ahns);

        let record = extract_post("2020-01-01-J-2020-01-01.txt", "x").unwrap();
        assert_eq!(record.category, Category::J);

        let record = extract_post("2020-01-01-D-2020-01-01.txt", "x").unwrap();
        assert_eq!(record.category, Category::D);

        let record = extract_post("2020-01-01-A-2020-01-01.txt", "x").unwrap();
        assert_eq!(record.category, Category::A);
    }

    #[test]
    fn test_unmatched_marker_rejected() {
        let err = extract_post("2020-01-01-X-2020-01-01.txt", "x").unwrap_err();
        assert!(matches!(err, ExtractError::UncategorizedFilename(_)));
    }

    #[test]
    fn test_quoted_printable_decoded() {
        let record = extract_post(
            "2020-01-01-A-2020-01-01.txt",
            "# meta\n\nit=20was=20sunny",
        )
        .unwrap();
        assert_eq!(record.content, "it was sunny");
    }

    #[test]
    fn test_broken_quoted_printable_survives_unchanged() {
        // "=ZZ" is not a valid escape; the raw text must survive unchanged
        let record = extract_post("2020-01-01-A-2020-01-01.txt", "odd =ZZ text").unwrap();
        assert_eq!(record.content, "odd =ZZ text");
    }

    #[test]
    fn test_non_utf8_decode_falls_back_to_raw() {
        // "=FF" decodes to a byte that is not valid UTF-8
        let record = extract_post("2020-01-01-A-2020-01-01.txt", "caf=FF").unwrap();
        assert_eq!(record.content, "caf=FF");
    }

    #[test]
    fn test_leading_metadata_line_stripped() {
        let record = extract_post(
            "2020-01-01-A-2020-01-01.txt",
            "# 2020-01-01 A\n\nThe real body.",
        )
        .unwrap();
        assert_eq!(record.content, "The real body.");
        assert_eq!(record.title, "The real body.");
    }

    #[test]
    fn test_title_truncated_with_ellipsis() {
        let body = "a".repeat(80);
        let record = extract_post("2020-01-01-A-2020-01-01.txt", &body).unwrap();
        assert_eq!(record.title, format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn test_title_flattens_newlines() {
        let record = extract_post("2020-01-01-A-2020-01-01.txt", "one\ntwo").unwrap();
        assert_eq!(record.title, "one two");
    }

    #[test]
    fn test_empty_body_synthesizes_title() {
        let record = extract_post("2020-01-01-A-2020-01-01.txt", "# only metadata").unwrap();
        assert_eq!(record.content, "");
        assert_eq!(record.title, "2020-01-01 A");
        assert_eq!(record.excerpt, "");
    }

    #[test]
    fn test_excerpt_truncated_with_ellipsis() {
        let body = "b".repeat(250);
        let record = extract_post("2020-01-01-A-2020-01-01.txt", &body).unwrap();
        assert_eq!(record.excerpt, format!("{}...", "b".repeat(200)));
    }
}
