//! FTS MATCH-query sanitizer.
//!
//! User-supplied search text goes straight into an FTS5 `MATCH` expression,
//! whose query language accepts column filters, boolean operators, prefix
//! stars, and grouping. This pure pass neutralizes all of that so a search
//! box can only ever express a bag of plain terms.

/// Characters with structural meaning in the FTS5 query dialect.
const CONTROL_CHARS: [char; 6] = ['*', '(', ')', ':', '"', '-'];

/// Boolean operator tokens, removed only as whole words.
const OPERATORS: [&str; 4] = ["AND", "OR", "NOT", "NEAR"];

/// Sanitize a raw search string for use as an FTS5 MATCH expression.
///
/// Strips control characters, drops whole-word boolean operators
/// (case-insensitive), collapses whitespace runs, and trims. Idempotent.
/// The result may be empty; callers must treat that as "no query" and
/// short-circuit rather than submit an empty MATCH expression.
pub fn sanitize_match_query(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .map(|c| if CONTROL_CHARS.contains(&c) { ' ' } else { c })
        .collect();

    stripped
        .split_whitespace()
        .filter(|word| !OPERATORS.iter().any(|op| word.eq_ignore_ascii_case(op)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_query_untouched() {
        assert_eq!(sanitize_match_query("beach picnic"), "beach picnic");
    }

    #[test]
    fn test_control_syntax_stripped() {
        assert_eq!(sanitize_match_query("foo AND bar* (baz)"), "foo bar baz");
    }

    #[test]
    fn test_operators_removed_case_insensitive() {
        assert_eq!(sanitize_match_query("a and b OR c NeAr d not e"), "a b c d e");
    }

    #[test]
    fn test_operators_kept_inside_words() {
        // "android" contains AND, "nearly" contains NEAR; neither is a
        // whole-word operator
        assert_eq!(sanitize_match_query("android nearly"), "android nearly");
    }

    #[test]
    fn test_column_filter_neutralized() {
        assert_eq!(sanitize_match_query("category:AHNS"), "category AHNS");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(sanitize_match_query("  foo \t bar\n baz  "), "foo bar baz");
    }

    #[test]
    fn test_can_become_empty() {
        assert_eq!(sanitize_match_query("AND OR NOT NEAR"), "");
        assert_eq!(sanitize_match_query("*()\"-:"), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "foo AND bar* (baz)",
            "  spaced   out  ",
            "\"phrase query\"",
            "android nearly",
            "",
        ];
        for input in inputs {
            let once = sanitize_match_query(input);
            assert_eq!(sanitize_match_query(&once), once, "input: {:?}", input);
        }
    }
}
