//! String utility functions.
//!
//! Laundering turns an arbitrary submitted JSON value into a safe, trimmed
//! string. Clamping limits a string to a number of leading characters.
//! [`split_quoted_list`] parses the comma-separated acceptance lists used by
//! email routing rules.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Removes HTML tags from a string.
///
/// Only real tags are removed: a `<` followed by a letter or `/`, up to the
/// next `>`. Comparison operators in ordinary text are left alone.
///
/// # Examples
///
/// ```
/// use formpipe_core::utils::text::strip_tags;
///
/// assert_eq!(strip_tags("<b>bold</b> move"), "bold move");
/// assert_eq!(strip_tags("a < b and c > d"), "a < b and c > d");
/// ```
pub fn strip_tags(s: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let tag_re = TAG_RE.get_or_init(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("valid regex"));
    tag_re.replace_all(s, "").into_owned()
}

/// Converts a submitted value into a trimmed string.
///
/// Strings are trimmed, numbers are rendered in their JSON form, and every
/// other value (booleans, null, arrays, objects) becomes the empty string.
/// Markup is kept as submitted.
///
/// # Examples
///
/// ```
/// use formpipe_core::utils::text::launder_string;
/// use serde_json::json;
///
/// assert_eq!(launder_string(&json!("  spring sale ")), "spring sale");
/// assert_eq!(launder_string(&json!("a < b and c > d")), "a < b and c > d");
/// assert_eq!(launder_string(&json!(42)), "42");
/// assert_eq!(launder_string(&json!(true)), "");
/// assert_eq!(launder_string(&json!(["a"])), "");
/// ```
pub fn launder_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Keeps at most `limit` leading characters of `s`.
///
/// Counts Unicode scalar values, never splitting a character.
///
/// # Examples
///
/// ```
/// use formpipe_core::utils::text::clamp_chars;
///
/// assert_eq!(clamp_chars("newsletter", 4), "news");
/// assert_eq!(clamp_chars("ok", 10), "ok");
/// assert_eq!(clamp_chars("héllo", 2), "hé");
/// ```
pub fn clamp_chars(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Splits a comma-separated list where double-quoted segments may contain
/// literal commas.
///
/// A segment is either a double-quoted run (the shortest one whose closing
/// quote is followed by a comma or the end of input, ignoring whitespace) or
/// a run of characters other than quotes and commas that is followed the same
/// way. Text that fits neither shape is skipped. Each segment is trimmed, one
/// layer of bounding double quotes is removed, and the result is trimmed
/// again. Empty segments are dropped.
///
/// There is no escape character. A quote that is never closed does not group
/// anything, and text directly before a quote does not form a segment, so
/// `say "hi", bye` yields `hi` and `bye`.
///
/// # Examples
///
/// ```
/// use formpipe_core::utils::text::split_quoted_list;
///
/// assert_eq!(
///     split_quoted_list(r#""red, bright", blue"#),
///     vec!["red, bright".to_string(), "blue".to_string()]
/// );
/// ```
pub fn split_quoted_list(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        match segment_end(&chars, pos) {
            Some(end) => {
                segments.push(chars[pos..end].iter().collect::<String>());
                pos = end;
            }
            None => pos += 1,
        }
    }

    segments
        .iter()
        .map(|segment| unquote(segment.trim()).trim().to_string())
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Returns the end of the segment starting at `start`, if one starts there.
fn segment_end(chars: &[char], start: usize) -> Option<usize> {
    if chars[start] == '"' {
        for (end, &c) in chars.iter().enumerate().skip(start + 1) {
            match c {
                '"' if at_separator(chars, end + 1) => return Some(end + 1),
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => return None,
                _ => {}
            }
        }
        return None;
    }

    let run_end = chars[start..]
        .iter()
        .position(|&c| c == '"' || c == ',')
        .map_or(chars.len(), |offset| start + offset);
    (start + 1..=run_end).rev().find(|&end| at_separator(chars, end))
}

/// Returns whether only whitespace separates `pos` from a comma or the end.
fn at_separator(chars: &[char], pos: usize) -> bool {
    chars[pos..]
        .iter()
        .find(|c| !c.is_whitespace())
        .map_or(true, |&c| c == ',')
}

fn unquote(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello</p>"), "Hello");
        assert_eq!(strip_tags("<script>alert(1)</script>x"), "alert(1)x");
        assert_eq!(strip_tags("plain"), "plain");
        assert_eq!(strip_tags("1 < 2 > 0"), "1 < 2 > 0");
        assert_eq!(strip_tags("x <= y"), "x <= y");
    }

    #[test]
    fn test_launder_string() {
        assert_eq!(launder_string(&json!("  hi  ")), "hi");
        assert_eq!(launder_string(&json!(" if a < b and c > d ")), "if a < b and c > d");
        assert_eq!(launder_string(&json!("<b>kept</b>")), "<b>kept</b>");
        assert_eq!(launder_string(&json!(3.5)), "3.5");
        assert_eq!(launder_string(&json!(null)), "");
        assert_eq!(launder_string(&json!({"a": 1})), "");
    }

    #[test]
    fn test_clamp_chars() {
        assert_eq!(clamp_chars("abcdef", 3), "abc");
        assert_eq!(clamp_chars("abc", 3), "abc");
        assert_eq!(clamp_chars("abc", 0), "");
        assert_eq!(clamp_chars("", 5), "");
        assert_eq!(clamp_chars("日本語テキスト", 3), "日本語");
    }

    #[test]
    fn test_split_plain_list() {
        assert_eq!(split_quoted_list("red, green ,blue"), vec!["red", "green", "blue"]);
    }

    #[test]
    fn test_split_quoted_segment_keeps_commas() {
        assert_eq!(
            split_quoted_list(r#""red, bright", blue"#),
            vec!["red, bright", "blue"]
        );
        assert_eq!(
            split_quoted_list(r#"  " padded "  "#),
            vec!["padded"]
        );
    }

    #[test]
    fn test_split_drops_empty_segments() {
        assert_eq!(split_quoted_list("a,,b,"), vec!["a", "b"]);
        assert!(split_quoted_list("").is_empty());
        assert!(split_quoted_list(" , ").is_empty());
        assert!(split_quoted_list(r#""""#).is_empty());
    }

    #[test]
    fn test_split_unbalanced_quote_groups_nothing() {
        assert_eq!(split_quoted_list(r#"a, "b, c"#), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_text_before_quote_is_not_a_segment() {
        assert_eq!(split_quoted_list(r#"say "hi", bye"#), vec!["hi", "bye"]);
        assert_eq!(split_quoted_list(r#"a"b,c""#), vec!["b,c"]);
    }

    #[test]
    fn test_split_quoted_segment_needs_separator_after() {
        // The first closing quote is followed by text, so the group extends
        // to the next quote that is followed by a comma.
        assert_eq!(split_quoted_list(r#""a" b", c"#), vec!["a\" b", "c"]);
    }

    #[test]
    fn test_split_backslash_is_not_an_escape() {
        // The backslash does not protect the second quote, which closes the
        // group; the third quote is never closed and groups nothing.
        assert_eq!(split_quoted_list(r#""a\", b", c"#), vec!["a\\", "c"]);
    }

    #[test]
    fn test_split_single_quote_character() {
        assert!(split_quoted_list("\"").is_empty());
    }
}
