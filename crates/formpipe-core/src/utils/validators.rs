//! Shape checks for submitted values.

use regex::Regex;
use std::sync::OnceLock;

/// Returns whether `s` has the shape of an email address.
///
/// Accepts dotted or quoted local parts and either a dotted domain with an
/// alphabetic TLD or a bracketed IPv4 literal.
///
/// # Examples
///
/// ```
/// use formpipe_core::utils::validators::is_email_address;
///
/// assert!(is_email_address("jane.doe@example.com"));
/// assert!(is_email_address("ops@[192.168.0.1]"));
/// assert!(!is_email_address("jane@localhost"));
/// assert!(!is_email_address("not an email"));
/// ```
pub fn is_email_address(s: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let email_re = EMAIL_RE.get_or_init(|| {
        Regex::new(
            r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
        )
        .expect("valid regex")
    });
    email_re.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        assert!(is_email_address("a@b.co"));
        assert!(is_email_address("first.last+tag@sub.example.org"));
        assert!(is_email_address("\"odd name\"@example.com"));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!is_email_address(""));
        assert!(!is_email_address("@example.com"));
        assert!(!is_email_address("a@b"));
        assert!(!is_email_address("a..b@example.com"));
        assert!(!is_email_address("a b@example.com"));
        assert!(!is_email_address("a@example.c"));
    }
}
