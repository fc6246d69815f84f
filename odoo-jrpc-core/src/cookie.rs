//! Session cookie extraction
//!
//! Only the `session_id` pair matters to the client. This is deliberately not
//! a cookie-jar: attributes such as `Path`, `Expires` or `HttpOnly` are
//! ignored and the stored value is echoed back verbatim in a `Cookie` header.

/// Prefix of the cookie segment that carries the Odoo session
pub const SESSION_COOKIE_PREFIX: &str = "session_id=";

/// Find the `session_id=<value>` segment of a `Set-Cookie` header value
///
/// Splits on `;`, trims each segment and returns the first one that starts
/// with `session_id=`.
///
/// # Examples
///
/// ```rust
/// use odoo_jrpc_core::find_session_cookie;
///
/// assert_eq!(
///     find_session_cookie(Some("session_id=abc123; Path=/; HttpOnly")),
///     Some("session_id=abc123".to_string())
/// );
/// assert_eq!(find_session_cookie(None), None);
/// ```
pub fn find_session_cookie(header: Option<&str>) -> Option<String> {
    header?
        .split(';')
        .map(str::trim)
        .find(|segment| segment.starts_with(SESSION_COOKIE_PREFIX))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_attribute_cookie() {
        assert_eq!(
            find_session_cookie(Some("session_id=abc123; Path=/; HttpOnly")),
            Some("session_id=abc123".to_string())
        );
    }

    #[test]
    fn test_session_id_not_first() {
        let header = "frontend_lang=en_US; session_id=f00; Expires=Wed, 21 Oct 2026 07:28:00 GMT";
        assert_eq!(find_session_cookie(Some(header)), Some("session_id=f00".to_string()));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(find_session_cookie(None), None);
    }

    #[test]
    fn test_no_session_segment() {
        assert_eq!(find_session_cookie(Some("tz=UTC; Path=/")), None);
        assert_eq!(find_session_cookie(Some("")), None);
    }

    #[test]
    fn test_prefix_must_match_exactly() {
        assert_eq!(find_session_cookie(Some("old_session_id=x; Path=/")), None);
    }

    #[test]
    fn test_empty_session_value_is_kept() {
        // An empty value is still a session segment.
        assert_eq!(
            find_session_cookie(Some("session_id=; Path=/")),
            Some("session_id=".to_string())
        );
    }
}
