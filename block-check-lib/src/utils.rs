//! Small helpers shared across the library.

use chrono::Utc;

/// Build the URL a worker navigates to for a target domain.
///
/// The scheme is always `https`, prepended to the stored domain value as-is.
pub fn target_url(domain: &str) -> String {
    format!("https://{}", domain)
}

/// Current UTC time, second precision, fixed layout `YYYY-MM-DDTHH:MM:SS`.
pub fn utc_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_always_prepends_https() {
        assert_eq!(target_url("example.com"), "https://example.com");
        // No scheme detection: the stored value is used verbatim
        assert_eq!(target_url("http://example.com"), "https://http://example.com");
    }

    #[test]
    fn test_utc_timestamp_layout() {
        let ts = utc_timestamp();
        // YYYY-MM-DDTHH:MM:SS is exactly 19 characters
        assert_eq!(ts.len(), 19);
        assert_eq!(ts.as_bytes()[4], b'-');
        assert_eq!(ts.as_bytes()[10], b'T');
        assert_eq!(ts.as_bytes()[13], b':');
        assert!(!ts.contains('.'), "no sub-second precision: {}", ts);
    }
}
