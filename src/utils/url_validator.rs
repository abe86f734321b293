//! Absolute URL validation.
//!
//! Submitted URLs are stored verbatim; this module only decides whether a
//! string is an absolute URL with both a scheme and a host.

use url::Url;

/// Reasons a submitted URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("URL has no scheme")]
    MissingScheme,

    #[error("URL has no host")]
    MissingHost,
}

/// Checks that `input` parses as an absolute URL with a scheme and a host.
///
/// The parser silently drops tabs and newlines and trims surrounding spaces, so
/// those are refused up front: an accepted input is exactly what gets stored
/// and later sent back as a `Location` header.
///
/// # Errors
///
/// - [`UrlValidationError::InvalidFormat`] if the input has control characters or
///   surrounding whitespace, or parsing fails (relative input such as
///   `example.com` lands here)
/// - [`UrlValidationError::MissingScheme`] / [`UrlValidationError::MissingHost`]
///   for parsed URLs lacking either part (e.g. `mailto:a@b.c`)
pub fn validate_url(input: &str) -> Result<Url, UrlValidationError> {
    if input.chars().any(char::is_control) {
        return Err(UrlValidationError::InvalidFormat(
            "contains control characters".to_string(),
        ));
    }
    if input.trim() != input {
        return Err(UrlValidationError::InvalidFormat(
            "leading or trailing whitespace".to_string(),
        ));
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    if url.scheme().is_empty() {
        return Err(UrlValidationError::MissingScheme);
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlValidationError::MissingHost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/path?q=1#frag").is_ok());
    }

    #[test]
    fn test_accepts_other_schemes_with_host() {
        assert!(validate_url("ftp://files.example.com/pub").is_ok());
    }

    #[test]
    fn test_rejects_missing_scheme() {
        assert!(matches!(
            validate_url("example.com"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert!(validate_url("/relative/path").is_err());
    }

    #[test]
    fn test_rejects_missing_host() {
        assert_eq!(
            validate_url("mailto:someone@example.com"),
            Err(UrlValidationError::MissingHost)
        );
        assert_eq!(
            validate_url("file:///etc/passwd"),
            Err(UrlValidationError::MissingHost)
        );
    }

    #[test]
    fn test_rejects_empty_and_garbage() {
        assert!(validate_url("").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("http://").is_err());
        assert!(validate_url("https://example.com/a\nb").is_err());
    }

    #[test]
    fn test_rejects_input_the_parser_would_rewrite() {
        for input in [
            "https://example.com/a\nb",
            "https://example.com/a\tb",
            "https://exa\rmple.com",
            " https://example.com",
            "https://example.com ",
            "https://example.com/\u{7f}",
        ] {
            assert!(
                matches!(validate_url(input), Err(UrlValidationError::InvalidFormat(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_accepted_input_survives_as_header_value() {
        let input = "https://example.com/a%20b?q=a b";
        assert!(validate_url(input).is_ok());
        assert!(axum::http::HeaderValue::try_from(input).is_ok());
    }
}
