//! Fingerprint cookie construction and lookup.

use axum::http::{HeaderMap, header::COOKIE};
use axum_extra::extract::cookie::Cookie;

use crate::config::{CookieConfig, Environment};

/// Builds the `Set-Cookie` value carrying the raw fingerprint.
///
/// Always `HttpOnly`; `Secure` per [`CookieConfig::is_secure`].
#[must_use]
pub fn fingerprint_cookie(
    config: &CookieConfig,
    environment: Environment,
    fingerprint: String,
) -> Cookie<'static> {
    let max_age = time::Duration::try_from(config.max_age).unwrap_or(time::Duration::MAX);

    let mut builder = Cookie::build((config.name.clone(), fingerprint))
        .http_only(true)
        .secure(config.is_secure(environment))
        .path(config.path.clone())
        .max_age(max_age);
    if let Some(domain) = &config.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// Reads the fingerprint cookie from the request's `Cookie` headers.
///
/// The first pair with the configured name wins, across headers in order.
/// Values are percent-decoded and lose surrounding double quotes. Pairs that
/// do not parse are skipped.
#[must_use]
pub fn fingerprint_from_headers(headers: &HeaderMap, config: &CookieConfig) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse_encoded)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == config.name)
        .map(|cookie| cookie.value_trimmed().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::time::Duration;

    #[test]
    fn test_cookie_attributes() {
        let config = CookieConfig {
            domain: Some(".predictablexp.com".to_string()),
            ..CookieConfig::default()
        };
        let cookie = fingerprint_cookie(&config, Environment::Production, "abc123".to_string());

        assert_eq!(cookie.name(), "fingerprint");
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.domain(), Some("predictablexp.com"));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(8)));
    }

    #[test]
    fn test_cookie_not_secure_in_development() {
        let cookie = fingerprint_cookie(
            &CookieConfig::default(),
            Environment::Development,
            "abc123".to_string(),
        );
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.domain(), None);

        let rendered = cookie.to_string();
        assert!(rendered.contains("HttpOnly"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn test_custom_max_age() {
        let config = CookieConfig {
            max_age: Duration::from_secs(90),
            ..CookieConfig::default()
        };
        let cookie = fingerprint_cookie(&config, Environment::Development, "x".to_string());
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(90)));
    }

    fn cookie_headers(values: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(COOKIE, HeaderValue::from_static(value));
        }
        headers
    }

    fn read(values: &[&'static str]) -> Option<String> {
        fingerprint_from_headers(&cookie_headers(values), &CookieConfig::default())
    }

    #[test]
    fn test_fingerprint_from_headers() {
        assert_eq!(
            read(&["theme=dark; fingerprint=abc123; other=1"]).as_deref(),
            Some("abc123")
        );
        assert_eq!(read(&[]), None);
        assert_eq!(read(&["theme=dark"]), None);
        assert_eq!(read(&["fingerprint="]).as_deref(), Some(""));
    }

    #[test]
    fn test_quoted_value_is_unquoted() {
        assert_eq!(read(&[r#"fingerprint="abc123""#]).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_first_duplicate_wins() {
        assert_eq!(
            read(&["fingerprint=abc123; fingerprint=other"]).as_deref(),
            Some("abc123")
        );
        assert_eq!(
            read(&["theme=dark", "fingerprint=first", "fingerprint=second"]).as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_percent_encoded_value_is_decoded() {
        assert_eq!(read(&["fingerprint=a%20b"]).as_deref(), Some("a b"));
    }
}
