//! Bearer credential extraction
//!
//! Parses `Authorization: Bearer <token>` headers.

use axum::http::{HeaderMap, header};

/// Outcome of looking for a bearer credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BearerCredential {
    /// No `Authorization` header at all (anonymous caller)
    Absent,
    /// A well-formed bearer token
    Token(String),
    /// Header present but not `Bearer <token>`
    Malformed,
}

/// Extract the bearer token from request headers
///
/// The scheme is matched case-insensitively (RFC 7235). Any other scheme,
/// an empty token, or a non-UTF-8 value is reported as [`BearerCredential::Malformed`].
pub fn extract_bearer(headers: &HeaderMap) -> BearerCredential {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return BearerCredential::Absent;
    };

    let Ok(value) = value.to_str() else {
        return BearerCredential::Malformed;
    };

    let mut parts = value.trim().splitn(2, ' ');
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                BearerCredential::Malformed
            } else {
                BearerCredential::Token(token.to_string())
            }
        }
        _ => BearerCredential::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_absent() {
        assert_eq!(extract_bearer(&HeaderMap::new()), BearerCredential::Absent);
    }

    #[test]
    fn test_token() {
        assert_eq!(
            extract_bearer(&headers_with("Bearer abc.def.ghi")),
            BearerCredential::Token("abc.def.ghi".to_string())
        );
        assert_eq!(
            extract_bearer(&headers_with("bearer abc")),
            BearerCredential::Token("abc".to_string())
        );
    }

    #[test]
    fn test_malformed() {
        assert_eq!(extract_bearer(&headers_with("Basic dXNlcjpwYXNz")), BearerCredential::Malformed);
        assert_eq!(extract_bearer(&headers_with("Bearer")), BearerCredential::Malformed);
        assert_eq!(extract_bearer(&headers_with("Bearer   ")), BearerCredential::Malformed);
    }
}
