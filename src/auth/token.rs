use axum::http::HeaderMap;
use log::warn;

/// Header carrying the shared operator token.
pub const TOKEN_HEADER: &str = "token";

// Extract the shared token from the `token` header
pub fn extract_token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub struct TokenValidator {
    expected: String,
}

impl TokenValidator {
    pub fn new(expected: &str) -> Self {
        Self {
            expected: expected.to_string(),
        }
    }

    pub fn validate(&self, token: &str) -> bool {
        let expected = self.expected.as_bytes();
        let given = token.as_bytes();
        if expected.is_empty() || expected.len() != given.len() {
            return false;
        }
        // Compare every byte so timing does not leak the matching prefix
        expected.iter().zip(given).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
    }

    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        match extract_token_from_headers(headers) {
            Some(token) if self.validate(token) => true,
            Some(_) => {
                warn!("Request with invalid token");
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
        headers
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token_from_headers(&headers(" secret ")), Some("secret"));
        assert_eq!(extract_token_from_headers(&headers("")), None);
        assert_eq!(extract_token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_validate() {
        let validator = TokenValidator::new("secret");
        assert!(validator.validate("secret"));
        assert!(!validator.validate("secreT"));
        assert!(!validator.validate("secret2"));
        assert!(!validator.validate(""));
    }

    #[test]
    fn test_empty_expected_token_never_matches() {
        let validator = TokenValidator::new("");
        assert!(!validator.validate(""));
        assert!(!validator.is_authorized(&headers("x")));
    }

    #[test]
    fn test_is_authorized() {
        let validator = TokenValidator::new("secret");
        assert!(validator.is_authorized(&headers("secret")));
        assert!(!validator.is_authorized(&headers("nope")));
        assert!(!validator.is_authorized(&HeaderMap::new()));
    }
}
