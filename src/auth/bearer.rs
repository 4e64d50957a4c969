/// Bearer Credential Extraction
///
/// Pure parsing of the `Authorization: Bearer <token>` carrier. No I/O,
/// no side effects; the caller hands in whatever header value the
/// transport produced.

use crate::error::BearerError;

const BEARER_SCHEME: &str = "Bearer";

/// Extract the token from a bearer header value.
///
/// The value must split on a single space into exactly the scheme literal
/// `Bearer` (case-sensitive) and a non-empty token.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, BearerError> {
    let value = match header {
        Some(v) if !v.is_empty() => v,
        _ => return Err(BearerError::MissingCredential),
    };

    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 || parts[1].is_empty() {
        return Err(BearerError::MalformedCredential);
    }
    if parts[0] != BEARER_SCHEME {
        return Err(BearerError::UnsupportedScheme);
    }

    Ok(parts[1])
}
