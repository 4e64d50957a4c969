/// Access Token Issuance and Validation
///
/// HS256-signed JWTs carrying {iss, sub, iat, exp}. Access tokens are
/// never persisted and cannot be revoked before expiry; the short TTL is
/// the sole mitigation for a leaked token.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashSet;
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::AuthSettings;
use crate::error::TokenError;

/// Issue a signed access token for a subject.
///
/// # Errors
/// Returns `TokenError::SigningFailure` if signing fails.
pub fn issue_access_token(user_id: &Uuid, config: &AuthSettings) -> Result<String, TokenError> {
    let claims = Claims::new(*user_id, config.access_token_expiry, &config.issuer);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| TokenError::SigningFailure(e.to_string()))
}

/// Validate an access token and return its subject identity.
///
/// Checks run in a fixed order: signature integrity first (no claim is
/// trusted before it), then issuer, then expiry, then subject shape. A
/// token crafted for another system is rejected before its temporal
/// claims are ever inspected.
pub fn validate_access_token(token: &str, config: &AuthSettings) -> Result<Uuid, TokenError> {
    // Claim checks happen manually below so their order is fixed;
    // jsonwebtoken only verifies the signature here.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims = HashSet::new();

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| TokenError::InvalidSignature)?;

    if claims.iss != config.issuer {
        return Err(TokenError::UnknownIssuer);
    }

    if claims.is_expired(chrono::Utc::now().timestamp()) {
        return Err(TokenError::TokenExpired);
    }

    claims.subject()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> AuthSettings {
        AuthSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "chirpy".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 5_184_000,
        }
    }

    #[test]
    fn test_issue_and_validate_token() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let token = issue_access_token(&user_id, &config).expect("Failed to issue token");
        let subject = validate_access_token(&token, &config).expect("Failed to validate token");

        assert_eq!(subject, user_id);
    }

    #[test]
    fn test_garbage_token() {
        let config = get_test_config();
        let result = validate_access_token("invalid.token.here", &config);

        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_token() {
        let config = get_test_config();
        let token = issue_access_token(&Uuid::new_v4(), &config).expect("Failed to issue token");

        let tampered = format!("{}X", token);
        assert_eq!(
            validate_access_token(&tampered, &config),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_wrong_secret() {
        let config = get_test_config();
        let token = issue_access_token(&Uuid::new_v4(), &config).expect("Failed to issue token");

        let mut other = get_test_config();
        other.secret = "a-different-secret-that-is-also-long-enough".to_string();

        assert_eq!(
            validate_access_token(&token, &other),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_wrong_issuer() {
        let mut config = get_test_config();
        config.issuer = "someone-else".to_string();
        let token = issue_access_token(&Uuid::new_v4(), &config).expect("Failed to issue token");

        assert_eq!(
            validate_access_token(&token, &get_test_config()),
            Err(TokenError::UnknownIssuer)
        );
    }

    #[test]
    fn test_expired_token() {
        // exp == iat, and exact equality counts as expired.
        let mut config = get_test_config();
        config.access_token_expiry = 0;
        let token = issue_access_token(&Uuid::new_v4(), &config).expect("Failed to issue token");

        assert_eq!(
            validate_access_token(&token, &config),
            Err(TokenError::TokenExpired)
        );
    }

    #[test]
    fn test_issuer_checked_before_expiry() {
        // Expired AND foreign-issued: issuer must win.
        let mut config = get_test_config();
        config.issuer = "someone-else".to_string();
        config.access_token_expiry = 0;
        let token = issue_access_token(&Uuid::new_v4(), &config).expect("Failed to issue token");

        assert_eq!(
            validate_access_token(&token, &get_test_config()),
            Err(TokenError::UnknownIssuer)
        );
    }

    #[test]
    fn test_malformed_subject() {
        let config = get_test_config();
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            iat: chrono::Utc::now().timestamp(),
            exp: chrono::Utc::now().timestamp() + 3600,
            iss: config.issuer.clone(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("Failed to encode claims");

        assert_eq!(
            validate_access_token(&token, &config),
            Err(TokenError::MalformedSubject)
        );
    }
}
