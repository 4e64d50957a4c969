/// Error Handling Module
///
/// Closed, tagged error types per component so callers can switch on kind
/// instead of parsing messages:
/// 1. Component-level errors (password, token, bearer, store, repository)
/// 2. The subsystem-boundary error (`SessionError`) with deliberately
///    coarse categories
/// 3. From conversions for control flow

use std::error::Error as StdError;
use std::fmt;

/// Password hashing / verification failures.
///
/// A wrong password is NOT an error; `verify_password` reports a mismatch
/// as `Ok(false)`. These variants cover infrastructure failure only.
#[derive(Debug, Clone, PartialEq)]
pub enum PasswordError {
    /// Digest computation failed (e.g. entropy source exhaustion).
    HashingFailure(String),
    /// The stored digest could not be parsed or compared.
    VerificationFailure(String),
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordError::HashingFailure(msg) => write!(f, "password hashing failed: {}", msg),
            PasswordError::VerificationFailure(msg) => {
                write!(f, "password verification failed: {}", msg)
            }
        }
    }
}

impl StdError for PasswordError {}

/// Access token issuance / validation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenError {
    /// Signature does not verify: tampered, truncated, or signed under a
    /// different key.
    InvalidSignature,
    /// The `iss` claim is not this service's issuer.
    UnknownIssuer,
    /// Current time is at or past the `exp` claim.
    TokenExpired,
    /// The `sub` claim is not a well-formed identity.
    MalformedSubject,
    /// Signing-side infrastructure failure.
    SigningFailure(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::InvalidSignature => write!(f, "token signature is invalid"),
            TokenError::UnknownIssuer => write!(f, "token issuer is not recognized"),
            TokenError::TokenExpired => write!(f, "token has expired"),
            TokenError::MalformedSubject => write!(f, "token subject is malformed"),
            TokenError::SigningFailure(msg) => write!(f, "token signing failed: {}", msg),
        }
    }
}

impl StdError for TokenError {}

/// Bearer header parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub enum BearerError {
    /// Header absent or empty.
    MissingCredential,
    /// Header does not split into exactly a scheme and a value.
    MalformedCredential,
    /// Scheme is not the literal `Bearer` (case-sensitive).
    UnsupportedScheme,
}

impl fmt::Display for BearerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BearerError::MissingCredential => write!(f, "authorization header is missing"),
            BearerError::MalformedCredential => {
                write!(f, "authorization header format must be: Bearer <token>")
            }
            BearerError::UnsupportedScheme => {
                write!(f, "authorization header must use the Bearer scheme")
            }
        }
    }
}

impl StdError for BearerError {}

/// Persistence collaborator failures.
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryError {
    Database(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Database(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl StdError for RepositoryError {}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}

/// Refresh token store failures.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No record exists for the presented token value.
    TokenNotFound,
    /// The record exists but `revoked_at` is already set.
    AlreadyRevoked,
    /// The record exists but is revoked or past expiry.
    TokenInactive,
    /// Persistence collaborator failure.
    Repository(RepositoryError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::TokenNotFound => write!(f, "refresh token not found"),
            StoreError::AlreadyRevoked => write!(f, "refresh token is already revoked"),
            StoreError::TokenInactive => write!(f, "refresh token is revoked or expired"),
            StoreError::Repository(e) => write!(f, "{}", e),
        }
    }
}

impl StdError for StoreError {}

impl From<RepositoryError> for StoreError {
    fn from(err: RepositoryError) -> Self {
        StoreError::Repository(err)
    }
}

/// Subsystem-boundary error returned by `SessionService`.
///
/// Internal error kinds are preserved for logging but collapsed to the
/// coarsest safe category before crossing this boundary: "token not found",
/// "token revoked", and most token defects all present as `Unauthorized`,
/// so authentication failures leak nothing about which case occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Client-caused shape error (bad bearer header). Never retried.
    MalformedInput(BearerError),
    /// Login failed. Identical for unknown email and wrong password.
    InvalidCredentials,
    /// Authentication or refresh failed; deliberately coarse.
    Unauthorized,
    /// The refresh token's lifetime elapsed; the client should re-login.
    SessionExpired,
    /// Revocation was attempted on an already-revoked session.
    Conflict,
    /// Infrastructure failure (hashing, signing, persistence). Safe to
    /// retry with backoff at the caller's discretion.
    Internal(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::MalformedInput(e) => write!(f, "{}", e),
            SessionError::InvalidCredentials => write!(f, "invalid email or password"),
            SessionError::Unauthorized => write!(f, "unauthorized"),
            SessionError::SessionExpired => write!(f, "session has expired"),
            SessionError::Conflict => write!(f, "session is already revoked"),
            SessionError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for SessionError {}

impl From<BearerError> for SessionError {
    fn from(err: BearerError) -> Self {
        SessionError::MalformedInput(err)
    }
}

impl From<RepositoryError> for SessionError {
    fn from(err: RepositoryError) -> Self {
        SessionError::Internal(err.to_string())
    }
}
