/// Authentication module
///
/// Handles password hashing, access token generation/validation, bearer
/// header parsing, refresh token lifecycle, and session orchestration.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod service;

pub use bearer::extract_bearer_token;
pub use claims::Claims;
pub use jwt::issue_access_token;
pub use jwt::validate_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::RefreshTokenStore;
pub use service::SessionService;
pub use service::SessionTokens;
