pub mod extractors;
pub mod filter;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::password::MAX_PASSWORD_BYTES;
use crate::models::{Account, Role};

pub use extractors::AuthenticatedUser;
pub use filter::{Access, AuthorizationFilter};
pub use middleware::RequireRole;
pub use password::{BcryptHasher, PasswordHasher};
pub use token::{Claims, Identity, JwtService, TokenError, TokenService};

/// Represents the payload for a login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1), custom = "validate_password_bytes")]
    pub password: String,
}

/// Represents the payload for a registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Unique, case-sensitive. Between 1 and 64 characters.
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    /// At least 1 character and at most 72 bytes once UTF-8 encoded.
    #[validate(length(min = 1), custom = "validate_password_bytes")]
    pub password: String,
}

/// Rejects passwords bcrypt would silently truncate.
pub fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut err = ValidationError::new("password_too_long");
        err.message = Some(format!("password must be at most {MAX_PASSWORD_BYTES} bytes").into());
        return Err(err);
    }
    Ok(())
}

/// External view of an account. Carries no credential material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            role: account.role,
        }
    }
}

/// Response body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token, also set as the auth cookie.
    pub token: String,
    pub account: AccountResponse,
}
