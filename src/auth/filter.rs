//! Request admission, independent of the web framework.
//!
//! A request moves through `extract -> verify -> role check` and ends either
//! admitted with an `Identity` or rejected with an `AppError`:
//!
//! * no token: `AuthenticationRequired` (401)
//! * any verification failure: `TokenInvalid` (401), whatever the cause
//! * role mismatch: `AuthorizationDenied` (403)

use std::sync::Arc;

use crate::auth::token::{Identity, TokenService};
use crate::error::AppError;
use crate::models::Role;

/// Default name of the cookie carrying the token.
pub const DEFAULT_AUTH_COOKIE: &str = "auth_token";

/// Which roles a route admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any holder of a valid token.
    Authenticated,
    /// Only tokens asserting exactly this role.
    Role(Role),
}

impl Access {
    pub fn permits(&self, role: Role) -> bool {
        match self {
            Access::Authenticated => true,
            Access::Role(required) => *required == role,
        }
    }
}

pub struct AuthorizationFilter {
    tokens: Arc<dyn TokenService>,
    cookie_name: String,
}

impl AuthorizationFilter {
    pub fn new(tokens: Arc<dyn TokenService>, cookie_name: impl Into<String>) -> Self {
        Self {
            tokens,
            cookie_name: cookie_name.into(),
        }
    }

    /// Name of the cookie the token may be carried in.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Decides admission for a request that presented `token` (if any) on a
    /// route guarded by `access`.
    pub fn admit(&self, token: Option<&str>, access: Access) -> Result<Identity, AppError> {
        let token = match token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AppError::AuthenticationRequired),
        };

        let identity = self.tokens.verify(token).map_err(|e| {
            log::debug!("rejecting request: {}", e);
            AppError::TokenInvalid
        })?;

        if !access.permits(identity.role) {
            log::debug!(
                "rejecting subject {}: role {} not permitted for {:?}",
                identity.subject,
                identity.role,
                access
            );
            return Err(AppError::AuthorizationDenied);
        }

        Ok(identity)
    }
}

/// Picks the token out of the request carriers. An `Authorization: Bearer`
/// header wins over the cookie. The scheme name is matched case-insensitively.
pub fn select_token<'a>(
    authorization_header: Option<&'a str>,
    cookie_value: Option<&'a str>,
) -> Option<&'a str> {
    authorization_header
        .and_then(|value| value.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token.trim())
        .or(cookie_value)
}
