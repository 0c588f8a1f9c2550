use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Coarse-grained permission tag carried in tokens and checked per route.
/// Corresponds to the `account_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "account_role")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Role::User),
            "Admin" => Ok(Role::Admin),
            other => Err(AppError::Validation(format!("unknown role `{other}`"))),
        }
    }
}

/// A registered account as held by the store.
///
/// Not `Serialize`: the credential hash must never reach a response body.
/// Use `AccountResponse` for the external representation.
#[derive(Clone, PartialEq, FromRow)]
pub struct Account {
    /// Store-assigned identifier.
    pub id: Uuid,
    /// Unique, case-sensitive login name.
    pub username: String,
    /// Self-describing bcrypt hash of the password.
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// What the account use case hands to `AccountStore::create`; the store fills in
/// the identifier and creation time.
#[derive(Clone, PartialEq)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

impl NewAccount {
    pub fn into_account(self, id: Uuid) -> Account {
        Account {
            id,
            username: self.username,
            password_hash: self.password_hash,
            role: self.role,
            created_at: Utc::now(),
        }
    }
}
