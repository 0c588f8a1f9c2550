//! Persistence contracts for accounts and tasks, with an in-memory adapter
//! and a Postgres adapter.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Account, NewAccount, Role, Task, TaskInput};

pub use memory::{MemoryAccountStore, MemoryTaskStore};
pub use postgres::{PgAccountStore, PgTaskStore};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("unique constraint violated")]
    Conflict,
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match &error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Conflict
            }
            _ => StoreError::Backend(error.to_string()),
        }
    }
}

/// Persistence for accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persists a new account, assigning its identifier and creation time.
    ///
    /// # Errors
    /// * `Conflict` - the username is already present
    /// * `Backend` - the store failed
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Exact, case-sensitive lookup.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    async fn count_by_username(&self, username: &str) -> Result<u64, StoreError>;

    /// Number of accounts ever created and still held.
    async fn count_all(&self) -> Result<u64, StoreError>;

    /// Sets the role of the account with identifier `id`.
    ///
    /// # Errors
    /// * `NotFound` - `id` is not a valid identifier or matches no account
    async fn set_role(&self, id: &str, role: Role) -> Result<(), StoreError>;
}

/// Persistence for tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, task: Task) -> Result<Task, StoreError>;

    /// All tasks, newest first.
    async fn list(&self) -> Result<Vec<Task>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// # Errors
    /// * `NotFound` - no task with this id
    async fn update(&self, id: Uuid, input: TaskInput) -> Result<Task, StoreError>;

    /// # Errors
    /// * `NotFound` - no task with this id
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
