use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{AccountStore, StoreError, TaskStore};
use crate::models::{Account, NewAccount, Role, Task, TaskInput};

const ACCOUNT_COLUMNS: &str = "id, username, password_hash, role, created_at";
const TASK_COLUMNS: &str =
    "id, title, description, priority, status, due_date, created_at, updated_at, user_id";

/// Account store backed by the `accounts` table. Username uniqueness comes
/// from the table's unique index.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let account = account.into_account(Uuid::new_v4());
        let sql = format!(
            "INSERT INTO accounts ({ACCOUNT_COLUMNS}) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ACCOUNT_COLUMNS}"
        );

        let created = sqlx::query_as::<_, Account>(&sql)
            .bind(account.id)
            .bind(&account.username)
            .bind(&account.password_hash)
            .bind(account.role)
            .bind(account.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = $1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn count_by_username(&self, username: &str) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn set_role(&self, id: &str, role: Role) -> Result<(), StoreError> {
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound)?;
        let result = sqlx::query("UPDATE accounts SET role = $1 WHERE id = $2")
            .bind(role)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, task: Task) -> Result<Task, StoreError> {
        let sql = format!(
            "INSERT INTO tasks ({TASK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {TASK_COLUMNS}"
        );

        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(task.title)
            .bind(task.description)
            .bind(task.priority)
            .bind(task.status)
            .bind(task.due_date)
            .bind(task.created_at)
            .bind(task.updated_at)
            .bind(task.user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC");
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update(&self, id: Uuid, input: TaskInput) -> Result<Task, StoreError> {
        let sql = format!(
            "UPDATE tasks \
             SET title = $1, description = $2, priority = $3, status = $4, due_date = $5, updated_at = $6 \
             WHERE id = $7 \
             RETURNING {TASK_COLUMNS}"
        );

        // fetch_one turns a missing row into RowNotFound, i.e. StoreError::NotFound.
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(input.title)
            .bind(input.description)
            .bind(input.priority)
            .bind(input.status)
            .bind(input.due_date)
            .bind(Utc::now())
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
