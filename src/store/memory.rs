use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, StoreError, TaskStore};
use crate::models::{Account, NewAccount, Role, Task, TaskInput};

/// Process-local account store. Username uniqueness is enforced under the
/// write lock, so concurrent registrations of one name cannot both succeed.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.username == account.username) {
            return Err(StoreError::Conflict);
        }

        let account = account.into_account(Uuid::new_v4());
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.username == username).cloned())
    }

    async fn count_by_username(&self, username: &str) -> Result<u64, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().filter(|a| a.username == username).count() as u64)
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.read().await.len() as u64)
    }

    async fn set_role(&self, id: &str, role: Role) -> Result<(), StoreError> {
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound)?;
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        account.role = role;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, task: Task) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(StoreError::Conflict);
        }
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, input: TaskInput) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(StoreError::NotFound)?;
        task.apply(input);
        Ok(task.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.tasks
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
