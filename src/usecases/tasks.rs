use std::sync::Arc;

use uuid::Uuid;

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{Task, TaskInput};
use crate::store::TaskStore;

/// Plain task CRUD. The only rule is that identifiers must be UUIDs; a
/// malformed id is rejected before the store is consulted.
pub struct TaskUseCase {
    store: Arc<dyn TaskStore>,
}

fn parse_task_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::Validation(format!("invalid task id `{id}`")))
}

impl TaskUseCase {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Stores a new task owned by `owner`.
    pub async fn add_task(&self, input: TaskInput, owner: &Identity) -> Result<Task, AppError> {
        let task = self.store.create(Task::new(input, &owner.subject)).await?;
        log::info!("task {} created by {}", task.id, owner.subject);
        Ok(task)
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        Ok(self.store.list().await?)
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, AppError> {
        let id = parse_task_id(id)?;
        self.store
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    pub async fn update_task(&self, id: &str, input: TaskInput) -> Result<Task, AppError> {
        let id = parse_task_id(id)?;
        Ok(self.store.update(id, input).await?)
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let id = parse_task_id(id)?;
        self.store.delete(id).await?;
        log::info!("task {} deleted", id);
        Ok(())
    }
}
