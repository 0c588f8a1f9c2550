pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskPriority, TaskStatus};
pub use user::{Account, NewAccount, Role};
