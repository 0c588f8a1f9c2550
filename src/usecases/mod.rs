pub mod accounts;
pub mod tasks;

pub use accounts::{AccountUseCase, Session};
pub use tasks::TaskUseCase;
