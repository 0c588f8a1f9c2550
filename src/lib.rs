#![doc = "The `taskwarden` library crate."]
#![doc = ""]
#![doc = "Account registration, password login, signed session tokens and the"]
#![doc = "role-gated request filter, plus the task API they protect. The binary"]
#![doc = "(`main.rs`) only reads configuration, picks the stores and starts the server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod usecases;

pub use crate::error::AppError;
pub use crate::state::AppState;
