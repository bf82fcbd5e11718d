//! Accounts and per-user task lists on a local SQLite file.

mod checklist;
mod credentials;
mod db;
pub mod error;
pub mod models;
mod password;
pub mod schema;
pub mod session;
mod tasks;

pub use checklist::Checklist;
pub use credentials::CredentialStore;
pub use db::{Database, default_database_path};
pub use error::{AuthFailure, Error, Result, ValidationError};
pub use models::{LoginRequest, NewUser, Task, TaskId, User, UserId};
pub use session::{EditState, PendingRename, Route, Session};
pub use tasks::TaskStore;
