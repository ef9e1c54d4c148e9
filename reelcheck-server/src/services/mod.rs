//! External collaborators behind narrow interfaces

pub mod auth;
pub mod notifier;

pub use auth::{AuthVerifier, Identity, SqliteAuthVerifier};
pub use notifier::{Notifier, StoredNotifier};
