//! Infrastructure layer: configuration, Postgres access, identity loading.

pub mod config;
pub mod db;
pub mod error;
pub mod identity_store;
pub mod record;
pub mod records;
pub mod repository;
pub mod service;
pub mod user_admin;

pub use crate::config::AppConfig;
pub use error::{IdentityError, PersistenceError, RepoError};
pub use identity_store::{IdentityStore, InMemoryIdentityStore, PgIdentityStore};
pub use record::Record;
pub use repository::Repository;
pub use service::{PgRecordService, RecordService};
pub use user_admin::{PgUserAdmin, UserAdmin};
