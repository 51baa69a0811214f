//! Address persistence
//!
//! Handlers and the proximity search reach the store only through
//! [`AddressRepository`], held as an `Arc<dyn AddressRepository>` in the
//! application state. The SQLite implementation backs the running service;
//! the in-memory one backs tests.

use addrbook_common::db::{Address, AddressFields};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryAddressRepository;
pub use sqlite::SqliteAddressRepository;

/// Store failure
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected a write (unique `first_line`, NOT NULL, ...)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Any other storage failure
    #[error("Storage error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result of a delete request
///
/// Delete never returns a raw storage error; failures are caught, the
/// transaction rolled back, and the reason reported as `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Failed(String),
}

/// CRUD access to stored addresses
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Fetch by id; `None` when absent
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<Address>>;

    /// Exact match on `first_line`
    async fn get_by_first_line(&self, first_line: &str) -> StoreResult<Option<Address>>;

    /// Every stored address in id order (empty when the store is empty)
    async fn list_all(&self) -> StoreResult<Vec<Address>>;

    /// Insert with a store-generated id and return the stored record
    async fn create(&self, fields: AddressFields) -> StoreResult<Address>;

    /// Overwrite every field of `id`; `None` (and no write) when absent
    async fn update(&self, id: i64, fields: AddressFields) -> StoreResult<Option<Address>>;

    async fn delete(&self, id: i64) -> DeleteOutcome;
}
