//! In-memory address repository
//!
//! Mirrors the SQLite store's observable behavior: autoincrement ids that
//! are never reused, a uniqueness constraint on `first_line`, and id order
//! for listings. A delete failure can be injected to exercise the
//! `DeleteOutcome::Failed` path.

use addrbook_common::db::{Address, AddressFields};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{AddressRepository, DeleteOutcome, StoreError, StoreResult};

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, Address>,
    last_id: i64,
}

impl Table {
    fn first_line_taken(&self, first_line: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|row| row.first_line == first_line && Some(row.id) != except)
    }
}

fn unique_violation() -> StoreError {
    StoreError::ConstraintViolation("UNIQUE constraint failed: address.first_line".to_string())
}

#[derive(Default)]
pub struct InMemoryAddressRepository {
    table: RwLock<Table>,
    delete_failure: Option<String>,
}

impl InMemoryAddressRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delete of an existing row fail with `reason`
    pub fn with_delete_failure(mut self, reason: impl Into<String>) -> Self {
        self.delete_failure = Some(reason.into());
        self
    }
}

#[async_trait]
impl AddressRepository for InMemoryAddressRepository {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<Address>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn get_by_first_line(&self, first_line: &str) -> StoreResult<Option<Address>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|row| row.first_line == first_line)
            .cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Address>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn create(&self, fields: AddressFields) -> StoreResult<Address> {
        let mut table = self.table.write().await;
        if table.first_line_taken(&fields.first_line, None) {
            return Err(unique_violation());
        }

        table.last_id += 1;
        let address = fields.into_address(table.last_id);
        table.rows.insert(address.id, address.clone());
        Ok(address)
    }

    async fn update(&self, id: i64, fields: AddressFields) -> StoreResult<Option<Address>> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if table.first_line_taken(&fields.first_line, Some(id)) {
            return Err(unique_violation());
        }

        Ok(table.rows.get_mut(&id).map(|row| {
            row.apply(fields);
            row.clone()
        }))
    }

    async fn delete(&self, id: i64) -> DeleteOutcome {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return DeleteOutcome::NotFound;
        }
        if let Some(reason) = &self.delete_failure {
            return DeleteOutcome::Failed(reason.clone());
        }

        table.rows.remove(&id);
        DeleteOutcome::Deleted
    }
}
