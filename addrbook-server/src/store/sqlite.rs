//! SQLite-backed address repository
//!
//! Every write runs in its own transaction. On failure the transaction is
//! rolled back before the error is reported, so a failed write leaves no
//! partial record.

use addrbook_common::db::{Address, AddressFields};
use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, warn};

use super::{AddressRepository, DeleteOutcome, StoreError, StoreResult};

const SELECT_ADDRESS: &str = r#"
    SELECT id, first_line, second_line, phone, pincode, latitude, longitude
    FROM address
"#;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let is_constraint = err.as_database_error().is_some_and(|db_err| {
            matches!(
                db_err.kind(),
                ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation
            )
        });

        if is_constraint {
            StoreError::ConstraintViolation(err.to_string())
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

/// Address repository over a shared SQLite pool
#[derive(Clone)]
pub struct SqliteAddressRepository {
    pool: SqlitePool,
}

impl SqliteAddressRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn update_in(
        conn: &mut SqliteConnection,
        id: i64,
        fields: &AddressFields,
    ) -> Result<Option<Address>, sqlx::Error> {
        let done = sqlx::query(
            r#"
            UPDATE address
            SET first_line = ?, second_line = ?, phone = ?, pincode = ?,
                latitude = ?, longitude = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.first_line)
        .bind(&fields.second_line)
        .bind(&fields.phone)
        .bind(&fields.pincode)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if done.rows_affected() == 0 {
            return Ok(None);
        }

        // Re-read so the caller sees exactly what was stored
        sqlx::query_as::<_, Address>(&format!("{} WHERE id = ?", SELECT_ADDRESS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}

/// Roll back, logging (not propagating) a failed rollback
async fn rollback(tx: Transaction<'_, Sqlite>, operation: &str) {
    if let Err(e) = tx.rollback().await {
        warn!("Rollback after failed {} also failed: {}", operation, e);
    }
}

#[async_trait]
impl AddressRepository for SqliteAddressRepository {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(&format!("{} WHERE id = ?", SELECT_ADDRESS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(address)
    }

    async fn get_by_first_line(&self, first_line: &str) -> StoreResult<Option<Address>> {
        let address =
            sqlx::query_as::<_, Address>(&format!("{} WHERE first_line = ?", SELECT_ADDRESS))
                .bind(first_line)
                .fetch_optional(&self.pool)
                .await?;

        Ok(address)
    }

    async fn list_all(&self) -> StoreResult<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(&format!("{} ORDER BY id", SELECT_ADDRESS))
            .fetch_all(&self.pool)
            .await?;

        Ok(addresses)
    }

    async fn create(&self, fields: AddressFields) -> StoreResult<Address> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO address (first_line, second_line, phone, pincode, latitude, longitude)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fields.first_line)
        .bind(&fields.second_line)
        .bind(&fields.phone)
        .bind(&fields.pincode)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                tx.commit().await?;
                debug!("Inserted address {}", id);
                Ok(fields.into_address(id))
            }
            Err(e) => {
                rollback(tx, "create").await;
                Err(e.into())
            }
        }
    }

    async fn update(&self, id: i64, fields: AddressFields) -> StoreResult<Option<Address>> {
        let mut tx = self.pool.begin().await?;

        match Self::update_in(&mut tx, id, &fields).await {
            Ok(Some(address)) => {
                tx.commit().await?;
                debug!("Updated address {}", id);
                Ok(Some(address))
            }
            Ok(None) => {
                rollback(tx, "update").await;
                Ok(None)
            }
            Err(e) => {
                rollback(tx, "update").await;
                Err(e.into())
            }
        }
    }

    async fn delete(&self, id: i64) -> DeleteOutcome {
        let mut tx = match self.pool.begin().await {
            Ok(tx) => tx,
            Err(e) => return DeleteOutcome::Failed(format!("Error : {}", e)),
        };

        let result = sqlx::query("DELETE FROM address WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                rollback(tx, "delete").await;
                DeleteOutcome::NotFound
            }
            Ok(_) => match tx.commit().await {
                Ok(()) => {
                    debug!("Deleted address {}", id);
                    DeleteOutcome::Deleted
                }
                Err(e) => DeleteOutcome::Failed(format!("Error : {}", e)),
            },
            Err(e) => {
                rollback(tx, "delete").await;
                DeleteOutcome::Failed(format!("Error : {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addrbook_common::db::init_memory_database;

    fn fields(first_line: &str, latitude: f64, longitude: f64) -> AddressFields {
        AddressFields {
            first_line: first_line.to_string(),
            second_line: "Floor 2".to_string(),
            phone: "+1 212 555 0100".to_string(),
            pincode: "10001".to_string(),
            latitude,
            longitude,
        }
    }

    async fn repo() -> SqliteAddressRepository {
        let pool = init_memory_database()
            .await
            .expect("Failed to create in-memory database");
        SqliteAddressRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_by_id() {
        let repo = repo().await;

        let created = repo.create(fields("350 Fifth Avenue", 40.7484, -73.9857)).await.unwrap();
        let loaded = repo.get_by_id(created.id).await.unwrap().expect("Address not found");

        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let repo = repo().await;

        let a = repo.create(fields("1 A Street", 0.0, 0.0)).await.unwrap();
        let b = repo.create(fields("2 B Street", 0.0, 0.0)).await.unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_duplicate_first_line_is_constraint_violation() {
        let repo = repo().await;
        repo.create(fields("350 Fifth Avenue", 40.7484, -73.9857)).await.unwrap();

        let err = repo
            .create(fields("350 Fifth Avenue", 0.0, 0.0))
            .await
            .expect_err("Store must reject duplicate first_line");

        assert!(matches!(err, StoreError::ConstraintViolation(_)), "got {:?}", err);
        assert_eq!(repo.list_all().await.unwrap().len(), 1, "Failed insert must leave no row");
    }

    #[tokio::test]
    async fn test_update_into_existing_first_line_is_rolled_back() {
        let repo = repo().await;
        let a = repo.create(fields("1 A Street", 1.0, 1.0)).await.unwrap();
        repo.create(fields("2 B Street", 2.0, 2.0)).await.unwrap();

        let err = repo.update(a.id, fields("2 B Street", 9.0, 9.0)).await.unwrap_err();

        assert!(matches!(err, StoreError::ConstraintViolation(_)));
        assert_eq!(repo.get_by_id(a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn test_update_missing_id_writes_nothing() {
        let repo = repo().await;
        let a = repo.create(fields("1 A Street", 1.0, 1.0)).await.unwrap();

        let result = repo.update(a.id + 100, fields("9 Z Street", 0.0, 0.0)).await.unwrap();

        assert!(result.is_none());
        assert_eq!(repo.list_all().await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn test_delete_outcomes() {
        let repo = repo().await;
        let a = repo.create(fields("1 A Street", 1.0, 1.0)).await.unwrap();

        assert_eq!(repo.delete(a.id).await, DeleteOutcome::Deleted);
        assert_eq!(repo.delete(a.id).await, DeleteOutcome::NotFound);
        assert!(repo.get_by_id(a.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_first_line_is_exact() {
        let repo = repo().await;
        repo.create(fields("10 Downing Street", 51.5034, -0.1276)).await.unwrap();

        assert!(repo.get_by_first_line("10 Downing Street").await.unwrap().is_some());
        assert!(repo.get_by_first_line("10 downing street").await.unwrap().is_none());
        assert!(repo.get_by_first_line("10 Downing").await.unwrap().is_none());
    }
}
