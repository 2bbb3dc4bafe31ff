//! SQLite persistence for cafe records.

use anyhow::{Context, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{Cafe, NewCafe};

/// Record store failure modes surfaced to handlers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cafe not found")]
    NotFound,

    #[error("{0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        // AUTOINCREMENT keeps deleted ids from being reassigned.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cafes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(250) NOT NULL UNIQUE,
                map_url VARCHAR(500) NOT NULL,
                img_url VARCHAR(500) NOT NULL,
                location VARCHAR(250) NOT NULL,
                seats VARCHAR(250) NOT NULL,
                has_toilet BOOLEAN NOT NULL,
                has_wifi BOOLEAN NOT NULL,
                has_sockets BOOLEAN NOT NULL,
                can_take_calls BOOLEAN NOT NULL,
                coffee_price VARCHAR(250)
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Insert a new cafe and return its assigned id.
    pub async fn create_cafe(&self, cafe: &NewCafe) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO cafes (name, map_url, img_url, location, seats,
                               has_toilet, has_wifi, has_sockets, can_take_calls, coffee_price)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&cafe.name)
        .bind(&cafe.map_url)
        .bind(&cafe.img_url)
        .bind(&cafe.location)
        .bind(&cafe.seats)
        .bind(cafe.has_toilet)
        .bind(cafe.has_wifi)
        .bind(cafe.has_sockets)
        .bind(cafe.can_take_calls)
        .bind(&cafe.coffee_price)
        .execute(&*self.pool)
        .await
        .map_err(into_constraint_error)?;

        Ok(result.last_insert_rowid())
    }

    pub async fn list_cafes(&self) -> Result<Vec<Cafe>, StoreError> {
        let cafes = sqlx::query_as::<_, Cafe>(
            r#"
            SELECT id, name, map_url, img_url, location, seats,
                   has_toilet, has_wifi, has_sockets, can_take_calls, coffee_price
            FROM cafes
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(cafes)
    }

    pub async fn get_cafe(&self, id: i64) -> Result<Option<Cafe>, StoreError> {
        let cafe = sqlx::query_as::<_, Cafe>(
            r#"
            SELECT id, name, map_url, img_url, location, seats,
                   has_toilet, has_wifi, has_sockets, can_take_calls, coffee_price
            FROM cafes WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(cafe)
    }

    /// Exact-match filter on `location`, case-sensitive.
    pub async fn find_cafes_by_location(&self, location: &str) -> Result<Vec<Cafe>, StoreError> {
        let cafes = sqlx::query_as::<_, Cafe>(
            r#"
            SELECT id, name, map_url, img_url, location, seats,
                   has_toilet, has_wifi, has_sockets, can_take_calls, coffee_price
            FROM cafes WHERE location = ?1
            "#,
        )
        .bind(location)
        .fetch_all(&*self.pool)
        .await?;

        Ok(cafes)
    }

    /// Update only `coffee_price`; every other column is left untouched.
    pub async fn update_coffee_price(&self, id: i64, new_price: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE cafes SET coffee_price = ?1 WHERE id = ?2
            "#,
        )
        .bind(new_price)
        .bind(id)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    pub async fn delete_cafe(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM cafes WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

/// Fold SQLite constraint failures into `StoreError::Constraint`.
fn into_constraint_error(e: sqlx::Error) -> StoreError {
    use sqlx::error::ErrorKind;

    match e.as_database_error().map(|db| db.kind()) {
        Some(ErrorKind::UniqueViolation) => {
            StoreError::Constraint("a cafe with that name already exists".to_string())
        }
        Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => {
            StoreError::Constraint(e.to_string())
        }
        _ => StoreError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_cafe(name: &str, location: &str) -> NewCafe {
        NewCafe {
            name: name.to_string(),
            map_url: format!("https://maps.example.com/{name}"),
            img_url: format!("https://img.example.com/{name}.jpg"),
            location: location.to_string(),
            seats: "20-30".to_string(),
            has_toilet: true,
            has_wifi: true,
            has_sockets: false,
            can_take_calls: false,
            coffee_price: Some("£2.50".to_string()),
        }
    }

    async fn test_db(dir: &TempDir) -> Database {
        let path = dir.path().join("cafes.db");
        Database::new(path.to_str().unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn create_and_fetch_round_trip() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        let id = db.create_cafe(&sample_cafe("Grounds", "London")).await.unwrap();
        let cafe = db.get_cafe(id).await.unwrap().expect("cafe should exist");
        assert_eq!(cafe.id, id);
        assert_eq!(cafe.name, "Grounds");
        assert_eq!(cafe.location, "London");
        assert!(cafe.has_wifi);
        assert!(!cafe.has_sockets);
        assert_eq!(cafe.coffee_price.as_deref(), Some("£2.50"));
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_without_mutation() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        db.create_cafe(&sample_cafe("Grounds", "London")).await.unwrap();
        let err = db
            .create_cafe(&sample_cafe("Grounds", "Leeds"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert_eq!(db.list_cafes().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn location_filter_matches_exactly() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        db.create_cafe(&sample_cafe("Grounds", "London")).await.unwrap();
        db.create_cafe(&sample_cafe("Beanery", "London")).await.unwrap();
        db.create_cafe(&sample_cafe("Brew Lab", "Leeds")).await.unwrap();

        let london = db.find_cafes_by_location("London").await.unwrap();
        assert_eq!(london.len(), 2);
        assert!(london.iter().all(|c| c.location == "London"));

        assert!(db.find_cafes_by_location("Paris").await.unwrap().is_empty());
        // Case-sensitive, no normalization.
        assert!(db.find_cafes_by_location("london").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_price_changes_only_the_price() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        let id = db.create_cafe(&sample_cafe("Grounds", "London")).await.unwrap();
        db.update_coffee_price(id, "£4.00").await.unwrap();

        let cafe = db.get_cafe(id).await.unwrap().unwrap();
        assert_eq!(cafe.coffee_price.as_deref(), Some("£4.00"));
        assert_eq!(cafe.name, "Grounds");
        assert_eq!(cafe.seats, "20-30");
    }

    #[tokio::test]
    async fn update_price_on_unknown_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        let err = db.update_coffee_price(999, "£4.00").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        // The failed update must not have created anything.
        assert!(db.list_cafes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        let id = db.create_cafe(&sample_cafe("Grounds", "London")).await.unwrap();
        db.delete_cafe(id).await.unwrap();

        assert!(db.get_cafe(id).await.unwrap().is_none());
        let err = db.delete_cafe(id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        let first = db.create_cafe(&sample_cafe("Grounds", "London")).await.unwrap();
        db.delete_cafe(first).await.unwrap();
        let second = db.create_cafe(&sample_cafe("Beanery", "Leeds")).await.unwrap();
        assert!(second > first);
    }
}
