//! Database connection pool management

use crate::persistence::error::PersistenceError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Connection pool wrapper for the session database
pub struct ConnectionPool {
    pool: SqlitePool,
}

impl ConnectionPool {
    /// Create a new connection pool from a database URL.
    ///
    /// # Arguments
    ///
    /// * `url` - SQLite connection URL (`sqlite://path.db` or `sqlite::memory:`)
    /// * `max_connections` - Maximum number of connections in the pool
    /// * `connect_timeout_secs` - Connection acquire timeout in seconds
    pub async fn new(
        url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| PersistenceError::Connection(e.to_string()))?
            .create_if_missing(true);

        tracing::info!(
            "Connecting to session database at {} with max {} connections",
            url,
            max_connections
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connect_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), PersistenceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::Connection(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Close the connection pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl Clone for ConnectionPool {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_is_healthy() {
        let pool = ConnectionPool::new("sqlite::memory:", 1, 5).await.unwrap();
        pool.health_check().await.unwrap();
    }
}
