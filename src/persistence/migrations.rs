//! Database migrations for the session store

use crate::persistence::error::PersistenceError;
use crate::persistence::pool::ConnectionPool;
use sqlx::Row;

/// Initial schema migration SQL
const MIGRATION_001_SESSIONS: &str = r#"
-- Sessions table (one row per conversation)
CREATE TABLE IF NOT EXISTS sessions (
    session_id TEXT PRIMARY KEY,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Messages table (append-only conversation history)
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (session_id) REFERENCES sessions(session_id)
);

-- Migration tracking table
CREATE TABLE IF NOT EXISTS _voyager_migrations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    applied_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id);
"#;

/// Migration definition
struct Migration {
    name: &'static str,
    sql: &'static str,
}

/// Get all migrations in order
fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        name: "001_sessions",
        sql: MIGRATION_001_SESSIONS,
    }]
}

/// Migration runner for the session store
pub struct MigrationRunner {
    pool: ConnectionPool,
}

impl MigrationRunner {
    /// Create a new migration runner
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations
    pub async fn migrate_up(&self) -> Result<(), PersistenceError> {
        self.ensure_migrations_table().await?;

        for migration in get_migrations() {
            if self.is_migration_applied(migration.name).await? {
                tracing::debug!("Migration '{}' already applied, skipping", migration.name);
                continue;
            }

            tracing::info!("Applying migration: {}", migration.name);

            // SQLite executes statements one at a time; comment lines are
            // stripped so a leading comment never hides a statement
            for statement in migration.sql.split(';') {
                let statement = statement
                    .lines()
                    .filter(|line| !line.trim_start().starts_with("--"))
                    .collect::<Vec<_>>()
                    .join("\n");
                let statement = statement.trim();
                if statement.is_empty() {
                    continue;
                }

                sqlx::query(statement)
                    .execute(self.pool.pool())
                    .await
                    .map_err(|e| {
                        PersistenceError::Migration(format!(
                            "Failed to execute migration '{}': {}",
                            migration.name, e
                        ))
                    })?;
            }

            self.record_migration(migration.name).await?;
            tracing::info!("Migration '{}' applied successfully", migration.name);
        }

        Ok(())
    }

    async fn ensure_migrations_table(&self) -> Result<(), PersistenceError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS _voyager_migrations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                applied_at TEXT NOT NULL
            )",
        )
        .execute(self.pool.pool())
        .await?;
        Ok(())
    }

    async fn is_migration_applied(&self, name: &str) -> Result<bool, PersistenceError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM _voyager_migrations WHERE name = ?")
            .bind(name)
            .fetch_one(self.pool.pool())
            .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count > 0)
    }

    async fn record_migration(&self, name: &str) -> Result<(), PersistenceError> {
        sqlx::query("INSERT INTO _voyager_migrations (name, applied_at) VALUES (?, ?)")
            .bind(name)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(self.pool.pool())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = ConnectionPool::new("sqlite::memory:", 1, 5).await.unwrap();
        let runner = MigrationRunner::new(pool.clone());
        runner.migrate_up().await.unwrap();
        runner.migrate_up().await.unwrap();

        sqlx::query("SELECT session_id FROM sessions")
            .fetch_all(pool.pool())
            .await
            .unwrap();
    }
}
