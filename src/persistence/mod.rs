//! Persistence layer: SQLite connection pooling and schema migrations for
//! the durable session store.

pub mod error;
pub mod migrations;
pub mod pool;

pub use error::PersistenceError;
pub use migrations::MigrationRunner;
pub use pool::ConnectionPool;
