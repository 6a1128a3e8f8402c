//! Persistence backends for the cached session: a SeaORM adapter (SQLite by
//! default, PostgreSQL via feature flag) and a plain JSON file store, both
//! satisfying the domain's `SessionStore` contract.

mod entity;
mod json_store;
mod migration;
mod session_store;

use sea_orm::{Database, DatabaseConnection};
use specify_domain::session::{StorageError, StorageResult};
use tokio::sync::OnceCell;

pub use json_store::JsonFileSessionStore;

use migration::run_migrations;

/// SeaORM-backed session store. The connection is established on first use so
/// construction stays synchronous; storage trouble then surfaces per
/// operation, where the tiered store can route around it.
pub struct SeaOrmSessionStore {
    database_url: String,
    connection: OnceCell<DatabaseConnection>,
}

impl SeaOrmSessionStore {
    /// Builds a store that will connect lazily to the given database URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            connection: OnceCell::new(),
        }
    }

    /// Connects immediately and ensures the schema is present, for callers
    /// that prefer to surface connection problems at startup.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let db = Database::connect(database_url)
            .await
            .map_err(StorageError::from_source)?;
        run_migrations(&db).await?;
        Ok(Self {
            database_url: database_url.to_owned(),
            connection: OnceCell::new_with(Some(db)),
        })
    }

    pub(crate) async fn connection(&self) -> StorageResult<&DatabaseConnection> {
        self.connection
            .get_or_try_init(|| async {
                let db = Database::connect(&self.database_url)
                    .await
                    .map_err(StorageError::from_source)?;
                run_migrations(&db).await?;
                Ok(db)
            })
            .await
    }
}
