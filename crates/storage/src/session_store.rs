use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{sea_query::OnConflict, EntityTrait, Set};
use specify_domain::session::{
    CachedSession, SessionStore, StorageError, StorageResult, SESSION_CACHE_KEY,
};

use crate::entity::session_cache;
use crate::SeaOrmSessionStore;

#[async_trait]
impl SessionStore for SeaOrmSessionStore {
    async fn load(&self) -> StorageResult<Option<CachedSession>> {
        let db = self.connection().await?;
        let maybe = session_cache::Entity::find_by_id(SESSION_CACHE_KEY.to_string())
            .one(db)
            .await
            .map_err(StorageError::from_source)?;
        maybe
            .map(|model| serde_json::from_str(&model.value).map_err(StorageError::from_source))
            .transpose()
    }

    async fn save(&self, session: &CachedSession) -> StorageResult<()> {
        let db = self.connection().await?;
        let value = serde_json::to_string(session).map_err(StorageError::from_source)?;
        let active = session_cache::ActiveModel {
            key: Set(SESSION_CACHE_KEY.to_string()),
            value: Set(value),
            updated_at: Set(Utc::now()),
        };
        session_cache::Entity::insert(active)
            .on_conflict(
                OnConflict::column(session_cache::Column::Key)
                    .update_columns([
                        session_cache::Column::Value,
                        session_cache::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(db)
            .await
            .map_err(StorageError::from_source)?;
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        let db = self.connection().await?;
        session_cache::Entity::delete_by_id(SESSION_CACHE_KEY.to_string())
            .exec(db)
            .await
            .map_err(StorageError::from_source)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, Statement};
    use specify_domain::model::WalletAddress;

    use super::*;

    const ADDRESS: &str = "0x1234567890abcdef1234567890abcdef12345678";

    async fn memory_store() -> SeaOrmSessionStore {
        SeaOrmSessionStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store connects")
    }

    fn sample_session() -> CachedSession {
        let mut session = CachedSession::new(vec![WalletAddress::parse(ADDRESS).unwrap()]);
        session.local_id = Some("srv_1".to_string());
        session
    }

    #[tokio::test]
    async fn load_returns_none_on_fresh_database() {
        let store = memory_store().await;
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn round_trips_session_snapshot() {
        let store = memory_store().await;
        let session = sample_session();

        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn save_overwrites_previous_snapshot() {
        let store = memory_store().await;
        let mut session = sample_session();
        store.save(&session).await.unwrap();

        session.local_id = Some("srv_2".to_string());
        session.touch();
        store.save(&session).await.unwrap();

        let loaded = store.load().await.unwrap().expect("snapshot present");
        assert_eq!(loaded.local_id.as_deref(), Some("srv_2"));
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = memory_store().await;
        store.save(&sample_session()).await.unwrap();

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupted_row_surfaces_as_storage_error() {
        let store = memory_store().await;
        let db = store.connection().await.unwrap();
        let backend = db.get_database_backend();
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO session_cache (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
            [SESSION_CACHE_KEY.into(), "{not json".into()],
        ))
        .await
        .unwrap();

        assert!(store.load().await.is_err());
    }
}
