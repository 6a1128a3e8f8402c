use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use specify_domain::session::{CachedSession, SessionStore, StorageError, StorageResult};
use tokio::fs;

/// File-backed session store keeping the snapshot as a single JSON document.
/// Suits CLI and desktop embedders that have no database at hand.
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn load(&self) -> StorageResult<Option<CachedSession>> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(StorageError::from_source),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::from_source(err)),
        }
    }

    async fn save(&self, session: &CachedSession) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(StorageError::from_source)?;
            }
        }

        let bytes = serde_json::to_vec(session).map_err(StorageError::from_source)?;
        fs::write(&self.path, bytes)
            .await
            .map_err(StorageError::from_source)
    }

    async fn clear(&self) -> StorageResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::from_source(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use specify_domain::model::WalletAddress;

    use super::*;

    const ADDRESS: &str = "0x1234567890abcdef1234567890abcdef12345678";

    fn scratch_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock after epoch")
            .subsec_nanos();
        std::env::temp_dir().join(format!(
            "specify-session-{tag}-{}-{nanos}.json",
            std::process::id()
        ))
    }

    fn sample_session() -> CachedSession {
        CachedSession::new(vec![WalletAddress::parse(ADDRESS).unwrap()])
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let store = JsonFileSessionStore::new(scratch_path("missing"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn round_trips_through_the_filesystem() {
        let path = scratch_path("roundtrip");
        let store = JsonFileSessionStore::new(&path);
        let session = sample_session();

        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn save_creates_missing_parent_directories() {
        let dir = scratch_path("nested").with_extension("d");
        let path = dir.join("cache").join("session.json");
        let store = JsonFileSessionStore::new(&path);

        store.save(&sample_session()).await.unwrap();
        assert!(store.load().await.unwrap().is_some());
        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn clear_tolerates_missing_file() {
        let store = JsonFileSessionStore::new(scratch_path("clear"));
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupted_file_surfaces_as_storage_error() {
        let path = scratch_path("corrupt");
        fs::write(&path, b"{not json").await.unwrap();

        let store = JsonFileSessionStore::new(&path);
        assert!(store.load().await.is_err());
        let _ = fs::remove_file(&path).await;
    }
}
