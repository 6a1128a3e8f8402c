//! Session snapshot persisted between resolution calls, plus the pluggable
//! stores that hold it and the tiered fallback that chains them.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::model::{WalletAddress, MAX_WALLET_ADDRESSES};

/// Key under which the session snapshot is persisted by every backend.
pub const SESSION_CACHE_KEY: &str = "specify.session";

/// Sentinel cache identifier instructing the SDK to drop the cached session.
pub const VOID_LOCAL_ID: &str = "void";

pub type StorageResult<T> = Result<T, StorageError>;

/// Backend-agnostic storage failure. Concrete stores map their driver errors
/// through [`StorageError::from_source`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn from_source(source: impl std::fmt::Display) -> Self {
        Self::Backend(source.to_string())
    }
}

/// Snapshot of one publisher session: the server-issued cache identifier and
/// the wallet addresses seen so far. One snapshot per store, keyed by
/// [`SESSION_CACHE_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(default)]
    pub addresses: Vec<WalletAddress>,
    pub updated_at: DateTime<Utc>,
}

impl CachedSession {
    /// Builds a snapshot from the given addresses, capped at
    /// [`MAX_WALLET_ADDRESSES`].
    pub fn new(mut addresses: Vec<WalletAddress>) -> Self {
        addresses.truncate(MAX_WALLET_ADDRESSES);
        Self {
            local_id: None,
            addresses,
            updated_at: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Capability contract for session persistence backends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> StorageResult<Option<CachedSession>>;
    async fn save(&self, session: &CachedSession) -> StorageResult<()>;
    async fn clear(&self) -> StorageResult<()>;
}

/// In-process store backed by a `RwLock`. Default tier of last resort; also
/// the store of choice for tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<CachedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> StorageResult<Option<CachedSession>> {
        let guard = self
            .slot
            .read()
            .map_err(|_| StorageError::from_source("memory store lock poisoned"))?;
        Ok(guard.clone())
    }

    async fn save(&self, session: &CachedSession) -> StorageResult<()> {
        let mut guard = self
            .slot
            .write()
            .map_err(|_| StorageError::from_source("memory store lock poisoned"))?;
        *guard = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        let mut guard = self
            .slot
            .write()
            .map_err(|_| StorageError::from_source("memory store lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

/// Ordered chain of session stores. Reads take the first tier that holds a
/// snapshot; a tier that errors or comes up empty falls through to the next.
/// Writes land in the first tier that accepts them. The public surface is
/// infallible: storage trouble degrades the cache, never the resolution call.
#[derive(Clone)]
pub struct TieredSessionStore {
    tiers: Vec<Arc<dyn SessionStore>>,
}

impl TieredSessionStore {
    pub fn new(tiers: Vec<Arc<dyn SessionStore>>) -> Self {
        Self { tiers }
    }

    /// Convenience for a single-backend chain.
    pub fn single(store: Arc<dyn SessionStore>) -> Self {
        Self::new(vec![store])
    }

    pub async fn load(&self) -> Option<CachedSession> {
        for (tier, store) in self.tiers.iter().enumerate() {
            match store.load().await {
                Ok(Some(session)) => {
                    counter!("sdk_session_cache_total", 1, "op" => "load", "result" => "hit");
                    return Some(session);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(tier, error = %err, "session load failed; falling through");
                    counter!("sdk_session_cache_total", 1, "op" => "load", "result" => "error");
                }
            }
        }

        counter!("sdk_session_cache_total", 1, "op" => "load", "result" => "miss");
        None
    }

    pub async fn save(&self, session: &CachedSession) {
        for (tier, store) in self.tiers.iter().enumerate() {
            match store.save(session).await {
                Ok(()) => {
                    counter!("sdk_session_cache_total", 1, "op" => "save", "result" => "ok");
                    return;
                }
                Err(err) => {
                    warn!(tier, error = %err, "session save failed; trying next tier");
                }
            }
        }

        warn!("session save failed on every tier; continuing without cache");
        counter!("sdk_session_cache_total", 1, "op" => "save", "result" => "error");
    }

    /// Drops the snapshot from every tier so no stale copy resurfaces later.
    pub async fn clear(&self) {
        for (tier, store) in self.tiers.iter().enumerate() {
            if let Err(err) = store.clear().await {
                warn!(tier, error = %err, "session clear failed");
                counter!("sdk_session_cache_total", 1, "op" => "clear", "result" => "error");
            }
        }
        counter!("sdk_session_cache_total", 1, "op" => "clear", "result" => "ok");
    }

    /// Load-modify-save helper: records the server-issued cache identifier
    /// while keeping the address snapshot intact.
    pub async fn remember_local_id(&self, local_id: &str) {
        let mut session = self
            .load()
            .await
            .unwrap_or_else(|| CachedSession::new(Vec::new()));
        session.local_id = Some(local_id.to_owned());
        session.touch();
        self.save(&session).await;
    }
}
