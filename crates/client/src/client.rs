use std::sync::Arc;

use metrics::counter;
use specify_domain::config::DEFAULT_BASE_URL;
use specify_domain::model::{ImageFormat, PublisherKey, SpecifyAd};
use specify_domain::session::{
    CachedSession, MemorySessionStore, SessionStore, TieredSessionStore,
};
use tracing::debug;

use crate::compose::compose_request;
use crate::error::SpecifyError;
use crate::resolve::{resolve_response, CacheDirective};
use crate::transport::{AdTransport, HttpTransport};

/// Per-call overrides applied on top of the client defaults.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    pub image_format: Option<ImageFormat>,
    pub ad_unit_id: Option<String>,
}

/// Assembles a [`Specify`] client with custom cache tiers or transport.
pub struct SpecifyBuilder {
    key: PublisherKey,
    base_url: String,
    stores: Vec<Arc<dyn SessionStore>>,
    transport: Option<Arc<dyn AdTransport>>,
}

impl SpecifyBuilder {
    fn new(key: PublisherKey) -> Self {
        Self {
            key,
            base_url: DEFAULT_BASE_URL.to_string(),
            stores: Vec::new(),
            transport: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Appends a cache tier. Tiers are consulted in the order they were added.
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.stores.push(store);
        self
    }

    /// Replaces the HTTP transport. The custom transport owns authentication.
    pub fn transport(mut self, transport: Arc<dyn AdTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Specify {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.base_url, self.key.clone())),
        };
        let stores = if self.stores.is_empty() {
            vec![Arc::new(MemorySessionStore::new()) as Arc<dyn SessionStore>]
        } else {
            self.stores
        };

        Specify {
            store: TieredSessionStore::new(stores),
            transport,
            key_fingerprint: self.key.fingerprint(),
        }
    }
}

/// Publisher-facing ad resolution client.
///
/// A fresh client remembers sessions in process memory only; persistent tiers
/// are opt-in through [`SpecifyBuilder::session_store`].
pub struct Specify {
    store: TieredSessionStore,
    transport: Arc<dyn AdTransport>,
    key_fingerprint: String,
}

impl Specify {
    pub fn new(key: PublisherKey) -> Self {
        Self::builder(key).build()
    }

    pub fn builder(key: PublisherKey) -> SpecifyBuilder {
        SpecifyBuilder::new(key)
    }

    /// Resolves an ad for the supplied wallet addresses.
    ///
    /// Addresses are merged with the cached session set before the request
    /// goes out, and the session identifier returned by the server is kept
    /// for the next call. `Ok(None)` means the server had no fill.
    pub async fn serve<I>(
        &self,
        wallet_addresses: I,
        options: &ServeOptions,
    ) -> Result<Option<SpecifyAd>, SpecifyError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let outcome = self.serve_inner(wallet_addresses, options).await;
        let result = match &outcome {
            Ok(Some(_)) => "served",
            Ok(None) => "no_fill",
            Err(SpecifyError::Validation { .. }) => "validation",
            Err(SpecifyError::Authentication(_)) => "authentication",
            Err(SpecifyError::Api { .. }) => "api",
        };
        counter!("sdk_serve_requests_total", 1, "result" => result);
        outcome
    }

    async fn serve_inner<I>(
        &self,
        wallet_addresses: I,
        options: &ServeOptions,
    ) -> Result<Option<SpecifyAd>, SpecifyError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let cached = self.store.load().await;
        let request = compose_request(wallet_addresses, cached.as_ref(), options)?;

        // Snapshot the merged address set before the network call so a failed
        // request still leaves it behind for the next one.
        let mut snapshot = CachedSession::new(request.wallet_addresses.clone());
        snapshot.local_id = request.local_id.clone();
        self.store.save(&snapshot).await;

        debug!(
            key = %self.key_fingerprint,
            addresses = request.wallet_addresses.len(),
            "requesting ad"
        );

        let response = self.transport.send(&request).await?;
        let resolution = resolve_response(response)?;

        match resolution.cache {
            CacheDirective::Remember(local_id) => self.store.remember_local_id(&local_id).await,
            CacheDirective::Clear => self.store.clear().await,
            CacheDirective::Keep => {}
        }

        Ok(resolution.ad)
    }
}
