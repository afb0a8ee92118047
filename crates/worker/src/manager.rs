//! The request cache manager.
//!
//! Implements the three entry points the surrounding runtime drives:
//!
//! - `install`: precache the manifest into the current generation
//! - `activate`: drop every generation except the current one
//! - `handle`: per-request dispatch, network-first for navigations with
//!   an offline fallback and stale-while-revalidate for sub-resources
//!
//! Collaborators (store and fetch capability) are injected so tests can
//! run against an in-memory store and a scripted fetch double.

use std::sync::Arc;

use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinSet;
use url::Url;

use offcache_core::store::resource_key;
use offcache_core::{CacheDb, Error, FetchError, ResponseSnapshot};

use crate::fetch::{Fetch, resolve};

/// Whether a request is a top-level document load or a sub-resource fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Top-level page load.
    Navigation,
    /// Script, style, image, API call.
    SubResource,
}

/// An incoming request delivered by the interception runtime.
#[derive(Debug, Clone)]
pub struct Request {
    /// Site-relative path or absolute URL.
    pub resource: String,
    pub kind: RequestKind,
}

impl Request {
    pub fn navigation(resource: impl Into<String>) -> Self {
        Self { resource: resource.into(), kind: RequestKind::Navigation }
    }

    pub fn sub_resource(resource: impl Into<String>) -> Self {
        Self { resource: resource.into(), kind: RequestKind::SubResource }
    }
}

/// Decides, per request, whether to serve from cache, network, or a blend,
/// and keeps the store consistent across generation upgrades.
pub struct CacheManager<F> {
    store: CacheDb,
    fetcher: Arc<F>,
    origin: String,
    generation: String,
    offline_fallback: String,
    revalidations: Mutex<JoinSet<()>>,
}

impl<F: Fetch + 'static> CacheManager<F> {
    /// Create a manager for the given generation with injected collaborators.
    pub fn new(
        store: CacheDb, fetcher: F, origin: impl Into<String>, generation: impl Into<String>,
        offline_fallback: impl Into<String>,
    ) -> Self {
        Self {
            store,
            fetcher: Arc::new(fetcher),
            origin: origin.into(),
            generation: generation.into(),
            offline_fallback: offline_fallback.into(),
            revalidations: Mutex::new(JoinSet::new()),
        }
    }

    /// The current generation label.
    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// The underlying cache store.
    pub fn store(&self) -> &CacheDb {
        &self.store
    }

    /// Precache the manifest into the current generation.
    ///
    /// Entries are fetched in manifest order and written as they arrive.
    /// The first failed fetch aborts the install with [`Error::Precache`],
    /// leaving whatever was stored before the failure in place; the caller
    /// is expected to retry the whole install.
    pub async fn install(&self, manifest: &[String]) -> Result<(), Error> {
        for resource in manifest {
            let url = resolve(&self.origin, resource).map_err(|e| Error::InvalidUrl(e.to_string()))?;
            let response = self
                .fetcher
                .fetch(&url)
                .await
                .map_err(|source| Error::Precache { resource: resource.clone(), source })?;
            let key = resource_key(url.as_str());
            self.store
                .put_entry(&self.generation, &key, &response.into_snapshot())
                .await?;
            tracing::debug!(resource = %resource, "precached");
        }
        tracing::info!(generation = %self.generation, count = manifest.len(), "install complete");
        Ok(())
    }

    /// Delete every generation whose label differs from the current one.
    ///
    /// Idempotent; this is the sole mechanism for reclaiming space from
    /// prior builds. There is no size-based eviction.
    pub async fn activate(&self) -> Result<(), Error> {
        for label in self.store.list_generations().await? {
            if label != self.generation {
                let deleted = self.store.delete_generation(&label).await?;
                tracing::info!(generation = %label, deleted, "dropped stale generation");
            }
        }
        Ok(())
    }

    /// Handle one intercepted request, returning exactly one response.
    pub async fn handle(&self, request: &Request) -> Result<ResponseSnapshot, Error> {
        let url = resolve(&self.origin, &request.resource).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        match request.kind {
            RequestKind::Navigation => self.handle_navigation(&url).await,
            RequestKind::SubResource => self.handle_sub_resource(&url).await,
        }
    }

    /// Network-first: live content whenever the network answers, the
    /// precached offline fallback only on transport failure. A resolved
    /// response of any status is returned as-is and not cached.
    async fn handle_navigation(&self, url: &Url) -> Result<ResponseSnapshot, Error> {
        match self.fetcher.fetch(url).await {
            Ok(response) => Ok(response.into_snapshot()),
            Err(err) => {
                tracing::debug!(%url, error = %err, "navigation fetch failed, serving offline fallback");
                let fallback =
                    resolve(&self.origin, &self.offline_fallback).map_err(|e| Error::InvalidUrl(e.to_string()))?;
                let key = resource_key(fallback.as_str());
                match self.store.get_entry(&self.generation, &key).await? {
                    Some(snapshot) => Ok(snapshot),
                    None => Err(Error::MissingFallback(self.offline_fallback.clone())),
                }
            }
        }
    }

    /// Stale-while-revalidate: the cache lookup and the network fetch run
    /// concurrently. A cache hit is returned immediately; the fetch, once
    /// resolved, refreshes the entry for the next request. On a miss the
    /// fetch result is the response.
    async fn handle_sub_resource(&self, url: &Url) -> Result<ResponseSnapshot, Error> {
        let key = resource_key(url.as_str());

        // The spawned task owns the store write, so the write runs to
        // completion even when the caller has already taken the cached
        // value (or been cancelled). The oneshot carries the fetch
        // outcome back for the miss path.
        let (tx, rx) = oneshot::channel();
        {
            let fetcher = Arc::clone(&self.fetcher);
            let store = self.store.clone();
            let generation = self.generation.clone();
            let key = key.clone();
            let url = url.clone();

            let mut tasks = self.revalidations.lock().await;
            while tasks.try_join_next().is_some() {}
            tasks.spawn(async move {
                let outcome = match fetcher.fetch(&url).await {
                    Ok(response) => {
                        let snapshot = response.into_snapshot();
                        if let Err(err) = store.put_entry(&generation, &key, &snapshot).await {
                            tracing::warn!(%url, error = %err, "revalidation write failed");
                        }
                        Ok(snapshot)
                    }
                    Err(err) => {
                        tracing::debug!(%url, error = %err, "revalidation fetch failed");
                        Err(err)
                    }
                };
                let _ = tx.send(outcome);
            });
        }

        if let Some(cached) = self.store.get_entry(&self.generation, &key).await? {
            return Ok(cached);
        }

        match rx.await {
            Ok(Ok(snapshot)) => Ok(snapshot),
            Ok(Err(source)) => Err(Error::ResourceUnavailable { url: url.to_string(), source }),
            Err(_) => Err(Error::ResourceUnavailable {
                url: url.to_string(),
                source: FetchError::Transport("fetch task dropped".to_string()),
            }),
        }
    }

    /// Wait for all outstanding background revalidation writes.
    ///
    /// Called at shutdown so scheduled writes are not lost with the
    /// process; tests use it to observe the post-revalidation state.
    pub async fn quiesce(&self) {
        let mut tasks = self.revalidations.lock().await;
        while tasks.join_next().await.is_some() {}
    }
}
