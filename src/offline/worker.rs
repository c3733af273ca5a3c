//! The offline cache worker: install-time pre-cache of the app shell, stale
//! store cleanup on activate, and per-request routing between network-first
//! and cache-first.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::offline::router::{self, FetchStrategy, ShellRequest};
use crate::offline::store::{CacheRegistry, CacheStore, CachedResponse};

/// Current cache store name. Bumping this is the only eviction mechanism.
pub const CACHE_NAME: &str = "scout-v4";

/// App shell — essential assets pre-cached on install.
pub const APP_SHELL: &[&str] = &[
    "/",
    "/index.html",
    "/styles.css",
    "/app.js",
    "/manifest.webmanifest",
    "/assets/scout-logo.svg",
    "/offline.html",
];

pub const OFFLINE_PAGE: &str = "/offline.html";

/// Where bytes come from when the cache can't answer. Production uses the
/// static asset directory; tests use a scripted origin that can go offline.
pub trait Origin: Send + Sync {
    fn fetch(&self, url: &str) -> Result<CachedResponse, OriginError>;
}

#[derive(Debug)]
pub struct OriginError(pub String);

impl std::fmt::Display for OriginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "origin fetch failed: {}", self.0)
    }
}

/// Serves shell URLs from a directory on disk.
pub struct FsOrigin {
    root: PathBuf,
}

impl FsOrigin {
    pub fn new(root: impl AsRef<Path>) -> Self {
        FsOrigin {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn content_type(path: &str) -> &'static str {
        match path.rsplit('.').next() {
            Some("html") => "text/html; charset=utf-8",
            Some("css") => "text/css; charset=utf-8",
            Some("js") => "application/javascript; charset=utf-8",
            Some("json") => "application/json",
            Some("webmanifest") => "application/manifest+json",
            Some("svg") => "image/svg+xml",
            Some("png") => "image/png",
            _ => "application/octet-stream",
        }
    }
}

impl Origin for FsOrigin {
    fn fetch(&self, url: &str) -> Result<CachedResponse, OriginError> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let relative = match path {
            "/" | "" => "index.html",
            p => p.trim_start_matches('/'),
        };
        // Refuse path traversal out of the asset root.
        if relative.split('/').any(|seg| seg == "..") {
            return Err(OriginError(format!("invalid path: {url}")));
        }
        let full = self.root.join(relative);
        match std::fs::read(&full) {
            Ok(body) => Ok(CachedResponse::ok(Self::content_type(relative), body)),
            Err(e) => Err(OriginError(format!("{}: {e}", full.display()))),
        }
    }
}

/// How a request was ultimately answered; handlers only need the response,
/// tests assert on the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Network,
    Cache,
    OfflineFallback,
    Timeout,
}

pub struct CacheWorker<O: Origin> {
    registry: CacheRegistry,
    origin: O,
}

impl<O: Origin> CacheWorker<O> {
    pub fn new(origin: O) -> Self {
        CacheWorker {
            registry: CacheRegistry::new(),
            origin,
        }
    }

    fn cache(&self) -> Arc<CacheStore> {
        self.registry.open(CACHE_NAME)
    }

    pub fn origin_ref(&self) -> &O {
        &self.origin
    }

    /// Install: eagerly fetch and store the app shell. Any failure fails the
    /// install (addAll semantics). Returns the number of cached resources.
    pub fn install(&self) -> Result<usize, OriginError> {
        let cache = self.cache();
        for url in APP_SHELL {
            let response = self.origin.fetch(url)?;
            cache.put(url, response);
        }
        log::info!("Cached app shell ({} resources) into {CACHE_NAME}", APP_SHELL.len());
        Ok(APP_SHELL.len())
    }

    /// Activate: delete every store whose name differs from the current
    /// version. Returns the deleted store names.
    pub fn activate(&self) -> Vec<String> {
        let removed = self.registry.purge_except(CACHE_NAME);
        for name in &removed {
            log::info!("Removing old cache: {name}");
        }
        removed
    }

    /// Route one request. `None` means the caching layer does not intercept
    /// it and the caller should go straight to the network.
    pub fn handle(&self, request: &ShellRequest) -> Option<(CachedResponse, ServedFrom)> {
        match router::classify(request) {
            FetchStrategy::Bypass => None,
            FetchStrategy::NetworkFirst => Some(self.network_first(request)),
            FetchStrategy::CacheFirst => Some(self.cache_first(request)),
        }
    }

    /// Fetch from the origin without touching the cache, for bypassed
    /// requests.
    pub fn passthrough(&self, request: &ShellRequest) -> Result<CachedResponse, OriginError> {
        self.origin.fetch(&request.url)
    }

    fn network_first(&self, request: &ShellRequest) -> (CachedResponse, ServedFrom) {
        let cache = self.cache();
        let path = request.path();
        match self.origin.fetch(&request.url) {
            Ok(response) => {
                // Fresh copy overwrites whatever was cached.
                cache.put(path, response.clone());
                (response, ServedFrom::Network)
            }
            Err(_) => {
                if let Some(cached) = cache.get(path) {
                    return (cached, ServedFrom::Cache);
                }
                if request.navigation {
                    if let Some(offline) = cache.get(OFFLINE_PAGE) {
                        return (offline, ServedFrom::OfflineFallback);
                    }
                }
                (CachedResponse::offline_timeout(), ServedFrom::Timeout)
            }
        }
    }

    fn cache_first(&self, request: &ShellRequest) -> (CachedResponse, ServedFrom) {
        let cache = self.cache();
        let path = request.path();
        if let Some(cached) = cache.get(path) {
            return (cached, ServedFrom::Cache);
        }
        match self.origin.fetch(&request.url) {
            Ok(response) => {
                if response.is_success() {
                    cache.put(path, response.clone());
                }
                (response, ServedFrom::Network)
            }
            Err(_) => {
                if request.navigation {
                    if let Some(offline) = cache.get(OFFLINE_PAGE) {
                        return (offline, ServedFrom::OfflineFallback);
                    }
                }
                (CachedResponse::offline_timeout(), ServedFrom::Timeout)
            }
        }
    }
}
