//! Request classification for the offline cache layer.

/// Hosts that are never intercepted or cached: the backend API and its
/// client-library CDN. Authenticated or fast-changing responses must not be
/// served from cache.
pub const BYPASS_HOSTS: &[&str] = &["supabase.co", "cdn.jsdelivr.net"];

/// Shell resources that must always check the network first so code and
/// markup update promptly.
pub const NETWORK_FIRST: &[&str] = &[
    "/",
    "/index.html",
    "/styles.css",
    "/app.js",
    "/service-worker.js",
];

#[derive(Debug, Clone)]
pub struct ShellRequest {
    pub method: String,
    pub url: String,
    /// True for top-level document navigations.
    pub navigation: bool,
}

impl ShellRequest {
    pub fn get(url: &str) -> Self {
        ShellRequest {
            method: "GET".to_string(),
            url: url.to_string(),
            navigation: false,
        }
    }

    pub fn navigate(url: &str) -> Self {
        ShellRequest {
            method: "GET".to_string(),
            url: url.to_string(),
            navigation: true,
        }
    }

    /// URL path with any query string stripped.
    pub fn path(&self) -> &str {
        self.url.split(['?', '#']).next().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Straight to network, untouched by the caching layer.
    Bypass,
    NetworkFirst,
    CacheFirst,
}

/// Decide how a request is served. Only GETs are considered; API and CDN
/// hosts are never intercepted; shell code/markup and navigations are
/// network-first; everything else is cache-first.
pub fn classify(request: &ShellRequest) -> FetchStrategy {
    if request.method != "GET" {
        return FetchStrategy::Bypass;
    }
    if BYPASS_HOSTS.iter().any(|host| request.url.contains(host)) {
        return FetchStrategy::Bypass;
    }
    if request.navigation || NETWORK_FIRST.contains(&request.path()) {
        return FetchStrategy::NetworkFirst;
    }
    FetchStrategy::CacheFirst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_get_is_bypassed() {
        let mut req = ShellRequest::get("/styles.css");
        req.method = "POST".to_string();
        assert_eq!(classify(&req), FetchStrategy::Bypass);
    }

    #[test]
    fn api_and_cdn_hosts_are_never_intercepted() {
        let api = ShellRequest::get("https://xyz.supabase.co/rest/v1/scouts?select=*");
        assert_eq!(classify(&api), FetchStrategy::Bypass);
        let cdn = ShellRequest::get("https://cdn.jsdelivr.net/npm/@supabase/supabase-js@2");
        assert_eq!(classify(&cdn), FetchStrategy::Bypass);
    }

    #[test]
    fn shell_code_and_navigations_are_network_first() {
        assert_eq!(classify(&ShellRequest::get("/app.js")), FetchStrategy::NetworkFirst);
        assert_eq!(
            classify(&ShellRequest::get("/index.html?v=2")),
            FetchStrategy::NetworkFirst
        );
        assert_eq!(
            classify(&ShellRequest::navigate("/scouts")),
            FetchStrategy::NetworkFirst
        );
    }

    #[test]
    fn static_assets_are_cache_first() {
        assert_eq!(
            classify(&ShellRequest::get("/assets/scout-logo.svg")),
            FetchStrategy::CacheFirst
        );
        assert_eq!(
            classify(&ShellRequest::get("/manifest.webmanifest")),
            FetchStrategy::CacheFirst
        );
    }
}
