use async_trait::async_trait;

/// Reachability check against a URL. Every kind of failure collapses to `false`.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn is_reachable(&self, url: &str) -> bool;
}
