use std::sync::Arc;

use crate::config::{self, RateLimitConfig};
use crate::hypermedia::LinkService;
use crate::models::{Entry, Habit, ResourceKind, Tag};
use crate::rate_limit::RateLimiterStore;
use crate::services::GitHubService;
use crate::sorting::{SortError, SortMappingRegistry};
use crate::store::DataStore;

/// Shared serving state. Everything here is immutable after boot (the store
/// interior-mutates behind its own locks), so handlers clone cheaply.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub sort_registry: Arc<SortMappingRegistry>,
    pub links: Arc<LinkService>,
    pub limiter: Arc<RateLimiterStore>,
    pub github: Arc<GitHubService>,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>) -> Result<Self, SortError> {
        Self::with_rate_limit(store, config::config().rate_limit.clone())
    }

    /// Build state with an explicit rate-limit config, bypassing the global
    /// one. Used by tests that need the limiter enabled with small budgets.
    pub fn with_rate_limit(
        store: Arc<dyn DataStore>,
        rate_limit: RateLimitConfig,
    ) -> Result<Self, SortError> {
        let cfg = config::config();
        Ok(Self {
            store,
            sort_registry: Arc::new(build_sort_registry()?),
            links: Arc::new(LinkService::new(cfg.api.public_base_url.clone())),
            limiter: Arc::new(RateLimiterStore::new(rate_limit)),
            github: Arc::new(GitHubService::new(cfg.github.base_url.clone())),
        })
    }
}

/// All sort whitelists, registered once at boot. A duplicate registration
/// here is a programming error and fails startup.
fn build_sort_registry() -> Result<SortMappingRegistry, SortError> {
    let mut registry = SortMappingRegistry::new();
    registry.register(ResourceKind::Habit, Habit::sort_mapping())?;
    registry.register(ResourceKind::Tag, Tag::sort_mapping())?;
    registry.register(ResourceKind::Entry, Entry::sort_mapping())?;
    Ok(registry)
}
