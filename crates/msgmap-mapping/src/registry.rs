//! Concurrent route registry
//!
//! Caches loaded routes as shared immutable configs. A refresh replaces the
//! cached `Arc` wholesale; callers holding the previous config keep using it.

use crate::config::MappingConfig;
use crate::loader::RouteLoader;
use crate::Result;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Thread-safe cache of route configurations backed by a [`RouteLoader`]
#[derive(Debug)]
pub struct RouteRegistry {
    loader: RouteLoader,
    routes: DashMap<String, Arc<MappingConfig>>,
}

impl RouteRegistry {
    /// Create an empty registry over `loader`
    #[must_use]
    pub fn new(loader: RouteLoader) -> Self {
        Self {
            loader,
            routes: DashMap::new(),
        }
    }

    /// The loader used on cache misses
    #[must_use]
    pub fn loader(&self) -> &RouteLoader {
        &self.loader
    }

    /// Cached route, if any
    #[must_use]
    pub fn get(&self, route_id: &str) -> Option<Arc<MappingConfig>> {
        self.routes.get(route_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Insert or replace a route under its own id
    pub fn register(&self, config: MappingConfig) -> Arc<MappingConfig> {
        let config = Arc::new(config);
        self.routes.insert(config.route_id.clone(), Arc::clone(&config));
        config
    }

    /// Cached route, loading it on a miss
    ///
    /// # Errors
    ///
    /// Propagates loader errors; nothing is cached on failure.
    pub fn get_or_load(&self, route_id: &str) -> Result<Arc<MappingConfig>> {
        if let Some(cached) = self.get(route_id) {
            trace!(route = route_id, "route cache hit");
            return Ok(cached);
        }
        debug!(route = route_id, "route cache miss");
        let config = self.loader.load(route_id)?;
        Ok(self.register(config))
    }

    /// Reload one route from disk, replacing the cached entry
    ///
    /// # Errors
    ///
    /// Propagates loader errors; the previous entry stays cached on failure.
    pub fn refresh(&self, route_id: &str) -> Result<Arc<MappingConfig>> {
        let config = self.loader.load(route_id)?;
        info!(route = route_id, "refreshed route");
        Ok(self.register(config))
    }

    /// Reload every route in the directory and drop routes no longer on disk
    ///
    /// # Errors
    ///
    /// Propagates loader errors; the cache is left unchanged on failure.
    pub fn refresh_all(&self) -> Result<usize> {
        let configs = self.loader.load_all()?;
        let ids: Vec<String> = configs.iter().map(|c| c.route_id.clone()).collect();

        self.routes.retain(|id, _| ids.contains(id));
        for config in configs {
            self.register(config);
        }
        info!(count = ids.len(), "refreshed all routes");
        Ok(ids.len())
    }

    /// Remove a route from the cache
    pub fn evict(&self, route_id: &str) -> Option<Arc<MappingConfig>> {
        self.routes.remove(route_id).map(|(_, config)| config)
    }

    /// Number of cached routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Cached route ids, sorted
    #[must_use]
    pub fn route_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.routes.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }
}
