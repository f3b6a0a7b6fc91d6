//! In-memory cache for decoded factor rasters.
//!
//! Rasters are loaded lazily on first use and kept for the life of the
//! process (or until an explicit [`RasterCache::clear`]). Entries are
//! immutable and handed out as `Arc<RasterGrid>`, so readers never block
//! each other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use habitat_common::{HabitatResult, RasterGrid};
use serde::Serialize;
use tracing::{debug, info};

/// Statistics for the raster cache
#[derive(Debug, Default, Clone, Serialize)]
pub struct RasterCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub total_values_cached: u64,
}

impl RasterCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Estimated memory usage in MB
    pub fn estimated_memory_mb(&self) -> f64 {
        // Each f32 is 4 bytes
        (self.total_values_cached as f64 * 4.0) / (1024.0 * 1024.0)
    }
}

/// How a [`RasterCache::get_or_load`] call was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    Hit,
    /// The loader ran, even if a racing caller inserted first
    Miss,
}

/// Path-keyed cache of decoded rasters.
#[derive(Debug, Default)]
pub struct RasterCache {
    entries: RwLock<HashMap<PathBuf, Arc<RasterGrid>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RasterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached raster for `key`, counting a hit or a miss.
    pub fn get(&self, key: &Path) -> Option<Arc<RasterGrid>> {
        let found = self.read().get(key).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Cached raster for `key`, loading it with `loader` on a miss.
    ///
    /// The loader runs without any lock held. If two callers race on the same
    /// key the first inserted raster wins and both receive it. A failed load
    /// leaves the cache untouched.
    pub fn get_or_load<F>(
        &self,
        key: &Path,
        loader: F,
    ) -> HabitatResult<(Arc<RasterGrid>, CacheLookup)>
    where
        F: FnOnce(&Path) -> HabitatResult<RasterGrid>,
    {
        if let Some(grid) = self.get(key) {
            return Ok((grid, CacheLookup::Hit));
        }

        let loaded = Arc::new(loader(key)?);

        let mut entries = self.write();
        let grid = entries
            .entry(key.to_path_buf())
            .or_insert_with(|| loaded)
            .clone();

        debug!(
            path = %key.display(),
            width = grid.width(),
            height = grid.height(),
            entries = entries.len(),
            "Cached raster"
        );

        Ok((grid, CacheLookup::Miss))
    }

    /// Current statistics.
    pub fn stats(&self) -> RasterCacheStats {
        let entries = self.read();
        RasterCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len(),
            total_values_cached: entries.values().map(|g| g.data().len() as u64).sum(),
        }
    }

    /// Drop every cached raster and reset the counters. Returns the number
    /// of entries removed.
    pub fn clear(&self) -> usize {
        let removed = {
            let mut entries = self.write();
            let removed = entries.len();
            entries.clear();
            removed
        };
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);

        info!(removed, "Cleared raster cache");
        removed
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Entries are only ever replaced whole, so a poisoned lock still guards
    // consistent data.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, Arc<RasterGrid>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, Arc<RasterGrid>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}
