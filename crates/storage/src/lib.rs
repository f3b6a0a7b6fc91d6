//! Storage abstractions for the habitat overlay service.
//!
//! Provides:
//! - The layer catalog (factor name -> raster file + description)
//! - An in-memory cache of decoded factor rasters

pub mod catalog;
pub mod raster_cache;

pub use catalog::{FactorEntry, LayerCatalog};
pub use raster_cache::{CacheLookup, RasterCache, RasterCacheStats};
