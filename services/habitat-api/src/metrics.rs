//! Application metrics collection and reporting.

use metrics::{counter, gauge, histogram};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use storage::RasterCacheStats;

/// Metrics collector for the composite pipeline.
#[derive(Debug)]
pub struct PipelineMetrics {
    pub composite_requests: AtomicU64,
    pub composite_errors: AtomicU64,
    /// Requests answered without rendering (no factors selected)
    pub empty_selections: AtomicU64,
    pub catalog_reloads: AtomicU64,

    render_times: Mutex<TimingStats>,

    start_time: Instant,
}

#[derive(Debug, Default, Clone, Copy)]
struct TimingStats {
    count: u64,
    total_us: u64,
    min_us: u64,
    max_us: u64,
    last_us: u64,
}

impl TimingStats {
    fn record(&mut self, duration_us: u64) {
        self.count += 1;
        self.total_us += duration_us;
        self.last_us = duration_us;
        if self.min_us == 0 || duration_us < self.min_us {
            self.min_us = duration_us;
        }
        if duration_us > self.max_us {
            self.max_us = duration_us;
        }
    }

    fn avg_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.total_us as f64 / self.count as f64) / 1000.0
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            composite_requests: AtomicU64::new(0),
            composite_errors: AtomicU64::new(0),
            empty_selections: AtomicU64::new(0),
            catalog_reloads: AtomicU64::new(0),
            render_times: Mutex::new(TimingStats::default()),
            start_time: Instant::now(),
        }
    }

    pub fn record_request(&self) {
        self.composite_requests.fetch_add(1, Ordering::Relaxed);
        counter!("composite_requests_total").increment(1);
    }

    /// Record a failed request, labelled by error code
    pub fn record_error(&self, code: &'static str) {
        self.composite_errors.fetch_add(1, Ordering::Relaxed);
        counter!("composite_errors_total", "code" => code).increment(1);
    }

    pub fn record_empty_selection(&self) {
        self.empty_selections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed render
    pub fn record_render(&self, duration_us: u64) {
        histogram!("composite_render_duration_seconds").record(duration_us as f64 / 1_000_000.0);

        let mut times = self
            .render_times
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        times.record(duration_us);
    }

    pub fn record_catalog_reload(&self, factors: usize) {
        self.catalog_reloads.fetch_add(1, Ordering::Relaxed);
        gauge!("catalog_factors").set(factors as f64);
    }

    /// Publish raster cache statistics as gauges
    pub fn record_raster_cache_stats(&self, stats: &RasterCacheStats) {
        gauge!("raster_cache_entries").set(stats.entries as f64);
        gauge!("raster_cache_hit_rate_percent").set(stats.hit_rate());
        gauge!("raster_cache_memory_mb").set(stats.estimated_memory_mb());
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let times = *self
            .render_times
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            composite_requests: self.composite_requests.load(Ordering::Relaxed),
            composite_errors: self.composite_errors.load(Ordering::Relaxed),
            empty_selections: self.empty_selections.load(Ordering::Relaxed),
            catalog_reloads: self.catalog_reloads.load(Ordering::Relaxed),
            renders: times.count,
            render_avg_ms: times.avg_ms(),
            render_last_ms: times.last_us as f64 / 1000.0,
            render_min_ms: times.min_us as f64 / 1000.0,
            render_max_ms: times.max_us as f64 / 1000.0,
        }
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub composite_requests: u64,
    pub composite_errors: u64,
    pub empty_selections: u64,
    pub catalog_reloads: u64,
    pub renders: u64,
    pub render_avg_ms: f64,
    pub render_last_ms: f64,
    pub render_min_ms: f64,
    pub render_max_ms: f64,
}

/// Timer helper for measuring durations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}
