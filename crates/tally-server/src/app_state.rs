//! Shared application state for the tally server.
//!
//! One `CounterStore` is built from config at startup and shared by every
//! request through this state; handlers never reach for globals.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tally_core::counter::CounterStore;
use tally_core::error::Result;

use crate::config::TallyConfig;
use crate::obs::ServerMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: TallyConfig,
    store: Arc<CounterStore>,
    metrics: ServerMetrics,
    last_count: AtomicU64,
}

impl AppState {
    /// Build application state. Performs no I/O; call
    /// [`CounterStore::init`] via [`AppState::store`] to prepare storage.
    pub fn new(cfg: TallyConfig) -> Result<Self> {
        cfg.validate()?;
        let store = CounterStore::with_file(&cfg.storage.data_dir, &cfg.storage.file_name);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                store: Arc::new(store),
                metrics: ServerMetrics::default(),
                last_count: AtomicU64::new(0),
            }),
        })
    }

    pub fn cfg(&self) -> &TallyConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> Arc<CounterStore> {
        Arc::clone(&self.inner.store)
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.inner.metrics
    }

    /// Remember the most recent count served, for the metrics gauge.
    pub fn observe_count(&self, count: u64) {
        self.inner.last_count.store(count, Ordering::Relaxed);
    }

    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![("tally_counter_value", self.inner.last_count.load(Ordering::Relaxed))]
    }
}
