use crate::error::Result;
use crate::table::Table;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Memoizes the merged view for a short time window.
///
/// A view computed less than `ttl` ago is handed out again; anything older, or
/// anything after [`ViewCache::invalidate`], is recomputed. Failed loads are
/// never cached.
#[derive(Debug)]
pub struct ViewCache {
    ttl: Duration,
    entry: Option<(Instant, Arc<Table>)>,
}

impl ViewCache {
    pub fn new(ttl: Duration) -> Self {
        ViewCache { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get_or_load<F>(&mut self, load: F) -> Result<Arc<Table>>
    where
        F: FnOnce() -> Result<Table>,
    {
        self.get_or_load_at(Instant::now(), load)
    }

    /// Same as [`ViewCache::get_or_load`] with an explicit clock.
    pub fn get_or_load_at<F>(&mut self, now: Instant, load: F) -> Result<Arc<Table>>
    where
        F: FnOnce() -> Result<Table>,
    {
        if let Some((loaded_at, view)) = &self.entry {
            if now.saturating_duration_since(*loaded_at) < self.ttl {
                log::debug!("view cache hit");
                return Ok(Arc::clone(view));
            }
        }

        log::debug!("view cache miss, reloading");
        let view = Arc::new(load()?);
        self.entry = Some((now, Arc::clone(&view)));
        Ok(view)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_warm(&self) -> bool {
        self.entry.is_some()
    }
}

impl Default for ViewCache {
    fn default() -> Self {
        ViewCache::new(Duration::from_secs(1))
    }
}
