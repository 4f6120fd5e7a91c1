//! Cache module for rendered pages
//!
//! Pages rendered by the live server are kept per request path and
//! re-rendered once they are older than the revalidation interval. When a
//! re-render fails, the stale copy keeps being served. Not-found results are
//! never stored, so the map only grows with the content that exists.

use anyhow::Result;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::generator::Rendered;

/// A rendered page and when it was produced
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub page: Rendered,
    pub rendered_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, revalidate: Duration) -> bool {
        now.saturating_duration_since(self.rendered_at) < revalidate
    }
}

/// Shared page cache keyed by request path
#[derive(Debug)]
pub struct PageCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    revalidate: Duration,
}

impl PageCache {
    pub fn new(revalidate: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            revalidate,
        }
    }

    pub fn revalidate(&self) -> Duration {
        self.revalidate
    }

    /// Return the cached page for `key`, rendering it when missing or stale
    pub async fn get_or_render<F, Fut>(&self, key: &str, now: Instant, render: F) -> Result<Rendered>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Rendered>>,
    {
        let stale = {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_fresh(now, self.revalidate) => {
                    tracing::debug!("Cache hit: {}", key);
                    return Ok(entry.page.clone());
                }
                Some(entry) => Some(entry.page.clone()),
                None => None,
            }
        };

        match render().await {
            Ok(page) if page.is_found() => {
                tracing::debug!("Rendered: {}", key);
                self.entries.write().await.insert(
                    key.to_string(),
                    CacheEntry {
                        page: page.clone(),
                        rendered_at: now,
                    },
                );
                Ok(page)
            }
            Ok(page) => {
                // Content was removed from the store
                if stale.is_some() {
                    self.entries.write().await.remove(key);
                }
                Ok(page)
            }
            Err(e) => match stale {
                Some(page) => {
                    tracing::warn!("Re-render of {} failed, serving stale page: {}", key, e);
                    Ok(page)
                }
                None => Err(e),
            },
        }
    }

    /// Drop one path so the next request renders it again
    pub async fn invalidate(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
