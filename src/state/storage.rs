//! Pending form expiry
//!
//! Runs a periodic purge of forms that have been idle longer than the
//! configured TTL.

use std::sync::Arc;
use std::time::Duration as StdDuration;
use chrono::{Duration, Utc};
use tracing::{error, info, warn};
use crate::database::FormStore;

pub struct FormCleanupManager {
    forms: Arc<dyn FormStore>,
    ttl: Duration,
    interval: StdDuration,
    cleanup_handle: Option<tokio::task::JoinHandle<()>>,
}

impl FormCleanupManager {
    pub fn new(forms: Arc<dyn FormStore>, ttl: Duration, interval: StdDuration) -> Self {
        Self {
            forms,
            ttl,
            interval,
            cleanup_handle: None,
        }
    }

    /// Purge once, returning how many forms were removed
    pub async fn purge_once(&self) -> crate::Result<u64> {
        self.forms.purge_idle(Utc::now() - self.ttl).await
    }

    /// Start automatic cleanup task
    pub fn start_cleanup(&mut self) {
        if self.cleanup_handle.is_some() {
            warn!("Cleanup task is already running");
            return;
        }

        let forms = self.forms.clone();
        let ttl = self.ttl;
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            loop {
                ticker.tick().await;

                match forms.purge_idle(Utc::now() - ttl).await {
                    Ok(count) => {
                        if count > 0 {
                            info!("Cleanup task removed {} idle forms", count);
                        }
                    }
                    Err(e) => {
                        error!("Cleanup task failed: {}", e);
                    }
                }
            }
        });

        self.cleanup_handle = Some(handle);
        info!("Started automatic form cleanup with interval {:?}", self.interval);
    }

    /// Stop automatic cleanup task
    pub fn stop_cleanup(&mut self) {
        if let Some(handle) = self.cleanup_handle.take() {
            handle.abort();
            info!("Stopped automatic form cleanup");
        }
    }
}

impl Drop for FormCleanupManager {
    fn drop(&mut self) {
        self.stop_cleanup();
    }
}
