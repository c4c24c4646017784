//! Prefetch Scheduler
//!
//! Warms up related views while the host is idle. Scheduling never blocks
//! and never fails the caller:
//!
//! ```text
//! schedule(entries)
//!     │
//!     ├── nothing loadable / host cannot schedule ──► None
//!     ▼
//! spawn ──► wait: idle (bounded by idle_timeout) or fallback_delay
//!     │
//!     ▼
//! for each entry: mark key ──► load ──► failure: unmark (retry later)
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use mosaic_core::PrefetchSettings;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::lazy::ViewLoader;

/// One prefetchable module
#[derive(Clone)]
pub struct PrefetchEntry {
    /// `"<feature>:<hint>"`
    pub key: String,
    pub loader: Option<ViewLoader>,
}

impl PrefetchEntry {
    pub fn new(key: impl Into<String>, loader: ViewLoader) -> Self {
        Self {
            key: key.into(),
            loader: Some(loader),
        }
    }
}

impl fmt::Debug for PrefetchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefetchEntry")
            .field("key", &self.key)
            .field("has_loader", &self.loader.is_some())
            .finish()
    }
}

/// Environment the scheduler runs in
#[async_trait]
pub trait SchedulingHost: Send + Sync {
    /// Whether deferred work can run at all
    fn can_schedule(&self) -> bool;

    fn has_idle_primitive(&self) -> bool;

    /// Resolves when the host becomes idle
    async fn idle(&self);
}

/// Host backed by the current tokio runtime, optionally with an idle signal
#[derive(Debug, Clone, Default)]
pub struct RuntimeHost {
    idle_signal: Option<Arc<Notify>>,
}

impl RuntimeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `signal` as the idle primitive; `notify_one` marks the host idle
    pub fn with_idle_signal(signal: Arc<Notify>) -> Self {
        Self {
            idle_signal: Some(signal),
        }
    }
}

#[async_trait]
impl SchedulingHost for RuntimeHost {
    fn can_schedule(&self) -> bool {
        tokio::runtime::Handle::try_current().is_ok()
    }

    fn has_idle_primitive(&self) -> bool {
        self.idle_signal.is_some()
    }

    async fn idle(&self) {
        if let Some(signal) = &self.idle_signal {
            signal.notified().await;
        }
    }
}

/// Session-wide prefetch scheduler; remembers which keys were already warmed up
pub struct PrefetchScheduler {
    host: Arc<dyn SchedulingHost>,
    settings: PrefetchSettings,
    prefetched: Arc<Mutex<HashSet<String>>>,
}

impl PrefetchScheduler {
    pub fn new(host: Arc<dyn SchedulingHost>) -> Self {
        Self::with_settings(host, PrefetchSettings::default())
    }

    pub fn with_settings(host: Arc<dyn SchedulingHost>, settings: PrefetchSettings) -> Self {
        Self {
            host,
            settings,
            prefetched: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Defer loading `entries` until the host is idle.
    ///
    /// Returns the spawned task, or `None` when there is nothing to do.
    pub fn schedule(&self, entries: Vec<PrefetchEntry>) -> Option<JoinHandle<()>> {
        if entries.is_empty() || entries.iter().all(|e| e.loader.is_none()) {
            return None;
        }
        if !self.host.can_schedule() {
            trace!(entries = entries.len(), "Host cannot schedule, prefetch skipped");
            return None;
        }

        let host = self.host.clone();
        let prefetched = self.prefetched.clone();
        let idle_timeout = self.settings.idle_timeout();
        let fallback_delay = self.settings.fallback_delay();

        Some(tokio::spawn(async move {
            if host.has_idle_primitive() {
                if tokio::time::timeout(idle_timeout, host.idle()).await.is_err() {
                    trace!("Idle wait timed out, prefetching anyway");
                }
            } else {
                tokio::time::sleep(fallback_delay).await;
            }
            run_prefetch(entries, prefetched).await;
        }))
    }

    pub fn is_prefetched(&self, key: &str) -> bool {
        self.prefetched.lock().contains(key)
    }

    /// Forget every prefetched key
    pub fn reset(&self) {
        self.prefetched.lock().clear();
    }
}

async fn run_prefetch(entries: Vec<PrefetchEntry>, prefetched: Arc<Mutex<HashSet<String>>>) {
    let mut loads = Vec::new();
    for entry in entries {
        let Some(loader) = entry.loader else {
            continue;
        };
        if !prefetched.lock().insert(entry.key.clone()) {
            continue;
        }
        let prefetched = prefetched.clone();
        loads.push(async move {
            match loader().await {
                Ok(_) => debug!(key = %entry.key, "Prefetched"),
                Err(e) => {
                    prefetched.lock().remove(&entry.key);
                    debug!(key = %entry.key, error = %e, "Prefetch failed");
                }
            }
        });
    }
    join_all(loads).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::lazy::ViewModule;
    use futures::FutureExt;
    use mosaic_types::ViewRef;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn settings() -> PrefetchSettings {
        PrefetchSettings {
            idle_timeout_ms: 200,
            fallback_delay_ms: 10,
        }
    }

    fn loader(calls: Arc<AtomicUsize>, failures: usize) -> ViewLoader {
        Arc::new(move || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                if n < failures {
                    Err(LoadError::failed("features/user/pages/LoginPage.tsx", "offline"))
                } else {
                    Ok(ViewModule {
                        path: "features/user/pages/LoginPage.tsx".to_string(),
                        default_export: ViewRef::new("LoginPage"),
                    })
                }
            }
            .boxed()
        })
    }

    struct Headless;

    #[async_trait]
    impl SchedulingHost for Headless {
        fn can_schedule(&self) -> bool {
            false
        }

        fn has_idle_primitive(&self) -> bool {
            false
        }

        async fn idle(&self) {}
    }

    #[tokio::test]
    async fn test_nothing_to_schedule() {
        let scheduler = PrefetchScheduler::with_settings(Arc::new(RuntimeHost::new()), settings());
        assert!(scheduler.schedule(vec![]).is_none());
        assert!(scheduler
            .schedule(vec![PrefetchEntry {
                key: "todo:pages/A.tsx".to_string(),
                loader: None,
            }])
            .is_none());

        let calls = Arc::new(AtomicUsize::new(0));
        let headless = PrefetchScheduler::with_settings(Arc::new(Headless), settings());
        assert!(headless
            .schedule(vec![PrefetchEntry::new("todo:pages/A.tsx", loader(calls, 0))])
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_schedule_loads_once() {
        let scheduler = PrefetchScheduler::with_settings(Arc::new(RuntimeHost::new()), settings());
        let calls = Arc::new(AtomicUsize::new(0));
        let entry = PrefetchEntry::new("todo:../user/pages/LoginPage.tsx", loader(calls.clone(), 0));

        let first = scheduler.schedule(vec![entry.clone()]).unwrap();
        let second = scheduler.schedule(vec![entry]).unwrap();
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(scheduler.is_prefetched("todo:../user/pages/LoginPage.tsx"));
    }

    #[tokio::test]
    async fn test_failure_allows_one_retry() {
        let scheduler = PrefetchScheduler::with_settings(Arc::new(RuntimeHost::new()), settings());
        let calls = Arc::new(AtomicUsize::new(0));
        let entry = PrefetchEntry::new("user:pages/LoginPage.tsx", loader(calls.clone(), 1));

        scheduler.schedule(vec![entry.clone()]).unwrap().await.unwrap();
        assert!(!scheduler.is_prefetched("user:pages/LoginPage.tsx"));

        scheduler.schedule(vec![entry.clone()]).unwrap().await.unwrap();
        assert!(scheduler.is_prefetched("user:pages/LoginPage.tsx"));

        scheduler.schedule(vec![entry]).unwrap().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        scheduler.reset();
        assert!(!scheduler.is_prefetched("user:pages/LoginPage.tsx"));
    }

    #[tokio::test]
    async fn test_waits_for_idle_signal() {
        let signal = Arc::new(Notify::new());
        let scheduler = PrefetchScheduler::with_settings(
            Arc::new(RuntimeHost::with_idle_signal(signal.clone())),
            PrefetchSettings {
                idle_timeout_ms: 5_000,
                fallback_delay_ms: 10,
            },
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = scheduler
            .schedule(vec![PrefetchEntry::new("todo:pages/A.tsx", loader(calls.clone(), 0))])
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        signal.notify_one();
        handle.await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_idle_timeout_bounds_the_wait() {
        let scheduler = PrefetchScheduler::with_settings(
            Arc::new(RuntimeHost::with_idle_signal(Arc::new(Notify::new()))),
            settings(),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        scheduler
            .schedule(vec![PrefetchEntry::new("todo:pages/A.tsx", loader(calls.clone(), 0))])
            .unwrap()
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
