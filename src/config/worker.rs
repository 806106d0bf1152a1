use crate::api::config::{ConfigChangeListenFn, ConfigResponse};
use crate::api::error::Result;
use crate::common::shutdown::ShutdownSignal;
use crate::config::fetcher::ConfigFetcher;
use crate::config::watcher::ChangeWatcher;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Who listens to config changes.
#[derive(Default)]
pub(crate) struct ConfigListeners {
    listeners: Mutex<Vec<Box<ConfigChangeListenFn>>>,
}

impl ConfigListeners {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add listener.
    pub(crate) fn add(&self, listener: Box<ConfigChangeListenFn>) {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.push(listener);
    }

    /// Notify listener.
    pub(crate) fn notify(&self, config_response: ConfigResponse) {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        for listen in listeners.iter() {
            (listen)(config_response.clone());
        }
    }
}

/// Fixed interval fetch, the backstop for missed notifications.
pub(crate) struct ScheduleLoop {
    fetcher: Arc<ConfigFetcher>,
    interval: Duration,
}

impl ScheduleLoop {
    pub(crate) fn new(fetcher: Arc<ConfigFetcher>, interval: Duration) -> Self {
        ScheduleLoop { fetcher, interval }
    }

    pub(crate) async fn run(self, mut shutdown: ShutdownSignal) {
        let namespace = self.fetcher.namespace_key().clone();
        tracing::info!(
            namespace = %namespace,
            interval_ms = self.interval.as_millis() as u64,
            "schedule update started"
        );
        loop {
            if shutdown.is_triggered() {
                break;
            }
            tokio::select! { biased;
                _ = shutdown.recv() => break,
                result = self.fetcher.fetch_once() => {
                    if let Err(e) = result {
                        tracing::warn!(namespace = %namespace, error = %e, "schedule update failed");
                    }
                },
            }
            tokio::select! { biased;
                _ = shutdown.recv() => break,
                _ = tokio::time::sleep(self.interval) => {},
            }
        }
        tracing::info!(namespace = %namespace, "schedule update stopped");
    }
}

/// The two background loops started by `listen`.
pub struct ListenHandle {
    schedule: JoinHandle<()>,
    watcher: JoinHandle<()>,
}

impl ListenHandle {
    /// Spawn both loops on the current tokio runtime.
    pub(crate) fn spawn(
        schedule: ScheduleLoop,
        watcher: ChangeWatcher,
        shutdown: ShutdownSignal,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()?;
        Ok(ListenHandle {
            schedule: runtime.spawn(schedule.run(shutdown.clone())),
            watcher: runtime.spawn(watcher.run(shutdown)),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.schedule.is_finished() && self.watcher.is_finished()
    }

    /// Wait until both loops have observed the shutdown and returned.
    pub async fn join(self) {
        let (schedule, watcher) = futures::future::join(self.schedule, self.watcher).await;
        for joined in [schedule, watcher] {
            if let Err(e) = joined {
                tracing::error!(error = %e, "config listener task failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::remote::mock::{refused, MockTransport};
    use crate::common::remote::HttpResponse;
    use crate::common::shutdown::Shutdown;
    use crate::config::cache::CacheStore;
    use crate::config::fetcher::tests::{changed, fetcher, CONFIG_URL};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_listeners_all_notified() {
        let listeners = ConfigListeners::new();
        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let calls = calls.clone();
            listeners.add(Box::new(move |_resp: ConfigResponse| {
                calls.fetch_add(1, Ordering::SeqCst);
            }));
        }
        listeners.notify(ConfigResponse::new(
            "table_use".to_string(),
            "default".to_string(),
            "application".to_string(),
            "r1".to_string(),
            Default::default(),
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_schedule_loop_survives_failures() {
        let transport = Arc::new(MockTransport::new());
        let cache = Arc::new(CacheStore::new(None));
        let shutdown = Shutdown::new();
        let fetcher = Arc::new(fetcher(transport.clone(), cache.clone(), &shutdown));

        transport.push(CONFIG_URL, refused());
        transport.push(CONFIG_URL, Ok(HttpResponse::new(502, "")));
        transport.push(CONFIG_URL, changed(r#"{"x":"1"}"#, "r2"));

        let task = tokio::spawn(
            ScheduleLoop::new(fetcher, Duration::from_millis(10)).run(shutdown.subscribe()),
        );
        tokio::time::timeout(Duration::from_secs(2), async {
            while cache.get("x").is_none() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("schedule loop did not recover");

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("schedule loop did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_schedule_loop_sleeps_full_interval() {
        let transport = Arc::new(MockTransport::new());
        let shutdown = Shutdown::new();
        let fetcher = Arc::new(fetcher(
            transport.clone(),
            Arc::new(CacheStore::new(None)),
            &shutdown,
        ));
        transport.push(CONFIG_URL, Ok(HttpResponse::new(304, "")));

        let task = tokio::spawn(
            ScheduleLoop::new(fetcher, Duration::from_secs(3600)).run(shutdown.subscribe()),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(transport.count(CONFIG_URL), 1);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("schedule loop did not stop while sleeping")
            .unwrap();
    }
}
