use crate::api::constants::INITIAL_NOTIFICATION_ID;
use crate::api::error::{Error, Result};
use crate::common::remote::HttpTransport;
use crate::common::shutdown::ShutdownSignal;
use crate::config::fetcher::ConfigFetcher;
use crate::config::server_response::ConfigNotification;
use crate::config::util;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WatchOutcome {
    /// The server reported a change, carries the watermark held afterwards.
    Notified(i64),
    /// The long-poll window elapsed without a change.
    NoChange,
}

/// Long-polls the notification endpoint and pulls the namespace on every change.
pub(crate) struct ChangeWatcher {
    fetcher: Arc<ConfigFetcher>,
    transport: Arc<dyn HttpTransport>,
    notification_url: String,
    notification_id: i64,
    /// Client side bound of one long-poll, longer than the server side window.
    timeout: Duration,
    backoff: Duration,
}

impl ChangeWatcher {
    pub(crate) fn new(
        fetcher: Arc<ConfigFetcher>,
        transport: Arc<dyn HttpTransport>,
        notification_url: String,
        timeout: Duration,
        backoff: Duration,
    ) -> Self {
        ChangeWatcher {
            fetcher,
            transport,
            notification_url,
            notification_id: INITIAL_NOTIFICATION_ID,
            timeout,
            backoff,
        }
    }

    pub(crate) fn notification_id(&self) -> i64 {
        self.notification_id
    }

    /// One long-poll round trip, followed by a fetch when the server reports a change.
    ///
    /// Only a failed notification request is an error. A failed fetch after
    /// a notification is logged and left to the schedule loop.
    pub(crate) async fn step(&mut self) -> Result<WatchOutcome> {
        let namespace = &self.fetcher.namespace_key().namespace;
        let url =
            util::notification_query_url(&self.notification_url, namespace, self.notification_id);
        let resp = self.transport.get(&url, self.timeout).await?;

        match resp.status {
            304 => Ok(WatchOutcome::NoChange),
            200 => {
                let notifications = ConfigNotification::list_from_body(&resp.body)?;
                let notification = notifications
                    .iter()
                    .find(|n| &n.namespaceName == namespace)
                    .or_else(|| notifications.first())
                    .ok_or_else(|| Error::MalformedBody("empty notification list".to_string()))?;

                if notification.notificationId > self.notification_id {
                    self.notification_id = notification.notificationId;
                } else {
                    tracing::debug!(
                        namespace = %namespace,
                        held = self.notification_id,
                        received = notification.notificationId,
                        "stale notification id ignored"
                    );
                }
                tracing::info!(
                    namespace = %namespace,
                    notification_id = self.notification_id,
                    "config change notified"
                );

                if let Err(e) = self.fetcher.fetch_once().await {
                    tracing::warn!(namespace = %namespace, error = %e, "fetch after notification failed");
                }
                Ok(WatchOutcome::Notified(self.notification_id))
            }
            status => Err(Error::UnexpectedStatus(status)),
        }
    }

    pub(crate) async fn run(mut self, mut shutdown: ShutdownSignal) {
        tracing::info!(namespace = %self.fetcher.namespace_key(), "change watcher started");
        loop {
            if shutdown.is_triggered() {
                break;
            }
            let step = tokio::select! { biased;
                _ = shutdown.recv() => break,
                step = self.step() => step,
            };
            if let Err(e) = step {
                tracing::warn!(
                    namespace = %self.fetcher.namespace_key(),
                    error = %e,
                    backoff_ms = self.backoff.as_millis() as u64,
                    "long polling failed, backing off"
                );
                tokio::select! { biased;
                    _ = shutdown.recv() => break,
                    _ = tokio::time::sleep(self.backoff) => {},
                }
            }
        }
        tracing::info!(namespace = %self.fetcher.namespace_key(), "change watcher stopped");
    }
}
