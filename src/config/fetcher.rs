use crate::api::config::ConfigResponse;
use crate::api::error::{Error, Result};
use crate::common::remote::HttpTransport;
use crate::common::shutdown::ShutdownSignal;
use crate::config::cache::{CacheStore, ConfigSnapshot};
use crate::config::server_response::ConfigQueryServerResponse;
use crate::config::util::{self, NamespaceKey};
use crate::config::worker::ConfigListeners;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FetchOutcome {
    /// The server sent a new revision and it was applied.
    Changed,
    /// The held release key is still current.
    NotModified,
}

/// Conditional GET of the namespace, the only writer of the cache.
pub(crate) struct ConfigFetcher {
    key: NamespaceKey,
    config_url: String,
    timeout: Duration,
    transport: Arc<dyn HttpTransport>,
    cache: Arc<CacheStore>,
    listeners: Arc<ConfigListeners>,
    shutdown: ShutdownSignal,
}

impl ConfigFetcher {
    pub(crate) fn new(
        key: NamespaceKey,
        config_url: String,
        timeout: Duration,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<CacheStore>,
        listeners: Arc<ConfigListeners>,
        shutdown: ShutdownSignal,
    ) -> Self {
        ConfigFetcher {
            key,
            config_url,
            timeout,
            transport,
            cache,
            listeners,
            shutdown,
        }
    }

    pub(crate) fn namespace_key(&self) -> &NamespaceKey {
        &self.key
    }

    /// Fetch once, asking with the held release key so an unchanged namespace answers `304`.
    pub(crate) async fn fetch_once(&self) -> Result<FetchOutcome> {
        let url = util::config_query_url(&self.config_url, self.cache.release_key().as_deref());
        let resp = self.transport.get(&url, self.timeout).await?;

        match resp.status {
            304 => {
                tracing::debug!(namespace = %self.key, status = resp.status, "config not modified");
                Ok(FetchOutcome::NotModified)
            }
            200 => {
                let query = ConfigQueryServerResponse::from_body(&resp.body)?;
                if let Some(namespace_name) = query.get_namespace_name() {
                    if namespace_name != &self.key.namespace {
                        tracing::debug!(
                            namespace = %self.key,
                            served = %namespace_name,
                            "server answered with another namespace name"
                        );
                    }
                }
                if self.shutdown.is_triggered() {
                    return Err(Error::Closed);
                }

                let (configurations, release_key) = query.into_parts();
                let applied = self.cache.apply(ConfigSnapshot::new(
                    configurations.clone(),
                    Some(release_key.clone()),
                ));
                tracing::info!(
                    namespace = %self.key,
                    status = resp.status,
                    release_key = %release_key,
                    keys = applied.entries.len(),
                    "config updated"
                );

                self.listeners.notify(ConfigResponse::new(
                    self.key.app_id.clone(),
                    self.key.cluster.clone(),
                    self.key.namespace.clone(),
                    release_key,
                    configurations,
                ));
                Ok(FetchOutcome::Changed)
            }
            status => Err(Error::UnexpectedStatus(status)),
        }
    }
}
