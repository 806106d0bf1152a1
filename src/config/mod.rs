pub(crate) mod cache;
mod fetcher;
mod server_response;
mod util;
mod watcher;
pub(crate) mod worker;

use crate::api::client_config::ClientConfig;
use crate::api::config::{ConfigChangeListenFn, ConfigService};
use crate::api::error::{Error, Result};
use crate::common::remote::{HttpTransport, ReqwestTransport};
use crate::common::shutdown::Shutdown;
use crate::config::cache::{CacheStore, ConfigSnapshot, FileSnapshotStore, SnapshotStore};
use crate::config::fetcher::ConfigFetcher;
use crate::config::util::{Endpoints, NamespaceKey};
use crate::config::watcher::ChangeWatcher;
use crate::config::worker::{ConfigListeners, ListenHandle, ScheduleLoop};
use std::sync::Arc;
use std::time::Duration;

/// Endpoints and fetcher of the connected namespace.
struct Connection {
    fetcher: Arc<ConfigFetcher>,
    notification_url: String,
}

/// Config service of one Apollo namespace.
///
/// Reads are served from memory at any time. Before `connect` and while the
/// server is unreachable they see the persisted snapshot, or nothing.
/// Dropping the service stops its background loops like [`ConfigService::close`].
pub struct ApolloConfigService {
    client_config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    cache: Arc<CacheStore>,
    listeners: Arc<ConfigListeners>,
    shutdown: Shutdown,
    connection: Option<Connection>,
    listening: bool,
}

impl ApolloConfigService {
    /// Construct, preloading the snapshot persisted at `client_config`'s persist path.
    pub fn new(client_config: ClientConfig) -> Self {
        Self::with_transport(client_config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(client_config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let store = client_config
            .persist_path
            .clone()
            .map(|path| Box::new(FileSnapshotStore::new(path)) as Box<dyn SnapshotStore>);
        Self::with_store(client_config, transport, store)
    }

    pub fn with_store(
        client_config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        store: Option<Box<dyn SnapshotStore>>,
    ) -> Self {
        ApolloConfigService {
            client_config,
            transport,
            cache: Arc::new(CacheStore::new(store)),
            listeners: Arc::new(ConfigListeners::new()),
            shutdown: Shutdown::new(),
            connection: None,
            listening: false,
        }
    }

    /// Resolve the namespace endpoints and fetch the namespace once.
    ///
    /// Errors only on unusable arguments or a closed or listening service. A
    /// failed fetch is logged and the service keeps serving what it has.
    pub async fn connect(
        &mut self,
        server_url: &str,
        app_id: &str,
        cluster: &str,
        namespace: &str,
    ) -> Result<()> {
        if self.shutdown.is_triggered() {
            return Err(Error::Closed);
        }
        if self.listening {
            return Err(Error::AlreadyListening);
        }
        for (name, value) in [
            ("server url", server_url),
            ("app id", app_id),
            ("cluster", cluster),
            ("namespace", namespace),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{} must not be empty", name)));
            }
        }

        let key = NamespaceKey::new(app_id, cluster, namespace);
        let endpoints = Endpoints::resolve(server_url, &key);
        let fetcher = Arc::new(ConfigFetcher::new(
            key,
            endpoints.config_url,
            self.client_config.fetch_timeout,
            self.transport.clone(),
            self.cache.clone(),
            self.listeners.clone(),
            self.shutdown.subscribe(),
        ));

        match fetcher.fetch_once().await {
            Ok(outcome) => tracing::info!(
                namespace = %fetcher.namespace_key(),
                outcome = ?outcome,
                "connected to config service"
            ),
            Err(e) => tracing::error!(
                server_url = %server_url,
                namespace = %fetcher.namespace_key(),
                error = %e,
                "failed to establish a new connection, serving cached config"
            ),
        }

        self.client_config = std::mem::take(&mut self.client_config)
            .server_url(server_url)
            .app_id(app_id)
            .cluster(cluster)
            .namespace(namespace);
        self.connection = Some(Connection {
            fetcher,
            notification_url: endpoints.notification_url,
        });
        Ok(())
    }

    /// Start both background loops with an explicit interval and long-poll timeout.
    ///
    /// `timeout` must exceed the backoff, otherwise a healthy but slow
    /// long-poll would look like a failure.
    pub fn listen_with(&mut self, interval: Duration, timeout: Duration) -> Result<ListenHandle> {
        if self.shutdown.is_triggered() {
            return Err(Error::Closed);
        }
        if self.listening {
            return Err(Error::AlreadyListening);
        }
        let connection = self.connection.as_ref().ok_or(Error::NotConnected)?;
        if interval.is_zero() {
            return Err(Error::InvalidConfig("listen interval must not be zero".to_string()));
        }
        if timeout <= self.client_config.backoff {
            return Err(Error::InvalidConfig(format!(
                "long poll timeout {:?} must be greater than the backoff {:?}",
                timeout, self.client_config.backoff
            )));
        }

        let schedule = ScheduleLoop::new(connection.fetcher.clone(), interval);
        let watcher = ChangeWatcher::new(
            connection.fetcher.clone(),
            self.transport.clone(),
            connection.notification_url.clone(),
            timeout,
            self.client_config.backoff,
        );
        let handle = ListenHandle::spawn(schedule, watcher, self.shutdown.subscribe())?;
        self.listening = true;
        Ok(handle)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.cache.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn keys(&self) -> Vec<String> {
        self.cache.snapshot().entries.keys().cloned().collect()
    }

    /// Release key of the held revision, absent until one was fetched or loaded.
    pub fn release_key(&self) -> Option<String> {
        self.cache.release_key()
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_triggered()
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.client_config
    }
}

impl ConfigService for ApolloConfigService {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key)
    }

    fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.cache.snapshot()
    }

    fn add_listener(&mut self, listener: Box<ConfigChangeListenFn>) {
        self.listeners.add(listener);
    }

    fn listen(&mut self) -> Result<ListenHandle> {
        self.listen_with(
            self.client_config.listen_interval,
            self.client_config.long_poll_timeout,
        )
    }

    fn close(&mut self) {
        if self.shutdown.trigger() {
            tracing::info!("Stopping listener...");
        }
    }
}
