use crate::api::constants;
use std::path::PathBuf;
use std::time::Duration;

/// Settings of one config service: which namespace to sync and how.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub(crate) server_url: String,
    pub(crate) app_id: String,
    pub(crate) cluster: String,
    pub(crate) namespace: String,
    /// Where the last-known-good snapshot is kept, none disables persistence.
    pub(crate) persist_path: Option<PathBuf>,
    pub(crate) listen_interval: Duration,
    pub(crate) long_poll_timeout: Duration,
    pub(crate) backoff: Duration,
    pub(crate) fetch_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::new()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        ClientConfig {
            server_url: String::new(),
            app_id: String::new(),
            cluster: constants::DEFAULT_CLUSTER.to_string(),
            namespace: constants::DEFAULT_NAMESPACE.to_string(),
            persist_path: None,
            listen_interval: constants::DEFAULT_LISTEN_INTERVAL,
            long_poll_timeout: constants::DEFAULT_LONG_POLL_TIMEOUT,
            backoff: constants::DEFAULT_BACKOFF,
            fetch_timeout: constants::DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Apollo config service address, e.g. `http://127.0.0.1:8080`.
    pub fn server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    pub fn cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = cluster.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn persist_path(mut self, persist_path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(persist_path.into());
        self
    }

    pub fn listen_interval(mut self, listen_interval: Duration) -> Self {
        self.listen_interval = listen_interval;
        self
    }

    pub fn long_poll_timeout(mut self, long_poll_timeout: Duration) -> Self {
        self.long_poll_timeout = long_poll_timeout;
        self
    }

    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn get_server_url(&self) -> &str {
        &self.server_url
    }

    pub fn get_app_id(&self) -> &str {
        &self.app_id
    }

    pub fn get_cluster(&self) -> &str {
        &self.cluster
    }

    pub fn get_namespace(&self) -> &str {
        &self.namespace
    }

    pub fn get_persist_path(&self) -> Option<&PathBuf> {
        self.persist_path.as_ref()
    }
}
