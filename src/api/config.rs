use crate::api::client_config::ClientConfig;
use crate::api::error;
use crate::config::cache::ConfigSnapshot;
use crate::config::worker::ListenHandle;
use std::collections::HashMap;
use std::sync::Arc;

pub trait ConfigService {
    /// Get the value of a key from the latest applied configuration, never blocks on the network.
    fn get(&self, key: &str) -> Option<String>;

    /// The whole latest applied configuration.
    fn snapshot(&self) -> Arc<ConfigSnapshot>;

    /// Add a listener called after every applied change.
    fn add_listener(&mut self, listener: Box<ConfigChangeListenFn>);

    /// Start the schedule loop and the change watcher in the background.
    fn listen(&mut self) -> error::Result<ListenHandle>;

    /// Stop the background loops, returns without waiting for them.
    fn close(&mut self);
}

/// Called with the new configuration of the namespace.
pub type ConfigChangeListenFn = dyn Fn(ConfigResponse) + Send + Sync;

/// A configuration change of one namespace.
#[derive(Clone, Debug)]
pub struct ConfigResponse {
    /// AppId
    app_id: String,
    /// Cluster
    cluster: String,
    /// Namespace
    namespace: String,
    /// ReleaseKey of the new revision
    release_key: String,
    /// Configurations
    configurations: HashMap<String, String>,
}

impl ConfigResponse {
    pub(crate) fn new(
        app_id: String,
        cluster: String,
        namespace: String,
        release_key: String,
        configurations: HashMap<String, String>,
    ) -> Self {
        ConfigResponse {
            app_id,
            cluster,
            namespace,
            release_key,
            configurations,
        }
    }

    pub fn get_app_id(&self) -> &String {
        &self.app_id
    }
    pub fn get_cluster(&self) -> &String {
        &self.cluster
    }
    pub fn get_namespace(&self) -> &String {
        &self.namespace
    }
    pub fn get_release_key(&self) -> &String {
        &self.release_key
    }
    pub fn get_configurations(&self) -> &HashMap<String, String> {
        &self.configurations
    }
}

pub struct ConfigServiceBuilder {
    client_config: ClientConfig,
}

impl Default for ConfigServiceBuilder {
    fn default() -> Self {
        ConfigServiceBuilder {
            client_config: ClientConfig::new(),
        }
    }
}

impl ConfigServiceBuilder {
    pub fn new(client_config: ClientConfig) -> Self {
        ConfigServiceBuilder { client_config }
    }

    /// Builds a new [`ConfigService`] and connects it to the configured namespace.
    ///
    /// Fails only on an incomplete [`ClientConfig`], an unreachable server
    /// leaves the service serving its persisted or empty configuration.
    pub async fn build(self) -> error::Result<crate::config::ApolloConfigService> {
        let server_url = self.client_config.server_url.clone();
        let app_id = self.client_config.app_id.clone();
        let cluster = self.client_config.cluster.clone();
        let namespace = self.client_config.namespace.clone();

        let mut config_service = crate::config::ApolloConfigService::new(self.client_config);
        config_service
            .connect(&server_url, &app_id, &cluster, &namespace)
            .await?;
        Ok(config_service)
    }
}
