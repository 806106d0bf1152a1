use crate::api::constants;
use crate::config::server_response::ConfigNotification;

/// Identity of the one namespace a client syncs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NamespaceKey {
    pub(crate) app_id: String,
    pub(crate) cluster: String,
    pub(crate) namespace: String,
}

impl NamespaceKey {
    pub(crate) fn new(app_id: &str, cluster: &str, namespace: &str) -> Self {
        NamespaceKey {
            app_id: app_id.to_string(),
            cluster: cluster.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

impl std::fmt::Display for NamespaceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}+{}", self.app_id, self.cluster, self.namespace)
    }
}

/// Endpoints of one namespace, resolved once at connect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Endpoints {
    pub(crate) config_url: String,
    /// Notification url up to and including `notifications=`.
    pub(crate) notification_url: String,
}

impl Endpoints {
    pub(crate) fn resolve(server_url: &str, key: &NamespaceKey) -> Self {
        let server_url = server_url.trim_end_matches('/');
        Endpoints {
            config_url: format!(
                "{}/{}/{}/{}/{}",
                server_url,
                constants::CONFIGS_PATH,
                encode_path(&key.app_id),
                encode_path(&key.cluster),
                encode_path(&key.namespace)
            ),
            notification_url: format!(
                "{}/{}?appId={}&cluster={}&notifications=",
                server_url,
                constants::NOTIFICATIONS_PATH,
                encode(&key.app_id),
                encode(&key.cluster)
            ),
        }
    }
}

/// Config url, carrying the held release key when there is one.
pub(crate) fn config_query_url(config_url: &str, release_key: Option<&str>) -> String {
    match release_key {
        Some(release_key) => format!("{}?releaseKey={}", config_url, encode(release_key)),
        None => config_url.to_string(),
    }
}

/// Long-poll url for one namespace at the given watermark.
pub(crate) fn notification_query_url(
    notification_url: &str,
    namespace: &str,
    notification_id: i64,
) -> String {
    let notifications = vec![ConfigNotification::new(
        namespace.to_string(),
        notification_id,
    )];
    // serializing a plain struct of a string and an integer cannot fail
    let json = serde_json::to_string(&notifications).unwrap_or_default();
    format!("{}{}", notification_url, encode(&json))
}

fn encode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// Path segments keep `+` literal, so spaces are sent as `%20` there.
fn encode_path(raw: &str) -> String {
    encode(raw).replace('+', "%20")
}
