use std::time::Duration;

pub const DEFAULT_CLUSTER: &str = "default";

pub const DEFAULT_NAMESPACE: &str = "application";

/// Schedule loop sleep between two fetches.
pub const DEFAULT_LISTEN_INTERVAL: Duration = Duration::from_secs(30);

/// Client side bound of one long-poll request, must be greater than [`DEFAULT_BACKOFF`].
pub const DEFAULT_LONG_POLL_TIMEOUT: Duration = Duration::from_secs(70);

/// Cooldown of the change watcher after a failed notification request.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(60);

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Notification watermark meaning "no known revision".
pub const INITIAL_NOTIFICATION_ID: i64 = -1;

/// Key the release key is stored under in the persisted snapshot.
pub const RELEASE_KEY_FIELD: &str = "releaseKey";

pub const CONFIGS_PATH: &str = "configs";

pub const NOTIFICATIONS_PATH: &str = "notifications/v2";
