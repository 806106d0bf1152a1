use crate::api::constants::RELEASE_KEY_FIELD;
use crate::api::error::Result;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One revision of a namespace: the user visible entries and the release key they came with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub entries: HashMap<String, String>,
    pub release_key: Option<String>,
}

impl ConfigSnapshot {
    pub fn new(entries: HashMap<String, String>, release_key: Option<String>) -> Self {
        ConfigSnapshot {
            entries,
            release_key,
        }
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.entries.get(key)
    }

    /// Decode a persisted snapshot, anything unreadable decodes to an empty snapshot.
    ///
    /// The release key travels under a reserved key of the JSON object. A
    /// snapshot without it keeps its entries but has no release key, so the
    /// next fetch asks for full content.
    pub fn load(bytes: &[u8]) -> Self {
        let object = match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(serde_json::Value::Object(object)) => object,
            Ok(_) => {
                tracing::warn!("config snapshot is not a json object, ignored");
                return ConfigSnapshot::default();
            }
            Err(e) => {
                tracing::warn!(error = %e, "config snapshot is malformed, ignored");
                return ConfigSnapshot::default();
            }
        };

        let mut release_key = None;
        let mut entries = HashMap::with_capacity(object.len());
        for (key, value) in object {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            if key == RELEASE_KEY_FIELD {
                release_key = Some(value);
            } else {
                entries.insert(key, value);
            }
        }
        if release_key.is_none() {
            tracing::warn!("config snapshot has no release key");
        }
        ConfigSnapshot {
            entries,
            release_key,
        }
    }

    /// Encode as one JSON object with the release key injected under the reserved key.
    pub fn dump(&self) -> Result<Vec<u8>> {
        let mut object: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        if let Some(release_key) = &self.release_key {
            object.insert(
                RELEASE_KEY_FIELD.to_string(),
                serde_json::Value::String(release_key.clone()),
            );
        }
        Ok(serde_json::to_vec(&object)?)
    }
}

/// Byte oriented durable mirror of the cache.
pub trait SnapshotStore: Send + Sync {
    /// Read the whole snapshot, `None` when nothing was persisted yet.
    fn read(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the whole snapshot.
    fn write(&self, bytes: &[u8]) -> Result<()>;
}

/// [`SnapshotStore`] backed by one file.
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSnapshotStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

/// The current configuration of the namespace.
///
/// Readers load the current snapshot without locking, an apply swaps in a
/// whole new snapshot so nobody observes a half replaced map.
pub(crate) struct CacheStore {
    current: ArcSwap<ConfigSnapshot>,
    store: Option<Box<dyn SnapshotStore>>,
    /// Serializes snapshot writes, the swap itself does not need it.
    write_lock: Mutex<()>,
}

impl CacheStore {
    pub(crate) fn new(store: Option<Box<dyn SnapshotStore>>) -> Self {
        let initial = match &store {
            Some(store) => match store.read() {
                Ok(Some(bytes)) => ConfigSnapshot::load(&bytes),
                Ok(None) => {
                    tracing::info!("no config snapshot persisted yet, starting empty");
                    ConfigSnapshot::default()
                }
                Err(e) => {
                    tracing::warn!(error = %e, "config snapshot unreadable, starting empty");
                    ConfigSnapshot::default()
                }
            },
            None => ConfigSnapshot::default(),
        };
        CacheStore {
            current: ArcSwap::from_pointee(initial),
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        self.current.load().get(key).cloned()
    }

    pub(crate) fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }

    pub(crate) fn release_key(&self) -> Option<String> {
        self.current.load().release_key.clone()
    }

    /// Replace map and release key together, then mirror them to the store.
    ///
    /// A failed mirror is logged, the in memory snapshot stays applied.
    pub(crate) fn apply(&self, snapshot: ConfigSnapshot) -> Arc<ConfigSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));

        if let Some(store) = &self.store {
            let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = snapshot.dump().and_then(|bytes| store.write(&bytes)) {
                tracing::warn!(error = %e, "failed to persist config snapshot");
            }
        }
        snapshot
    }
}
