//! A client for the Apollo configuration center.
//!
//! Keeps one namespace of key/value configuration in memory, mirrors it to an
//! optional snapshot file for offline startup, and refreshes it in the
//! background with a fixed-interval poll plus a long-poll change watcher.
//!
//! ```no_run
//! use apollo_client::api::client_config::ClientConfig;
//! use apollo_client::api::config::{ConfigService, ConfigServiceBuilder};
//!
//! # async fn run() -> apollo_client::api::error::Result<()> {
//! let mut config_service = ConfigServiceBuilder::new(
//!     ClientConfig::new()
//!         .server_url("http://127.0.0.1:8080")
//!         .app_id("table_use")
//!         .persist_path("apollo.json"),
//! )
//! .build()
//! .await?;
//!
//! let topic = config_service.get("news_topic_ch");
//! let handle = config_service.listen()?;
//! config_service.close();
//! handle.join().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
mod common;
mod config;

pub use api::client_config::ClientConfig;
pub use api::config::{ConfigResponse, ConfigService, ConfigServiceBuilder};
pub use api::error::{Error, Result};
pub use common::remote::{HttpResponse, HttpTransport, ReqwestTransport};
pub use config::cache::{ConfigSnapshot, FileSnapshotStore, SnapshotStore};
pub use config::worker::ListenHandle;
pub use config::ApolloConfigService;
