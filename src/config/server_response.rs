#![allow(non_snake_case)]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of a `200` answer from the config endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct ConfigQueryServerResponse {
    namespaceName: Option<String>,
    configurations: HashMap<String, String>,
    releaseKey: String,
}

impl ConfigQueryServerResponse {
    pub(crate) fn from_body(body: &str) -> crate::api::error::Result<Self> {
        serde_json::from_str(body).map_err(|e| {
            crate::api::error::Error::MalformedBody(format!("config query response: {}", e))
        })
    }

    pub(crate) fn get_namespace_name(&self) -> Option<&String> {
        Option::from(&self.namespaceName)
    }

    pub(crate) fn into_parts(self) -> (HashMap<String, String>, String) {
        (self.configurations, self.releaseKey)
    }
}

/// One namespace entry of the notification protocol, used both ways.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ConfigNotification {
    pub(crate) namespaceName: String,
    pub(crate) notificationId: i64,
}

impl ConfigNotification {
    pub(crate) fn new(namespace_name: String, notification_id: i64) -> Self {
        ConfigNotification {
            namespaceName: namespace_name,
            notificationId: notification_id,
        }
    }

    /// Parse a `200` answer of the notification endpoint.
    pub(crate) fn list_from_body(body: &str) -> crate::api::error::Result<Vec<Self>> {
        serde_json::from_str(body).map_err(|e| {
            crate::api::error::Error::MalformedBody(format!("notification response: {}", e))
        })
    }
}
