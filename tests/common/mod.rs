//! In-process Apollo config service for integration testing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Server side state of one namespace.
#[derive(Default)]
pub struct NamespaceState {
    pub configurations: HashMap<String, String>,
    pub release_key: String,
    pub notification_id: i64,
    /// When false the notification endpoint never reports a change.
    pub notify: bool,
}

#[derive(Clone)]
pub struct MockApollo {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<NamespaceState>>,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl MockApollo {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Publish a new revision of the namespace.
    pub fn publish(&self, pairs: &[(&str, &str)], release_key: &str) {
        let mut state = self.state.lock().unwrap();
        state.configurations = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        state.release_key = release_key.to_string();
        state.notification_id += 1;
    }

    pub fn count(&self, path_prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|path| path.starts_with(path_prefix))
            .count()
    }
}

/// Start a mock Apollo serving one namespace on an ephemeral port.
///
/// Long-polls without news are held for `poll_window` and answered with `304`.
pub async fn start_mock_apollo(namespace: &'static str, poll_window: Duration) -> MockApollo {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let apollo = MockApollo {
        addr: listener.local_addr().unwrap(),
        state: Arc::new(Mutex::new(NamespaceState {
            notify: true,
            ..Default::default()
        })),
        requests: Arc::new(Mutex::new(Vec::new())),
    };

    let server = apollo.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let server = server.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let mut read = 0;
                        loop {
                            match socket.read(&mut buf[read..]).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => read += n,
                            }
                            if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                        let head = String::from_utf8_lossy(&buf[..read]).to_string();
                        let target = head
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .to_string();
                        server.requests.lock().unwrap().push(target.clone());

                        let (status, body) = server.answer(namespace, &target, poll_window).await;
                        let status_text = match status {
                            200 => "200 OK",
                            304 => "304 Not Modified",
                            404 => "404 Not Found",
                            _ => "500 Internal Server Error",
                        };
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    apollo
}

impl MockApollo {
    async fn answer(&self, namespace: &str, target: &str, poll_window: Duration) -> (u16, String) {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        if path.starts_with("/configs/") {
            let state = self.state.lock().unwrap();
            if state.release_key.is_empty() {
                return (404, String::new());
            }
            if params.get("releaseKey") == Some(&state.release_key) {
                return (304, String::new());
            }
            let body = serde_json::json!({
                "appId": "table_use",
                "cluster": "default",
                "namespaceName": namespace,
                "configurations": state.configurations,
                "releaseKey": state.release_key,
            });
            return (200, body.to_string());
        }

        if path == "/notifications/v2" {
            let asked: serde_json::Value = params
                .get("notifications")
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default();
            let client_id = asked[0]["notificationId"].as_i64().unwrap_or(-1);

            let deadline = tokio::time::Instant::now() + poll_window;
            loop {
                {
                    let state = self.state.lock().unwrap();
                    if state.notify && state.notification_id > client_id {
                        let body = serde_json::json!([{
                            "namespaceName": namespace,
                            "notificationId": state.notification_id,
                        }]);
                        return (200, body.to_string());
                    }
                }
                if tokio::time::Instant::now() >= deadline {
                    return (304, String::new());
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }

        (404, String::new())
    }
}
