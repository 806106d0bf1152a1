use crate::api::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Status and text body of one HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        HttpResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_not_modified(&self) -> bool {
        self.status == 304
    }
}

/// The request/response surface the client talks to Apollo through.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a GET, resolving once the whole body is read or `timeout` elapsed.
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;
}

/// [`HttpTransport`] over a pooled reqwest client.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::Transport(Box::new(e)))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Transport(Box::new(e)))?;
        Ok(HttpResponse { status, body })
    }
}


#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_replays_by_longest_prefix() {
        let transport = MockTransport::new();
        transport.push("http://a/configs", Ok(HttpResponse::new(200, "one")));
        transport.push("http://a/configs/app", Ok(HttpResponse::new(200, "two")));

        let resp = transport
            .get("http://a/configs/app/default", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(resp.body, "two");
        let resp = transport
            .get("http://a/configs/other", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(resp.body, "one");
        let resp = transport
            .get("http://a/configs/other", Duration::from_secs(1))
            .await
            .unwrap();
        assert!(resp.is_not_modified());
        assert_eq!(transport.count("http://a/configs"), 3);
    }

    #[tokio::test]
    async fn test_reqwest_transport_unreachable() {
        let transport = ReqwestTransport::new();
        let err = transport
            .get("http://127.0.0.1:1/configs", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
