/// Apollo client error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network unreachable, connection refused, request timed out.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("unexpected status code {0}")]
    UnexpectedStatus(u16),

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config service is not connected")]
    NotConnected,

    #[error("config service is already listening")]
    AlreadyListening,

    #[error("config service is closed")]
    Closed,

    #[error("no tokio runtime to listen on: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

impl Error {
    /// Whether the failure came from the network rather than from what the server said.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
