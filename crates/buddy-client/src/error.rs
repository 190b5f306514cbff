use thiserror::Error;

/// Persistence failure of a [`Storage`](crate::storage::Storage) backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("value for key {0} could not be serialized: {1}")]
    Serialize(String, #[source] serde_json::Error),

    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}

/// Failures below the remote-store boundary.
///
/// Nothing above [`RemoteStore`](crate::remote::RemoteStore) sees this type for
/// expected failures; they are turned into responses or booleans there.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("unexpected response (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout("HTTP request")
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
