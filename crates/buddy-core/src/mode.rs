use serde::{Deserialize, Serialize};

/// Where the client currently keeps its state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionMode {
    /// The remote backend is reachable and authoritative for reads.
    #[default]
    RemoteBackend,
    /// The remote backend is treated as absent; everything stays local.
    LocalMock,
}

impl SessionMode {
    pub fn is_remote(self) -> bool {
        matches!(self, Self::RemoteBackend)
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemoteBackend => write!(f, "remote"),
            Self::LocalMock => write!(f, "local-mock"),
        }
    }
}
