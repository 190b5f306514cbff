use std::sync::Arc;

use buddy_core::SessionMode;
use parking_lot::RwLock;

use crate::config::ClientConfig;

/// Process-lifetime state shared by the auth and user-data components.
///
/// Clones share the same mode. The mode only ever moves from
/// [`SessionMode::RemoteBackend`] to [`SessionMode::LocalMock`]; a new context
/// starts remote again.
#[derive(Debug, Clone)]
pub struct ClientContext {
    config: Arc<ClientConfig>,
    mode: Arc<RwLock<SessionMode>>,
}

impl ClientContext {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        Self::with_mode(config, SessionMode::RemoteBackend)
    }

    /// A context starting in `mode`, for callers that already know the backend is absent.
    pub fn with_mode(config: Arc<ClientConfig>, mode: SessionMode) -> Self {
        Self {
            config,
            mode: Arc::new(RwLock::new(mode)),
        }
    }

    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }

    pub fn mode(&self) -> SessionMode {
        *self.mode.read()
    }

    pub fn is_remote(&self) -> bool {
        self.mode().is_remote()
    }

    /// Switches to local mock mode for the rest of the process.
    ///
    /// Returns `true` if this call performed the switch.
    pub fn downgrade_to_mock(&self, reason: &str) -> bool {
        let mut mode = self.mode.write();
        if *mode == SessionMode::LocalMock {
            return false;
        }
        *mode = SessionMode::LocalMock;
        tracing::warn!("Remote backend unavailable ({reason}), switching to local mock mode");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downgrade_is_one_way_and_shared() {
        let context = ClientContext::new(Arc::new(ClientConfig::new("p", "anon")));
        let shared = context.clone();
        assert_eq!(context.mode(), SessionMode::RemoteBackend);

        assert!(shared.downgrade_to_mock("test"));
        assert!(!context.downgrade_to_mock("again"));
        assert_eq!(context.mode(), SessionMode::LocalMock);
    }
}
