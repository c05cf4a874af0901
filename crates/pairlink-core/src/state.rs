use crate::ClientEvent;
use std::fmt;

/// Connection lifecycle as seen by the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Initializing,
    AwaitingPairing,
    Ready,
    Failed,
}

impl ConnectionState {
    /// State after handling `event`
    pub fn next(self, event: &ClientEvent) -> Self {
        match event {
            // A fresh code after readiness means the device was logged out
            ClientEvent::Qr(_) => ConnectionState::AwaitingPairing,
            ClientEvent::Ready => ConnectionState::Ready,
            ClientEvent::AuthFailure(_) | ClientEvent::Error(_) => ConnectionState::Failed,
            ClientEvent::Authenticated | ClientEvent::Disconnected(_) => self,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Initializing => "initializing",
            ConnectionState::AwaitingPairing => "awaiting-pairing",
            ConnectionState::Ready => "ready",
            ConnectionState::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
