pub mod client;
pub mod error;
pub mod identity;
pub mod state;

pub use client::{Chat, ChatId, ClientEvent, MessagingClient, PairingCode};
pub use error::{Error, Result};
pub use identity::{DEFAULT_SESSION_FILE, IdentityStore, Origin, SessionId};
pub use state::ConnectionState;
