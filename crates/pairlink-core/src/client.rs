use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Suffix the messaging service uses for group conversation addresses
const GROUP_SERVER: &str = "@g.us";

/// Short-lived token the client wants rendered as a scannable code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingCode(String);

impl PairingCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Serialized conversation address, e.g. `15551234567@c.us`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_group(&self) -> bool {
        self.0.ends_with(GROUP_SERVER)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A conversation as listed by the messaging client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    #[serde(default)]
    pub name: String,
    pub is_group: bool,
}

/// Lifecycle notifications emitted by a messaging client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A new pairing code must be shown to the user
    Qr(PairingCode),
    /// The pairing code was accepted
    Authenticated,
    /// The service rejected the stored or scanned credentials
    AuthFailure(String),
    /// Authenticated and operational
    Ready,
    /// The session dropped after becoming ready
    Disconnected(String),
    /// Unrecoverable client failure
    Error(String),
}

/// Contract for the external messaging client driven by the workflow
///
/// `initialize` is called exactly once; the returned channel carries every
/// lifecycle event in arrival order and closes when the client shuts down.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Start the client and subscribe to its events
    async fn initialize(&mut self) -> Result<mpsc::Receiver<ClientEvent>>;

    /// List the conversations visible to the authenticated account
    async fn chats(&self) -> Result<Vec<Chat>>;

    /// Address of the authenticated account, when the client can tell
    async fn own_id(&self) -> Result<Option<ChatId>>;

    /// Send a text message to a conversation
    async fn send_message(&self, to: &ChatId, body: &str) -> Result<()>;
}
