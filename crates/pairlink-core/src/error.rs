use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to access session identity: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session identity file is not valid UTF-8: {}", .0.display())]
    CorruptIdentity(PathBuf),

    #[error("Messaging client error: {0}")]
    Client(String),

    #[error("Conversation not found: {0}")]
    ChatNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
