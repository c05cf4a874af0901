use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("Page script error: {0}")]
    Script(String),

    #[error("Client not initialized")]
    NotInitialized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Script(format!("unexpected result shape: {}", err))
    }
}

impl From<Error> for pairlink_core::Error {
    fn from(err: Error) -> Self {
        pairlink_core::Error::Client(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
