use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Pairing server error: {0}")]
    Server(String),

    #[error("QR encoding error: {0}")]
    QrEncode(#[from] qrcode::types::QrError),

    #[error("Failed to open browser: {0}")]
    Opener(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
