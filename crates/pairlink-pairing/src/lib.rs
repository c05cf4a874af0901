// Pairing page: QR rendering and the local HTTP server that shows it

pub mod error;
pub mod opener;
pub mod page;
pub mod presenter;
pub mod qr;
pub mod server;

pub use error::{Error, Result};
pub use presenter::{DEFAULT_PORT, PairingPresenter, PresenterConfig};
pub use qr::QrImage;
pub use server::{PairingServer, PairingState};
