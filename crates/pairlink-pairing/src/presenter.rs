use crate::server::{PairingServer, PairingState};
use crate::{QrImage, Result, opener};
use pairlink_core::{PairingCode, SessionId};
use std::sync::Arc;
use url::Url;

/// Default port for the pairing page
pub const DEFAULT_PORT: u16 = 3000;

/// Options for presenting pairing codes
#[derive(Debug, Clone)]
pub struct PresenterConfig {
    /// Port to serve the page on; 0 picks a free port
    pub port: u16,
    /// Open the page in the default browser once the server starts
    pub open_browser: bool,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            open_browser: true,
        }
    }
}

/// Shows pairing codes as a QR image on a local web page
pub struct PairingPresenter {
    config: PresenterConfig,
    state: Arc<PairingState>,
    /// Set once the listener is running; later codes reuse it
    server: Option<PairingServer>,
}

impl PairingPresenter {
    pub fn new(session_id: SessionId, config: PresenterConfig) -> Self {
        Self {
            config,
            state: Arc::new(PairingState::new(session_id)),
            server: None,
        }
    }

    /// Render `code` and make it the page's current image
    ///
    /// The first call starts the HTTP listener and opens the browser. If
    /// binding fails the error is returned and the next call tries again.
    pub async fn present(&mut self, code: &PairingCode) -> Result<()> {
        let image = QrImage::encode(code)?;
        self.state.set_image(image).await;

        if self.server.is_some() {
            tracing::debug!("Pairing page refreshed with a new code");
            return Ok(());
        }

        let server = PairingServer::start(self.config.port, Arc::clone(&self.state)).await?;
        tracing::info!("QR code server running at {}", server.url());

        if self.config.open_browser {
            if let Err(e) = opener::open_in_browser(server.url()) {
                tracing::warn!("{}. Open {} manually to scan the code.", e, server.url());
            }
        }

        self.server = Some(server);
        Ok(())
    }

    /// URL of the pairing page, once the server is running
    pub fn url(&self) -> Option<&Url> {
        self.server.as_ref().map(PairingServer::url)
    }

    /// Whether the listener has been started
    pub fn is_serving(&self) -> bool {
        self.server.is_some()
    }

    /// Whether a pairing image is currently available
    pub async fn has_image(&self) -> bool {
        self.state.has_image().await
    }
}
