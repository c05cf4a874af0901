use crate::{Error, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_BACKOFF: Duration = Duration::from_millis(500);

/// CDP connection to a single page of a running browser
pub struct CdpSession {
    // Never locked; the Mutex only makes the session Sync for MessagingClient
    _browser: Mutex<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl CdpSession {
    /// Connect to the browser on `debugging_port` and open `url`
    ///
    /// A freshly spawned browser takes a moment to accept connections, so
    /// the connection is retried a few times before giving up.
    pub async fn connect(debugging_port: u16, url: &str) -> Result<Self> {
        let endpoint = format!("http://localhost:{}", debugging_port);

        let (browser, mut handler) = {
            let mut attempt = 1;
            loop {
                tracing::debug!("Attempting CDP connection to {} ({})", endpoint, attempt);
                match Browser::connect(&endpoint).await {
                    Ok(conn) => break conn,
                    Err(e) if attempt < CONNECT_ATTEMPTS => {
                        tracing::debug!("CDP connection attempt failed: {}", e);
                        attempt += 1;
                        tokio::time::sleep(CONNECT_BACKOFF).await;
                    }
                    Err(e) => {
                        return Err(Error::Cdp(format!(
                            "Failed to connect to browser on port {} after {} attempts: {}",
                            debugging_port, CONNECT_ATTEMPTS, e
                        )));
                    }
                }
            }
        };

        tracing::info!("CDP connection established on port {}", debugging_port);

        // Must be polled for any browser or page command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
            tracing::debug!("CDP handler stopped");
        });

        let page = match browser.pages().await?.into_iter().next() {
            Some(page) => {
                tracing::debug!("Using existing page");
                page
            }
            None => {
                tracing::debug!("No existing pages, creating new page");
                browser.new_page("about:blank").await?
            }
        };

        let current = page.url().await?.unwrap_or_default();
        if !current.starts_with(url) {
            tracing::info!("Navigating to {}", url);
            page.goto(url).await?;
        }

        Ok(Self {
            _browser: Mutex::new(browser),
            page,
            handler_task,
        })
    }

    /// Handle to the automated page
    pub fn page(&self) -> &Page {
        &self.page
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

/// Evaluate `script` in `page`, awaiting promises, and deserialize the result
pub async fn evaluate<T: DeserializeOwned>(page: &Page, script: &str) -> Result<T> {
    let params = EvaluateParams::builder()
        .expression(script)
        .await_promise(true)
        .return_by_value(true)
        .build()
        .map_err(Error::Script)?;

    let result = page.evaluate_expression(params).await?;
    Ok(result.into_value::<T>()?)
}
