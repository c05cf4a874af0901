use crate::cdp_session::{self, CdpSession};
use crate::launcher::{ChromeLauncher, DEFAULT_DEBUGGING_PORT, LaunchMode};
use crate::watcher::{PageStatus, PageWatcher};
use crate::{ChromeFinder, Error, Result, SessionProfile, scripts};
use async_trait::async_trait;
use chromiumoxide::page::Page;
use pairlink_core::{Chat, ChatId, ClientEvent, MessagingClient, SessionId};
use std::path::PathBuf;
use std::process::Child;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// WhatsApp Web entry point
pub const WEB_APP_URL: &str = "https://web.whatsapp.com/";

/// Consecutive failed page polls before an error event is emitted
const MAX_POLL_FAILURES: u32 = 30;

const EVENT_BUFFER: usize = 16;

/// Settings for the browser-driven client
#[derive(Debug, Clone)]
pub struct WebClientConfig {
    /// Explicit Chrome binary; located automatically when `None`
    pub chrome_path: Option<PathBuf>,
    pub launch_mode: LaunchMode,
    /// Parent of per-session profiles; `~/.pairlink/sessions` when `None`
    pub profile_root: Option<PathBuf>,
    /// Debugging port for a launched browser
    pub debugging_port: u16,
    pub app_url: String,
    pub poll_interval: Duration,
}

impl Default for WebClientConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            launch_mode: LaunchMode::default(),
            profile_root: None,
            debugging_port: DEFAULT_DEBUGGING_PORT,
            app_url: WEB_APP_URL.to_string(),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Messaging client that automates WhatsApp Web in Chrome
pub struct WebClient {
    config: WebClientConfig,
    session_id: SessionId,
    chrome: Option<Child>,
    session: Option<CdpSession>,
    watcher: Option<JoinHandle<()>>,
}

impl WebClient {
    pub fn new(session_id: SessionId, config: WebClientConfig) -> Self {
        Self {
            config,
            session_id,
            chrome: None,
            session: None,
            watcher: None,
        }
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<ClientEvent>> {
        if self.session.is_some() {
            return Err(Error::Browser("Client already initialized".to_string()));
        }

        let port = match self.config.launch_mode {
            LaunchMode::Attach { port } => {
                tracing::info!("Attaching to running browser on port {}", port);
                port
            }
            mode => {
                self.launch_browser(mode == LaunchMode::Headless)?;
                self.config.debugging_port
            }
        };

        let session = CdpSession::connect(port, &self.config.app_url).await?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        self.watcher = Some(tokio::spawn(watch_page(
            session.page().clone(),
            tx,
            self.config.poll_interval,
        )));
        self.session = Some(session);

        Ok(rx)
    }

    fn launch_browser(&mut self, headless: bool) -> Result<()> {
        let chrome = ChromeFinder::new(self.config.chrome_path.clone()).find()?;

        let root = match &self.config.profile_root {
            Some(root) => root.clone(),
            None => SessionProfile::default_root()?,
        };
        let profile = SessionProfile::open(&root, &self.session_id)?;

        let child = ChromeLauncher::new(chrome, profile.path().to_path_buf(), &self.config.app_url)
            .headless(headless)
            .debugging_port(self.config.debugging_port)
            .launch()?;

        tracing::debug!("Chrome started with pid {}", child.id());
        self.chrome = Some(child);
        Ok(())
    }

    fn page(&self) -> Result<&Page> {
        self.session
            .as_ref()
            .map(CdpSession::page)
            .ok_or(Error::NotInitialized)
    }
}

#[async_trait]
impl MessagingClient for WebClient {
    async fn initialize(&mut self) -> pairlink_core::Result<mpsc::Receiver<ClientEvent>> {
        Ok(self.start().await?)
    }

    async fn chats(&self) -> pairlink_core::Result<Vec<Chat>> {
        let chats: Vec<Chat> = cdp_session::evaluate(self.page()?, scripts::LIST_CHATS).await?;
        tracing::debug!("Listed {} chats", chats.len());
        Ok(chats)
    }

    async fn own_id(&self) -> pairlink_core::Result<Option<ChatId>> {
        Ok(cdp_session::evaluate(self.page()?, scripts::OWN_ID).await?)
    }

    async fn send_message(&self, to: &ChatId, body: &str) -> pairlink_core::Result<()> {
        let script = scripts::send_message(to, body);
        let sent: bool = cdp_session::evaluate(self.page()?, &script).await?;

        if !sent {
            return Err(pairlink_core::Error::ChatNotFound(to.to_string()));
        }
        Ok(())
    }
}

impl Drop for WebClient {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        if let Some(mut chrome) = self.chrome.take() {
            tracing::debug!("Stopping Chrome (pid {})", chrome.id());
            let _ = chrome.kill();
            let _ = chrome.wait();
        }
    }
}

/// Poll the page and forward lifecycle changes until the receiver goes away
async fn watch_page(page: Page, events: mpsc::Sender<ClientEvent>, interval: Duration) {
    let mut watcher = PageWatcher::default();
    let mut ticker = tokio::time::interval(interval);
    let mut failures = 0u32;

    loop {
        ticker.tick().await;

        let status = match cdp_session::evaluate::<PageStatus>(&page, scripts::PAGE_STATUS).await {
            Ok(status) => {
                failures = 0;
                status
            }
            Err(e) => {
                // Evaluations fail transiently while the page navigates
                failures += 1;
                tracing::debug!("Page status poll failed ({}): {}", failures, e);
                if failures == MAX_POLL_FAILURES {
                    let message = format!("page unresponsive after {} polls: {}", failures, e);
                    if events.send(ClientEvent::Error(message)).await.is_err() {
                        return;
                    }
                }
                continue;
            }
        };

        for event in watcher.observe(status) {
            tracing::debug!("Client event: {:?}", event);
            if events.send(event).await.is_err() {
                return;
            }
        }
    }
}
