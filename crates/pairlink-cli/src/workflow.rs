use pairlink_core::{Chat, ChatId, ClientEvent, ConnectionState, MessagingClient, SessionId};
use pairlink_pairing::PairingPresenter;

/// Message sent to the user's own chat once the client is ready
pub fn confirmation_message(session_id: &SessionId) -> String {
    format!("✅ Bot connected!\n🆔 Session ID: *{}*", session_id)
}

/// Pick the one-to-one chat to notify
///
/// The account's own chat wins when the client reports its id; otherwise
/// the first one-to-one chat in listing order is used. Groups never match.
pub fn find_own_chat<'a>(chats: &'a [Chat], own_id: Option<&ChatId>) -> Option<&'a Chat> {
    let personal = |chat: &&Chat| !chat.is_group && !chat.id.is_group();

    own_id
        .and_then(|id| chats.iter().filter(personal).find(|chat| &chat.id == id))
        .or_else(|| chats.iter().find(personal))
}

/// Drives a messaging client from startup through pairing to confirmation
pub struct Workflow<C> {
    client: C,
    presenter: PairingPresenter,
    session_id: SessionId,
    state: ConnectionState,
}

impl<C: MessagingClient> Workflow<C> {
    pub fn new(client: C, session_id: SessionId, presenter: PairingPresenter) -> Self {
        Self {
            client,
            presenter,
            session_id,
            state: ConnectionState::Initializing,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn presenter(&self) -> &PairingPresenter {
        &self.presenter
    }

    /// Start the client and handle its events until the stream closes
    ///
    /// A client that cannot start leaves the workflow Failed; nothing here
    /// ends the process.
    pub async fn run(&mut self) {
        tracing::info!("Starting messaging client for session {}", self.session_id);

        let mut events = match self.client.initialize().await {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Messaging client failed to start: {}", e);
                self.state = ConnectionState::Failed;
                return;
            }
        };
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }

        tracing::info!("Messaging client event stream closed ({})", self.state);
    }

    /// Apply one client event
    pub async fn handle(&mut self, event: ClientEvent) {
        let previous = self.state;
        self.state = previous.next(&event);

        if self.state != previous {
            tracing::debug!("Connection state: {} -> {}", previous, self.state);
        }

        match event {
            ClientEvent::Qr(code) => {
                tracing::info!("Scan QR code in browser for session: {}", self.session_id);
                if let Err(e) = self.presenter.present(&code).await {
                    tracing::error!("Failed to present pairing code: {}", e);
                }
            }
            ClientEvent::Authenticated => {
                tracing::info!("Pairing accepted, waiting for the client to become ready");
            }
            ClientEvent::Ready if previous == ConnectionState::Ready => {
                tracing::debug!("Ignoring repeated ready event");
            }
            ClientEvent::Ready => {
                tracing::info!("WhatsApp connected! Session ID: {}", self.session_id);
                self.announce().await;
            }
            ClientEvent::AuthFailure(reason) => {
                tracing::error!("Authentication failed: {}", reason);
            }
            ClientEvent::Disconnected(reason) => {
                tracing::warn!("Client disconnected: {} (no automatic reconnect)", reason);
            }
            ClientEvent::Error(reason) => {
                tracing::error!("Messaging client error: {}", reason);
            }
        }
    }

    /// Send the session identifier to the user's own chat
    async fn announce(&self) {
        let chats = match self.client.chats().await {
            Ok(chats) => chats,
            Err(e) => {
                tracing::error!("Error sending session ID: {}", e);
                return;
            }
        };

        let own_id = self.client.own_id().await.unwrap_or_else(|e| {
            tracing::debug!("Own account id unavailable: {}", e);
            None
        });

        let Some(chat) = find_own_chat(&chats, own_id.as_ref()) else {
            tracing::warn!("Could not find a personal chat to send session ID.");
            return;
        };

        let message = confirmation_message(&self.session_id);
        match self.client.send_message(&chat.id, &message).await {
            Ok(()) => tracing::info!("Session ID sent to your WhatsApp ({}).", chat.id),
            Err(e) => tracing::error!("Error sending session ID: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pairlink_core::PairingCode;
    use pairlink_pairing::PresenterConfig;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    type Sent = Arc<Mutex<Vec<(ChatId, String)>>>;

    #[derive(Default)]
    struct FakeClient {
        events: Vec<ClientEvent>,
        chats: Vec<Chat>,
        own_id: Option<ChatId>,
        fail_init: bool,
        fail_chats: bool,
        fail_own_id: bool,
        fail_send: bool,
        sent: Sent,
    }

    #[async_trait]
    impl MessagingClient for FakeClient {
        async fn initialize(&mut self) -> pairlink_core::Result<mpsc::Receiver<ClientEvent>> {
            if self.fail_init {
                return Err(pairlink_core::Error::Client("browser missing".to_string()));
            }
            let (tx, rx) = mpsc::channel(self.events.len() + 1);
            for event in self.events.drain(..) {
                tx.send(event).await.unwrap();
            }
            Ok(rx)
        }

        async fn chats(&self) -> pairlink_core::Result<Vec<Chat>> {
            if self.fail_chats {
                return Err(pairlink_core::Error::Client("chat list unavailable".to_string()));
            }
            Ok(self.chats.clone())
        }

        async fn own_id(&self) -> pairlink_core::Result<Option<ChatId>> {
            if self.fail_own_id {
                return Err(pairlink_core::Error::Client("account unknown".to_string()));
            }
            Ok(self.own_id.clone())
        }

        async fn send_message(&self, to: &ChatId, body: &str) -> pairlink_core::Result<()> {
            if self.fail_send {
                return Err(pairlink_core::Error::Client("send rejected".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.clone(), body.to_string()));
            Ok(())
        }
    }

    fn chat(id: &str, is_group: bool) -> Chat {
        Chat {
            id: ChatId::new(id),
            name: String::new(),
            is_group,
        }
    }

    fn workflow(client: FakeClient) -> Workflow<FakeClient> {
        let session_id = SessionId::new("a1b2c3d4");
        let presenter = PairingPresenter::new(
            session_id.clone(),
            PresenterConfig {
                port: 0,
                open_browser: false,
            },
        );
        Workflow::new(client, session_id, presenter)
    }

    #[test]
    fn test_confirmation_message_embeds_session_id() {
        assert_eq!(
            confirmation_message(&SessionId::new("a1b2c3d4")),
            "✅ Bot connected!\n🆔 Session ID: *a1b2c3d4*"
        );
    }

    #[test]
    fn test_find_own_chat_skips_groups() {
        let chats = vec![
            chat("120363025246125486@g.us", true),
            chat("15550000001@c.us", false),
        ];

        let found = find_own_chat(&chats, None).unwrap();
        assert_eq!(found.id.as_str(), "15550000001@c.us");
    }

    #[test]
    fn test_find_own_chat_prefers_account_chat() {
        let chats = vec![
            chat("15550000001@c.us", false),
            chat("15550000002@c.us", false),
        ];
        let own = ChatId::new("15550000002@c.us");

        let found = find_own_chat(&chats, Some(&own)).unwrap();
        assert_eq!(found.id, own);
    }

    #[test]
    fn test_find_own_chat_ignores_mislabelled_group_address() {
        let chats = vec![chat("120363025246125486@g.us", false)];

        assert!(find_own_chat(&chats, None).is_none());
    }

    #[tokio::test]
    async fn test_pairing_then_ready_sends_confirmation() {
        let sent = Sent::default();
        let client = FakeClient {
            events: vec![
                ClientEvent::Qr(PairingCode::new("2@code")),
                ClientEvent::Authenticated,
                ClientEvent::Ready,
            ],
            chats: vec![
                chat("120363025246125486@g.us", true),
                chat("15550000001@c.us", false),
            ],
            sent: Arc::clone(&sent),
            ..FakeClient::default()
        };
        let mut workflow = workflow(client);

        workflow.run().await;

        assert_eq!(workflow.state(), ConnectionState::Ready);
        assert!(workflow.presenter().is_serving());

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.as_str(), "15550000001@c.us");
        assert!(sent[0].1.contains("a1b2c3d4"));
    }

    #[tokio::test]
    async fn test_ready_without_pairing_skips_presenter() {
        let sent = Sent::default();
        let client = FakeClient {
            events: vec![ClientEvent::Ready],
            chats: vec![chat("15550000001@c.us", false)],
            sent: Arc::clone(&sent),
            ..FakeClient::default()
        };
        let mut workflow = workflow(client);

        workflow.run().await;

        assert_eq!(workflow.state(), ConnectionState::Ready);
        assert!(!workflow.presenter().is_serving());
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_personal_chat_means_no_send() {
        let sent = Sent::default();
        let client = FakeClient {
            events: vec![ClientEvent::Ready],
            chats: vec![chat("120363025246125486@g.us", true)],
            sent: Arc::clone(&sent),
            ..FakeClient::default()
        };
        let mut workflow = workflow(client);

        workflow.run().await;

        assert_eq!(workflow.state(), ConnectionState::Ready);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_is_not_fatal() {
        let client = FakeClient {
            events: vec![ClientEvent::Ready],
            chats: vec![chat("15550000001@c.us", false)],
            fail_send: true,
            ..FakeClient::default()
        };
        let mut workflow = workflow(client);

        workflow.run().await;

        assert_eq!(workflow.state(), ConnectionState::Ready);
    }

    #[tokio::test]
    async fn test_repeated_ready_sends_once() {
        let sent = Sent::default();
        let client = FakeClient {
            events: vec![ClientEvent::Ready, ClientEvent::Ready],
            chats: vec![chat("15550000001@c.us", false)],
            sent: Arc::clone(&sent),
            ..FakeClient::default()
        };
        let mut workflow = workflow(client);

        workflow.run().await;

        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_client_error_marks_failed() {
        let client = FakeClient {
            events: vec![
                ClientEvent::Qr(PairingCode::new("2@code")),
                ClientEvent::Error("page crashed".to_string()),
            ],
            ..FakeClient::default()
        };
        let mut workflow = workflow(client);

        workflow.run().await;

        assert_eq!(workflow.state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn test_repeated_codes_share_one_listener() {
        let mut workflow = workflow(FakeClient::default());

        workflow
            .handle(ClientEvent::Qr(PairingCode::new("2@first")))
            .await;
        let first = workflow.presenter().url().cloned();
        workflow
            .handle(ClientEvent::Qr(PairingCode::new("2@second")))
            .await;

        assert_eq!(workflow.state(), ConnectionState::AwaitingPairing);
        assert!(first.is_some());
        assert_eq!(workflow.presenter().url().cloned(), first);
    }

    #[tokio::test]
    async fn test_initialize_failure_marks_failed() {
        let client = FakeClient {
            fail_init: true,
            ..FakeClient::default()
        };
        let mut workflow = workflow(client);

        workflow.run().await;

        assert_eq!(workflow.state(), ConnectionState::Failed);
        assert!(!workflow.presenter().is_serving());
    }

    #[tokio::test]
    async fn test_chat_listing_failure_is_not_fatal() {
        let sent = Sent::default();
        let client = FakeClient {
            events: vec![ClientEvent::Ready],
            chats: vec![chat("15550000001@c.us", false)],
            fail_chats: true,
            sent: Arc::clone(&sent),
            ..FakeClient::default()
        };
        let mut workflow = workflow(client);

        workflow.run().await;

        assert_eq!(workflow.state(), ConnectionState::Ready);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_own_id_failure_falls_back_to_first_personal_chat() {
        let sent = Sent::default();
        let client = FakeClient {
            events: vec![ClientEvent::Ready],
            chats: vec![
                chat("120363025246125486@g.us", true),
                chat("15550000001@c.us", false),
                chat("15550000002@c.us", false),
            ],
            own_id: Some(ChatId::new("15550000002@c.us")),
            fail_own_id: true,
            sent: Arc::clone(&sent),
            ..FakeClient::default()
        };
        let mut workflow = workflow(client);

        workflow.run().await;

        assert_eq!(workflow.state(), ConnectionState::Ready);
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.as_str(), "15550000001@c.us");
    }

    #[tokio::test]
    async fn test_occupied_port_still_awaits_pairing() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();
        let session_id = SessionId::new("a1b2c3d4");
        let presenter = PairingPresenter::new(
            session_id.clone(),
            PresenterConfig {
                port,
                open_browser: false,
            },
        );
        let mut workflow = Workflow::new(FakeClient::default(), session_id, presenter);

        workflow
            .handle(ClientEvent::Qr(PairingCode::new("2@code")))
            .await;

        assert_eq!(workflow.state(), ConnectionState::AwaitingPairing);
        assert!(!workflow.presenter().is_serving());
    }
}
