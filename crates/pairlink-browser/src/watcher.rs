use pairlink_core::{ClientEvent, PairingCode};
use serde::Deserialize;

/// What the page currently shows, as reported by the status script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PageStatus {
    Loading,
    Qr { code: String },
    Ready,
}

/// Turns successive page snapshots into lifecycle events
#[derive(Debug, Default)]
pub struct PageWatcher {
    last_code: Option<String>,
    ready: bool,
}

impl PageWatcher {
    pub fn observe(&mut self, status: PageStatus) -> Vec<ClientEvent> {
        let mut events = Vec::new();

        match status {
            PageStatus::Loading => {}
            PageStatus::Qr { code } => {
                if self.ready {
                    self.ready = false;
                    events.push(ClientEvent::Disconnected(
                        "session logged out, pairing required".to_string(),
                    ));
                }
                if self.last_code.as_deref() != Some(code.as_str()) {
                    events.push(ClientEvent::Qr(PairingCode::new(code.clone())));
                    self.last_code = Some(code);
                }
            }
            PageStatus::Ready => {
                if !self.ready {
                    self.ready = true;
                    self.last_code = None;
                    events.push(ClientEvent::Authenticated);
                    events.push(ClientEvent::Ready);
                }
            }
        }

        events
    }
}
