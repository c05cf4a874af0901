// Browser-driven messaging client: Chrome discovery, launch, and CDP automation

mod cdp_session;
mod chrome_finder;
mod error;
mod launcher;
mod profile;
mod scripts;
mod watcher;
mod web_client;

pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use launcher::{ChromeLauncher, DEFAULT_DEBUGGING_PORT, LaunchMode};
pub use profile::SessionProfile;
pub use watcher::{PageStatus, PageWatcher};
pub use web_client::{WEB_APP_URL, WebClient, WebClientConfig};
