use crate::{Error, Result};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Default remote debugging port for a launched browser
pub const DEFAULT_DEBUGGING_PORT: u16 = 9222;

/// How the client obtains a browser to automate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    /// Launch a visible browser window
    #[default]
    Headed,
    /// Launch without a window
    Headless,
    /// Launch nothing; attach to a browser already listening on `port`
    Attach { port: u16 },
}

/// Spawns the Chrome process the client drives
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    start_url: String,
    headless: bool,
    debugging_port: u16,
}

impl ChromeLauncher {
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf, start_url: impl Into<String>) -> Self {
        Self {
            chrome_path,
            profile_path,
            start_url: start_url.into(),
            headless: false,
            debugging_port: DEFAULT_DEBUGGING_PORT,
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn debugging_port(mut self, port: u16) -> Self {
        self.debugging_port = port;
        self
    }

    /// Spawn Chrome; the caller owns the returned process
    pub fn launch(&self) -> Result<Child> {
        tracing::info!(
            "Launching {} (headless: {}, debugging port {})",
            self.chrome_path.display(),
            self.headless,
            self.debugging_port
        );

        Command::new(&self.chrome_path)
            .args(self.build_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))
    }

    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debugging_port),
            format!("--user-data-dir={}", self.profile_path.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
        ];

        if self.headless {
            args.push("--headless=new".to_string());
        }

        args.push(self.start_url.clone());
        args
    }
}
