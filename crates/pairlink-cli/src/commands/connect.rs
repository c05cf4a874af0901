use crate::workflow::Workflow;
use anyhow::Result;
use console::style;
use pairlink_browser::{LaunchMode, WebClient, WebClientConfig};
use pairlink_core::{IdentityStore, Origin};
use pairlink_pairing::{PairingPresenter, PresenterConfig};
use std::path::{Path, PathBuf};

/// Options for a connect run
pub struct ConnectOptions {
    pub session_file: PathBuf,
    pub port: u16,
    pub open_browser: bool,
    pub headless: bool,
    pub attach: Option<u16>,
    pub chrome_path: Option<PathBuf>,
}

pub fn execute(options: ConnectOptions) -> Result<()> {
    // Identity must be on disk before the client is configured with it
    let (session_id, origin) = resolve_identity(&options.session_file)?;

    let launch_mode = match (options.attach, options.headless) {
        (Some(port), _) => LaunchMode::Attach { port },
        (None, true) => LaunchMode::Headless,
        (None, false) => LaunchMode::Headed,
    };

    let client = WebClient::new(
        session_id.clone(),
        WebClientConfig {
            chrome_path: options.chrome_path,
            launch_mode,
            ..WebClientConfig::default()
        },
    );
    let presenter = PairingPresenter::new(
        session_id.clone(),
        PresenterConfig {
            port: options.port,
            open_browser: options.open_browser,
        },
    );

    match origin {
        Origin::Loaded => println!("🆔 Loaded session ID: {}", style(&session_id).bold()),
        Origin::Generated => println!("🆕 Generated session ID: {}", style(&session_id).bold()),
    }
    println!("🚀 Starting WhatsApp Web client...");

    // Handlers run to completion one at a time on a single thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mut workflow = Workflow::new(client, session_id, presenter);

        tokio::select! {
            _ = workflow.run() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down...");
                println!();
            }
        }

        println!("🛑 Stopped ({})", workflow.state());
    });

    runtime.shutdown_timeout(std::time::Duration::from_millis(100));

    Ok(())
}

fn resolve_identity(path: &Path) -> Result<(pairlink_core::SessionId, Origin)> {
    IdentityStore::new(path)
        .resolve_with_origin()
        .map_err(|e| {
            anyhow::anyhow!(
                "Cannot establish session identity at {}: {}",
                path.display(),
                e
            )
        })
}
