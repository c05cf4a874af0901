use crate::{Error, Result};
use std::process::Stdio;
use tokio::process::Command;
use url::Url;

/// Platform command that opens a URL in the user's default browser
pub fn launch_command(url: &Url) -> (&'static str, Vec<String>) {
    #[cfg(target_os = "windows")]
    return (
        "cmd",
        vec![
            "/C".to_string(),
            "start".to_string(),
            String::new(),
            url.to_string(),
        ],
    );

    #[cfg(target_os = "macos")]
    return ("open", vec![url.to_string()]);

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    return ("xdg-open", vec![url.to_string()]);
}

/// Open `url` in the default browser without waiting for it
///
/// Must be called from within a tokio runtime; the exit status of the
/// launcher is reaped and logged in the background.
pub fn open_in_browser(url: &Url) -> Result<()> {
    let (program, args) = launch_command(url);

    which::which(program)
        .map_err(|e| Error::Opener(format!("{} not available: {}", program, e)))?;

    tracing::debug!("Opening {} with {}", url, program);

    let mut child = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::Opener(format!("Failed to run {}: {}", program, e)))?;

    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if !status.success() => {
                tracing::warn!("Browser launcher exited with {}", status);
            }
            Err(e) => tracing::warn!("Browser launcher failed: {}", e),
            Ok(_) => {}
        }
    });

    Ok(())
}
