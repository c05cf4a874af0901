use anyhow::Result;
use pairlink_core::{IdentityStore, Origin};
use std::path::Path;

/// Print the session identifier, creating it on first use
pub fn execute(session_file: &Path) -> Result<()> {
    let (session_id, origin) = IdentityStore::new(session_file).resolve_with_origin()?;

    if origin == Origin::Generated {
        tracing::info!(
            "Generated session ID {} in {}",
            session_id,
            session_file.display()
        );
    }

    println!("{}", session_id);
    Ok(())
}
