//! `rulehub route` - the hook entry point
//!
//! Invoked with the user's raw prompt on prompt submission. This path must
//! never break the surrounding tool: every internal error is reduced to a
//! single logged line and the split is left exactly as it was.

use crate::config::SplitPaths;
use crate::router::Router;
use crate::{Install, Result, RouterConfig};

pub async fn run(prompt: String) -> Result<()> {
    if prompt.trim().is_empty() {
        return Ok(());
    }
    if let Err(e) = route_inner(&prompt).await {
        tracing::error!("semantic router failed: {}", e);
    }
    Ok(())
}

async fn route_inner(prompt: &str) -> Result<()> {
    // the hook works against the installed assistant directory; without an
    // installation it falls back to the global ~/.claude split
    let (claude_dir, config_file) = match Install::detect() {
        Some(install) => (install.claude_dir(), Some(install.config_file_path())),
        None => {
            let home = dirs::home_dir()
                .ok_or_else(|| crate::HubError::unknown("could not resolve home directory"))?;
            (home.join(".claude"), None)
        }
    };

    let config = RouterConfig::load(config_file.as_deref())?;
    let split = SplitPaths::for_claude_dir(&claude_dir);
    let router = Router::new(config, split);

    let (selection, report) = router.route(prompt).await?;
    tracing::info!(
        "routed via {}: {} desired, {} activated, {} deactivated",
        selection.method,
        selection.files.len(),
        report.activated.len(),
        report.deactivated.len()
    );
    Ok(())
}
