//! CLI command implementations
//!
//! Each command is a thin orchestration layer over the library: the router
//! and the diff engine do the real work, commands handle discovery,
//! user-facing output, and metadata bookkeeping.

pub mod add;
pub mod doctor;
pub mod init;
pub mod list;
pub mod remove;
pub mod route;
pub mod uninstall;
pub mod update;

use crate::{HubError, Install, Result};

/// Resolve the current installation or fail with a setup hint
pub(crate) fn require_install() -> Result<Install> {
    Install::detect().ok_or(HubError::NotInstalled)
}
