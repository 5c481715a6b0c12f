//! `pwvault vault`: show which vault is in use.

use crate::cli::output;
use crate::errors::Result;
use crate::vault::VaultSession;

/// Execute the `vault` command.
pub fn execute(session: &VaultSession<'_>) -> Result<()> {
    output::info(&format!("Current vault: {}", session.path().display()));
    output::tip(&format!("{} entries", session.len()));
    Ok(())
}
