//! `pwvault remove`: delete an entry from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::errors::{Result, VaultError};
use crate::vault::VaultSession;

/// Execute the `remove` command.
pub fn execute(session: &mut VaultSession<'_>, name: &str, force: bool) -> Result<()> {
    // Check first so we never ask to confirm something that is not there.
    session.get(name)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove entry '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    session.remove(name)?;
    output::success(&format!("Removed entry '{name}'"));

    Ok(())
}
