//! `pwvault get`: print (or copy) a single entry's value.

use crate::cli::output;
use crate::errors::{Result, VaultError};
use crate::vault::VaultSession;

/// Execute the `get` command.
pub fn execute(session: &VaultSession<'_>, name: &str, copy: bool) -> Result<()> {
    let value = session.get(name)?;

    if copy {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| VaultError::ClipboardError(e.to_string()))?;
        clipboard
            .set_text(value)
            .map_err(|e| VaultError::ClipboardError(e.to_string()))?;
        output::success(&format!("Copied '{name}' to the clipboard"));
        return Ok(());
    }

    println!("{value}");
    Ok(())
}
