//! `pwvault export`: write every entry to a plaintext JSON file.

use std::path::Path;

use crate::cli::output;
use crate::errors::Result;
use crate::vault::VaultSession;

/// Execute the `export` command.
pub fn execute(session: &VaultSession<'_>, dest: &Path) -> Result<()> {
    session.export(dest)?;

    output::success(&format!(
        "Exported {} entries to {}",
        session.len(),
        dest.display()
    ));
    output::warning("The export is NOT encrypted. Delete it when you are done.");

    Ok(())
}
