//! `pwvault list`: display all entries in a table.

use crate::cli::output;
use crate::errors::Result;
use crate::vault::VaultSession;

/// Execute the `list` command.
pub fn execute(session: &VaultSession<'_>, reveal: bool) -> Result<()> {
    let entries = session.list(reveal);

    output::info(&format!(
        "{}: {} entr{}",
        session.path().display(),
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" }
    ));

    output::print_entries_table(&entries);

    Ok(())
}
