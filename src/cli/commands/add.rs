//! `pwvault add`: store a new entry in the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::errors::{Result, VaultError};
use crate::vault::VaultSession;

/// Execute the `add` command.
pub fn execute(session: &mut VaultSession<'_>, name: &str, value: Option<&str>) -> Result<()> {
    // Fail before asking for a value the vault would refuse anyway.
    if session.entries().contains(name) {
        return Err(VaultError::EntryAlreadyExists(name.to_string()));
    }

    let entry_value = if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line; it may appear in shell history.");
        Zeroizing::new(v.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        Zeroizing::new(buf.trim_end().to_string())
    } else {
        // Source 3: Interactive secure prompt (default).
        Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt(format!("Enter value for {name}"))
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?,
        )
    };

    session.add(name, &entry_value)?;

    output::success(&format!(
        "Entry '{}' added ({} total)",
        name,
        session.len()
    ));

    Ok(())
}
