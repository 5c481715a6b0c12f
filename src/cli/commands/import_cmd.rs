//! `pwvault import`: add entries from a JSON object of strings.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::errors::{Result, VaultError};
use crate::vault::VaultSession;

/// Execute the `import` command.
pub fn execute(session: &mut VaultSession<'_>, source: &Path) -> Result<()> {
    if !source.exists() {
        return Err(VaultError::CommandFailed(format!(
            "import file not found: {}",
            source.display()
        )));
    }

    let bytes = fs::read(source)?;
    let report = session.import(&bytes)?;

    for name in &report.added {
        output::info(&format!("  + {name}"));
    }
    for (name, reason) in &report.rejected {
        output::warning(&format!("  skipped {name}: {reason}"));
    }

    if report.added.is_empty() && report.rejected.is_empty() {
        output::warning("No entries found in the import file.");
        return Ok(());
    }

    output::success(&format!(
        "Imported {} entries from {} ({} skipped)",
        report.added.len(),
        source.display(),
        report.rejected.len()
    ));

    Ok(())
}
