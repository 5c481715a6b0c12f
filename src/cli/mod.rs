//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{self, PointerFile, Settings};
use crate::errors::{Result, VaultError};
use crate::prompt::TerminalPrompt;
use crate::tracker::{SessionPointer, SessionTracker};
use crate::vault::VaultSession;

/// pwvault CLI: a local, password-encrypted secrets vault.
#[derive(Parser)]
#[command(
    name = "pwvault",
    about = "Local password-encrypted secrets vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file to use (remembered as the current vault)
    #[arg(long, global = true, value_name = "PATH")]
    pub vault: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Add a new entry (refuses to overwrite an existing one)
    Add {
        /// Entry name (e.g. gmail)
        name: String,
        /// Entry value (omit for interactive prompt)
        value: Option<String>,
    },

    /// Print an entry's value
    Get {
        /// Entry name
        name: String,
        /// Copy the value to the clipboard instead of printing it
        #[arg(short, long)]
        copy: bool,
    },

    /// Remove an entry
    Remove {
        /// Entry name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List all entries
    List {
        /// Show values instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Export all entries to a plaintext JSON file
    Export {
        /// Destination file (written as given)
        path: PathBuf,
    },

    /// Import entries from a JSON object of strings
    Import {
        /// JSON file to read
        path: PathBuf,
    },

    /// Show the current vault
    Vault,
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

/// Resolve the vault, reconcile the credential cache, unlock, and dispatch.
pub fn run(cli: &Cli) -> Result<()> {
    let state_dir = config::state_dir()?;
    let settings = Settings::load(&state_dir)?;

    let path = resolve_vault_path(cli, &PointerFile::current(&state_dir))?;

    let cache = settings.build_cache();
    let tracker = SessionTracker::new(SessionPointer::in_state_dir(&state_dir), &cache);

    // Eviction is best effort: a stale password only costs a retry.
    if let Err(e) = tracker.activate(&path) {
        output::warning(&format!("Could not clear the previous vault's password: {e}"));
    }

    let mut session = VaultSession::load(
        &path,
        &cache,
        &TerminalPrompt,
        &settings.session_options(),
    )?;

    if let Err(e) = tracker.set_last_active_path(&path) {
        output::warning(&format!("Failed to record the active vault: {e}"));
    }

    dispatch(cli, &mut session)
}

fn dispatch(cli: &Cli, session: &mut VaultSession<'_>) -> Result<()> {
    match cli.command {
        Commands::Add {
            ref name,
            ref value,
        } => commands::add::execute(session, name, value.as_deref()),
        Commands::Get { ref name, copy } => commands::get::execute(session, name, copy),
        Commands::Remove { ref name, force } => commands::remove::execute(session, name, force),
        Commands::List { reveal } => commands::list::execute(session, reveal),
        Commands::Export { ref path } => commands::export::execute(session, path),
        Commands::Import { ref path } => commands::import_cmd::execute(session, path),
        Commands::Vault => commands::vault::execute(session),
    }
}

/// Work out which vault file this invocation targets.
///
/// `--vault` wins and is remembered in `current` for later runs (stored
/// absolute so a different working directory finds the same file).
/// Without the flag the remembered path is used.
pub fn resolve_vault_path(cli: &Cli, current: &PointerFile) -> Result<PathBuf> {
    match &cli.vault {
        Some(path) => {
            let path = absolute(path);
            current.write(&path)?;
            Ok(path)
        }
        None => current.read()?.ok_or(VaultError::NoVaultSelected),
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
