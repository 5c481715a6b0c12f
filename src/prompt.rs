//! Password input capability.
//!
//! The vault engine asks a `PasswordPrompt` whenever the credential cache
//! cannot answer.  The terminal implementation is what the CLI uses; the
//! static and scripted ones let tests drive unlock flows without a TTY.

use std::collections::VecDeque;
use std::sync::Mutex;

use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Environment variable that answers every terminal prompt (CI/scripts).
pub const PASSWORD_ENV: &str = "PWVAULT_PASSWORD";

/// Minimum length for a password chosen interactively.
const MIN_PASSWORD_LEN: usize = 8;

/// Something that can ask the user for a password.
pub trait PasswordPrompt {
    /// Ask for the password of an existing vault.
    fn read_password(&self, prompt: &str) -> Result<Zeroizing<String>>;

    /// Ask for the password of a vault about to be created.
    ///
    /// Defaults to a plain `read_password`; interactive implementations
    /// add a confirmation step.
    fn read_new_password(&self, prompt: &str) -> Result<Zeroizing<String>> {
        self.read_password(prompt)
    }
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Hidden-input prompt on the controlling terminal.
///
/// `PWVAULT_PASSWORD`, when set and non-empty, is returned instead of
/// prompting.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn from_env() -> Option<Zeroizing<String>> {
        std::env::var(PASSWORD_ENV)
            .ok()
            .filter(|pw| !pw.is_empty())
            .map(Zeroizing::new)
    }
}

impl PasswordPrompt for TerminalPrompt {
    fn read_password(&self, prompt: &str) -> Result<Zeroizing<String>> {
        if let Some(pw) = Self::from_env() {
            return Ok(pw);
        }

        let pw = dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
        Ok(Zeroizing::new(pw))
    }

    fn read_new_password(&self, prompt: &str) -> Result<Zeroizing<String>> {
        if let Some(pw) = Self::from_env() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(VaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(pw);
        }

        loop {
            let password = Zeroizing::new(
                dialoguer::Password::new()
                    .with_prompt(prompt)
                    .with_confirmation(
                        "Confirm vault password",
                        "Passwords do not match, try again",
                    )
                    .interact()
                    .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?,
            );

            if password.len() < MIN_PASSWORD_LEN {
                crate::cli::output::warning(&format!(
                    "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
                ));
                continue;
            }

            return Ok(password);
        }
    }
}

// ---------------------------------------------------------------------------
// Non-interactive
// ---------------------------------------------------------------------------

/// Always answers with the same password.
pub struct StaticPrompt {
    password: Zeroizing<String>,
}

impl StaticPrompt {
    pub fn new(password: &str) -> Self {
        Self {
            password: Zeroizing::new(password.to_string()),
        }
    }
}

impl PasswordPrompt for StaticPrompt {
    fn read_password(&self, _prompt: &str) -> Result<Zeroizing<String>> {
        Ok(self.password.clone())
    }
}

/// Answers with a fixed sequence of passwords, then cancels.
///
/// Counts how often it was asked so tests can assert on retry behavior.
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<usize>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(0),
        }
    }

    /// How many times a password was requested.
    pub fn times_asked(&self) -> usize {
        self.asked.lock().map(|n| *n).unwrap_or(0)
    }
}

impl PasswordPrompt for ScriptedPrompt {
    fn read_password(&self, _prompt: &str) -> Result<Zeroizing<String>> {
        if let Ok(mut n) = self.asked.lock() {
            *n += 1;
        }
        self.answers
            .lock()
            .map_err(|_| VaultError::CommandFailed("prompt script lock poisoned".into()))?
            .pop_front()
            .map(Zeroizing::new)
            .ok_or(VaultError::UserCancelled)
    }
}
