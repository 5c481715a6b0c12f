pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod keyring;
pub mod prompt;
pub mod tracker;
pub mod vault;
