//! One module per subcommand. Each `execute` runs against an unlocked
//! `VaultSession`.

pub mod add;
pub mod export;
pub mod get;
pub mod import_cmd;
pub mod list;
pub mod remove;
pub mod vault;
