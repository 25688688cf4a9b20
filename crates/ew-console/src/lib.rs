/*
[INPUT]:  Public API exports for the ew-console crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod prompt;
pub mod session;
pub mod shell;
pub mod storage;

// Re-export main types for convenience
pub use commands::{Command, CommandOutcome, Tier, dispatch, list_available_commands};
pub use config::ConsoleConfig;
pub use error::{ConsoleError, Result};
pub use prompt::{Answer, Prompter, ScriptedPrompter, TerminalPrompter};
pub use session::{ConsoleContext, SessionState};
pub use shell::{Shell, ShellState};
pub use storage::{DeviceIdStore, WalletAlias, WalletAliasRegistry};
