/*
[INPUT]:  Failures from prompts, local storage and the adapter layer
[OUTPUT]: ConsoleError with stable names for failure panels
[POS]:    Error handling layer - console command errors
[UPDATE]: When adding new failure classes to command handlers
*/

use ew_console_adapter::AdapterError;
use thiserror::Error;

/// Error raised by a console command
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Command invoked before the session tier it needs is ready
    #[error("{0}")]
    Precondition(String),

    /// User input could not be used
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Alias name already present in the registry
    #[error("Wallet name '{0}' already exists")]
    AliasExists(String),

    /// User dismissed a prompt
    #[error("Prompt cancelled")]
    PromptCancelled,

    /// Terminal prompt failed
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Registry file access failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Identity provider or SDK failure
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl ConsoleError {
    pub fn name(&self) -> &str {
        match self {
            ConsoleError::Precondition(_) => "PreconditionError",
            ConsoleError::InvalidInput(_) => "InvalidInputError",
            ConsoleError::AliasExists(_) => "AliasExistsError",
            ConsoleError::PromptCancelled => "PromptCancelledError",
            ConsoleError::Prompt(_) => "PromptError",
            ConsoleError::Storage(_) => "StorageError",
            ConsoleError::Adapter(err) => err.name(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        ConsoleError::Precondition(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
