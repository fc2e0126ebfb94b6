use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Control error: {0}")]
    Control(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type WardenResult<T> = Result<T, WardenError>;
