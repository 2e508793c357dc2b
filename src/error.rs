//! Error types for compose-dup

use thiserror::Error;

/// Result type for compose-dup operations
pub type Result<T> = std::result::Result<T, DupError>;

/// compose-dup error types
#[derive(Error, Debug)]
pub enum DupError {
    #[error("config_file {0} does not exist")]
    ConfigNotFound(String),

    #[error("num must be {min}-{max}, got {value}")]
    NumOutOfRange { value: i64, min: u32, max: u32 },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid entry key: {0}")]
    InvalidEntry(String),

    #[error("Directive log error at line {line}: {message}")]
    DirectiveLog { line: usize, message: String },

    #[error("Name collision: {kind} '{name}' is produced by more than one entry")]
    NameCollision { kind: &'static str, name: String },

    #[error("Image error: {0}")]
    Image(String),

    #[error("Command failed with {status}: {command}")]
    CommandFailed { command: String, status: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
