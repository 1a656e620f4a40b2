use std::fmt;

use crate::config::exit_codes;

/// Custom error type for gitctx operations
#[derive(Debug)]
pub enum GitCtxError {
    /// A context with this name is already registered
    AlreadyExists(String),
    /// No context with this name is registered
    NotFound(String),
    /// The context may not be deleted
    ProtectedContext(String),
    /// Home directory could not be determined
    HomeNotFound,
    /// Filesystem read/write failed
    Io(String),
    /// JSON parsing or serialization error
    Json(String),
    /// Registry is in an unusable state
    Config(String),
    /// A git config file could not be parsed
    GitConfig(String),
}

impl GitCtxError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            GitCtxError::AlreadyExists(_) => exit_codes::ALREADY_EXISTS,
            GitCtxError::NotFound(_) => exit_codes::NOT_FOUND,
            GitCtxError::ProtectedContext(_) => exit_codes::PROTECTED_CONTEXT,
            _ => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for GitCtxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitCtxError::AlreadyExists(name) => write!(f, "context '{}' already exists", name),
            GitCtxError::NotFound(name) => write!(f, "context '{}' not found", name),
            GitCtxError::ProtectedContext(name) => {
                write!(f, "context '{}' is protected and cannot be deleted", name)
            }
            GitCtxError::HomeNotFound => write!(f, "could not determine home directory"),
            GitCtxError::Io(msg) => write!(f, "{}", msg),
            GitCtxError::Json(msg) => write!(f, "JSON error: {}", msg),
            GitCtxError::Config(msg) => write!(f, "Configuration error: {}", msg),
            GitCtxError::GitConfig(msg) => write!(f, "Git config error: {}", msg),
        }
    }
}

impl std::error::Error for GitCtxError {}

impl From<serde_json::Error> for GitCtxError {
    fn from(err: serde_json::Error) -> Self {
        GitCtxError::Json(err.to_string())
    }
}

impl From<std::io::Error> for GitCtxError {
    fn from(err: std::io::Error) -> Self {
        GitCtxError::Io(err.to_string())
    }
}

/// Result type alias for gitctx operations
pub type Result<T> = std::result::Result<T, GitCtxError>;
