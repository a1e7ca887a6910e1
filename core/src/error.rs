//! Error types for view-state tracking

use thiserror::Error;

/// Main error type for view-state operations
#[derive(Error, Debug)]
pub enum ViewStateError {
    // ============ Value Errors ============
    #[error("Type mismatch for key {key}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    
    // ============ Structural Errors ============
    #[error("Corrupt state: {0}")]
    CorruptState(String),
    
    #[error("Schema mismatch: expected {expected} positions, found {found}")]
    SchemaMismatch { expected: usize, found: usize },
    
    // ============ Host Errors ============
    #[error("Serialization failed: {0}")]
    Serialization(String),
    
    #[error("Configuration error: {0}")]
    Config(String),
    
    #[error("I/O error: {0}")]
    Io(String),
    
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ViewStateError {
    /// Errors that invalidate a whole payload rather than a single value.
    ///
    /// A host seeing one of these should discard the restored tree and start
    /// again from constructed defaults.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ViewStateError::CorruptState(_) | ViewStateError::SchemaMismatch { .. }
        )
    }
    
    pub fn corrupt(message: impl Into<String>) -> Self {
        ViewStateError::CorruptState(message.into())
    }
}

impl From<std::io::Error> for ViewStateError {
    fn from(err: std::io::Error) -> Self {
        ViewStateError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ViewStateError {
    fn from(err: serde_json::Error) -> Self {
        ViewStateError::Serialization(err.to_string())
    }
}
