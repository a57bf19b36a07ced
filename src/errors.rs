use std::error::Error;
use std::fmt;

/// Invalid or unresolvable character pool specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolError {
    message: String,
}

impl PoolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PoolError: {}", self.message)
    }
}

impl Error for PoolError {}

/// Invalid generator configuration or generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorError {
    message: String,
}

impl GeneratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PoolError> for GeneratorError {
    fn from(e: PoolError) -> Self {
        GeneratorError {
            message: e.message().to_string(),
        }
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GeneratorError: {}", self.message)
    }
}

impl Error for GeneratorError {}
