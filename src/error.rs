//! Application error type.
//!
//! Every fallible path in the binary ends in an `AppError`, which carries the
//! process exit code alongside a human-readable message:
//!
//! - `2`: configuration or input problems (bad flags, missing credentials, bad CSV schema)
//! - `3`: no data available (cache missing, nothing to show)
//! - `4`: runtime failures (network, terminal, filesystem)

use crate::census::CensusError;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_NO_DATA: u8 = 3;
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(EXIT_NO_DATA, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<CensusError> for AppError {
    fn from(err: CensusError) -> Self {
        AppError::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn census_errors_map_to_config_exit_code() {
        let err: AppError = CensusError::UnknownCategory("rocket-body".to_string()).into();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
        assert!(err.message().contains("rocket-body"));
    }
}
