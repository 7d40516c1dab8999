use thiserror::Error;

/// All errors that can occur in routestamp-core.
#[derive(Debug, Error)]
pub enum RouteStampError {
    #[error("Country not found: {0}")]
    CountryNotFound(String),

    #[error("Trip not found: {0}")]
    TripNotFound(String),

    #[error("Invalid import file: {0}")]
    InvalidImport(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Process exit codes used by the CLI.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
}

impl RouteStampError {
    /// Exit code the CLI should terminate with for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::CountryNotFound(_) | Self::TripNotFound(_) => ExitCode::NotFound,
            Self::InvalidImport(_) | Self::ValidationError(_) | Self::Json(_) => {
                ExitCode::InvalidArgs
            }
            Self::Io(_) => ExitCode::FileSystemError,
            Self::ConfigError(_) | Self::TomlParse(_) | Self::TomlSerialize(_) => {
                ExitCode::GeneralError
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RouteStampError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = RouteStampError::CountryNotFound("42".into());
        assert_eq!(err.exit_code() as i32, 2);
        assert_eq!(err.to_string(), "Country not found: 42");

        let err = RouteStampError::InvalidImport("missing countries".into());
        assert_eq!(err.exit_code(), ExitCode::InvalidArgs);
    }
}
