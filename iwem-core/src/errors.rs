use std::path::PathBuf;
use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum IWEMError {
    #[error("Invalid input for `{field}`: {message}")]
    InvalidInput { field: String, message: String },
    #[error("I/O failure for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Key `{key}` not found in {table}")]
    MissingKey { table: String, key: String },
    #[error("Key `{key}` appears more than once in {table}")]
    DuplicateKey { table: String, key: String },
    #[error("Invalid runner configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl IWEMError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn missing_key(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingKey {
            table: table.into(),
            key: key.into(),
        }
    }

    pub fn duplicate_key(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            table: table.into(),
            key: key.into(),
        }
    }

    /// True for errors caused by the simulation inputs themselves
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// True for errors raised while loading or persisting files
    ///
    /// Malformed tables and missing lookup keys fall into this class as they
    /// stem from the input files rather than the numerical model.
    pub fn is_io_failure(&self) -> bool {
        !self.is_invalid_input()
    }
}

/// Convenience type for `Result<T, IWEMError>`.
pub type IWEMResult<T> = Result<T, IWEMError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message_names_field() {
        let err = IWEMError::invalid_input("slr", "expected 3 values, got 2");
        assert_eq!(
            err.to_string(),
            "Invalid input for `slr`: expected 3 values, got 2"
        );
        assert!(err.is_invalid_input());
        assert!(!err.is_io_failure());
    }

    #[test]
    fn test_io_failure_classification() {
        let err = IWEMError::io(
            "inputs/SLR_LT.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.is_io_failure());
        assert!(err.to_string().contains("inputs/SLR_LT.csv"));

        let err = IWEMError::missing_key("parameters", "Rhyll");
        assert!(err.is_io_failure());
        assert_eq!(err.to_string(), "Key `Rhyll` not found in parameters");
    }
}
