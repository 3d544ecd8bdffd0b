//! Error types for autosetup operations.
//!
//! This module defines [`SetupError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `SetupError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `SetupError::Other`) for unexpected errors
//! - Configuration errors in the step table are fatal before any step runs
//! - Persistence problems are logged, never raised, by the progress tracker

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for autosetup operations.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Step dependency cycle detected.
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// A step declares a dependency on a step that does not exist.
    #[error("Step '{step}' depends on unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    /// The same step id was declared twice.
    #[error("Step '{step}' is declared more than once")]
    DuplicateStep { step: String },

    /// An operation referenced a step id missing from the definition table.
    #[error("Unknown step: {step}")]
    UnknownStep { step: String },

    /// A declared step has no body bound to it.
    #[error("No step body registered for '{step}'")]
    MissingStepBody { step: String },

    /// Step execution failed.
    #[error("Step '{step}' failed: {message}")]
    StepExecutionError { step: String, message: String },

    /// Shell command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Reading or writing the progress file failed.
    #[error("State file {path}: {message}")]
    StatePersistence { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SetupError {
    /// Whether this error stems from the step table or project config,
    /// i.e. nothing may run until the configuration is fixed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SetupError::ConfigNotFound { .. }
                | SetupError::ConfigParseError { .. }
                | SetupError::ConfigValidationError { .. }
                | SetupError::CircularDependency { .. }
                | SetupError::UnknownDependency { .. }
                | SetupError::DuplicateStep { .. }
                | SetupError::MissingStepBody { .. }
        )
    }
}

/// Result type alias for autosetup operations.
pub type Result<T> = std::result::Result<T, SetupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = SetupError::ConfigParseError {
            path: PathBuf::from("/config.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/config.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn circular_dependency_displays_cycle() {
        let err = SetupError::CircularDependency {
            cycle: "a -> b -> a".into(),
        };
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn unknown_dependency_displays_both_ids() {
        let err = SetupError::UnknownDependency {
            step: "deploy".into(),
            dependency: "build".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("deploy"));
        assert!(msg.contains("build"));
    }

    #[test]
    fn unknown_step_displays_id() {
        let err = SetupError::UnknownStep {
            step: "nonexistent".into(),
        };
        assert!(err.to_string().contains("nonexistent"));
    }

    #[test]
    fn step_execution_error_displays_step_and_message() {
        let err = SetupError::StepExecutionError {
            step: "create_app".into(),
            message: "quota exceeded".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("create_app"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = SetupError::CommandFailed {
            command: "uv sync".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("uv sync"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn table_errors_are_configuration_errors() {
        assert!(SetupError::CircularDependency { cycle: "a".into() }.is_configuration());
        assert!(SetupError::MissingStepBody { step: "a".into() }.is_configuration());
        assert!(!SetupError::UnknownStep { step: "a".into() }.is_configuration());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: SetupError = io_err.into();
        assert!(matches!(err, SetupError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(SetupError::ConfigValidationError {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
