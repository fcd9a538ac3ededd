//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use dockyard_kube::ReconcileError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Invalid flags or environment
    #[error("Configuration error: {message}")]
    #[diagnostic(code(dockyard::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The Kubernetes API could not be reached
    #[error("Kubernetes error: {message}")]
    #[diagnostic(
        code(dockyard::cli::kubernetes),
        help("check KUBECONFIG or the in-cluster service account")
    )]
    Kubernetes { message: String },

    /// IO error (writing output)
    #[error("IO error: {message}")]
    #[diagnostic(code(dockyard::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(dockyard::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Kubernetes { .. } => exit_codes::UNAVAILABLE,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<kube::Error> for CliError {
    fn from(err: kube::Error) -> Self {
        CliError::Kubernetes {
            message: err.to_string(),
        }
    }
}

impl From<ReconcileError> for CliError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Api(e) => e.into(),
            other => CliError::internal(other.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::internal(format!("failed to render YAML: {}", err))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
