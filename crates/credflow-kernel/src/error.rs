//! Kernel-specific error types.

use credflow_types::error::ControllerError;
use thiserror::Error;

/// Kernel error type wrapping ControllerError with kernel-specific context.
#[derive(Error, Debug)]
pub enum KernelError {
    /// A wrapped ControllerError.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// The configuration cannot drive a session.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The run was interrupted before it finished.
    #[error("Interrupted")]
    Interrupted,
}

/// Alias for kernel results.
pub type KernelResult<T> = Result<T, KernelError>;
