//! Error types for gpulive

use std::io;
use thiserror::Error;

/// Result type alias for gpulive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
///
/// Subsystem errors display as the bare diagnostic text, since that text is what the
/// dashboard shows in its error panel.
#[derive(Error, Debug)]
pub enum Error {
    /// NVML error (NVIDIA GPUs)
    #[cfg(feature = "nvidia")]
    #[error("{0}")]
    Nvml(#[from] nvml_wrapper::error::NvmlError),

    /// Failure reported by a hardware-management backend
    #[error("{0}")]
    Subsystem(String),

    /// Query not supported by the device
    #[error("Not supported")]
    NotSupported,

    /// I/O error (terminal and display plumbing)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Interrupt handler could not be installed
    #[error("Signal handler error: {0}")]
    Signal(String),
}

impl From<ctrlc::Error> for Error {
    fn from(err: ctrlc::Error) -> Self {
        Error::Signal(err.to_string())
    }
}
