//! Core error types for shellcast-core

use shellcast_exec::ExecError;
use thiserror::Error;

/// Why a run failed
#[derive(Error, Debug, Clone)]
pub enum RunError {
    /// Session could not be established
    #[error(transparent)]
    Connection(ExecError),

    /// Remote output could not be decoded as text
    #[error("{0}")]
    Decoding(String),

    /// The remote command sequence failed
    #[error(transparent)]
    Execution(ExecError),
}

impl RunError {
    /// Classify an error raised while the statement was running
    pub(crate) fn from_execution(err: ExecError) -> Self {
        match err {
            ExecError::OutputRejected(message) => RunError::Decoding(message),
            other => RunError::Execution(other),
        }
    }
}
