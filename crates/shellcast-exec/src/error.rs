//! Error types for shellcast-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during remote execution
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Failed to connect to remote host
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Remote command sequence exited with a non-zero status
    #[error("command execution failed with exit status {status}")]
    CommandFailed {
        /// Exit status code
        status: u32,
    },

    /// Remote command sequence was terminated by a signal
    #[error("command terminated by signal {signal}")]
    Signalled {
        /// Signal name as reported by the server
        signal: String,
    },

    /// Connection attempt timed out
    #[error("connection timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// SSH key error
    #[error("SSH key error: {0}")]
    SshKeyError(String),

    /// I/O error on the channel
    #[error("I/O error: {0}")]
    IoError(String),

    /// Connection not established
    #[error("not connected")]
    NotConnected,

    /// An output handler refused a chunk
    #[error("{0}")]
    OutputRejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message() {
        let err = ExecError::CommandFailed { status: 127 };
        assert_eq!(err.to_string(), "command execution failed with exit status 127");
    }

    #[test]
    fn test_output_rejected_is_transparent() {
        let err = ExecError::OutputRejected("stdout chunk is not valid UTF-8".to_string());
        assert_eq!(err.to_string(), "stdout chunk is not valid UTF-8");
    }
}
