//! Remote shell traits

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::{ConnectionInfo, StreamKind};

/// Receives raw output chunks while a statement runs
///
/// Chunks of one stream arrive in order; the two streams may interleave arbitrarily.
pub trait OutputHandler: Send {
    /// Handle one chunk. Returning an error aborts the execution.
    ///
    /// # Errors
    /// Implementations return `ExecError::OutputRejected` for chunks they cannot accept
    fn on_output(&mut self, stream: StreamKind, chunk: &[u8]) -> Result<(), ExecError>;
}

/// A remote shell session that is opened once, runs statements and is disposed
#[async_trait]
pub trait RemoteShell: Send {
    /// Establish and authenticate the session
    async fn connect(&mut self, info: &ConnectionInfo) -> Result<(), ExecError>;

    /// Run `statement` as a single remote invocation, streaming output into `output`
    async fn execute(
        &mut self,
        statement: &str,
        output: &mut dyn OutputHandler,
    ) -> Result<(), ExecError>;

    /// Release the session. Safe to call when never connected.
    async fn dispose(&mut self);

    /// Whether a session is currently held
    fn is_connected(&self) -> bool;
}
