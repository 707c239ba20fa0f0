//! shellcast-exec: Remote shell transport
//!
//! Provides the traits the execution pipeline drives and an SSH implementation built on russh

pub mod error;
pub mod keys;
pub mod result;
pub mod ssh;
pub mod traits;

pub use error::ExecError;
pub use keys::{KeyError, KeySource};
pub use result::{ConnectionInfo, Credential, StreamKind};
pub use ssh::SshShell;
pub use traits::{OutputHandler, RemoteShell};
