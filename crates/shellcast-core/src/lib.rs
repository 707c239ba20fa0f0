//! shellcast-core: Remote command pipeline
//!
//! Builds the export prefix and command statement, runs it over a `RemoteShell`
//! and relays stdout/stderr as stream-tagged log lines.

pub mod command;
pub mod config;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod reassembler;
pub mod sink;

pub use command::assemble;
pub use config::{DEFAULT_IGNORED_ENVS, EnvEntry, ExportPolicy, RunConfig};
pub use error::RunError;
pub use export::build_export_statement;
pub use orchestrator::{Orchestrator, RunStatus};
pub use reassembler::{DecodeError, LineReassembler};
pub use sink::{ConsoleSink, LogSink};
