//! Drives one run: connect, build the statement, execute, relay output, release

use shellcast_exec::{ExecError, OutputHandler, RemoteShell, StreamKind};
use tracing::{debug, error, instrument};

use crate::command::assemble;
use crate::config::RunConfig;
use crate::error::RunError;
use crate::export::build_export_statement;
use crate::reassembler::LineReassembler;
use crate::sink::LogSink;

/// Terminal outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed,
}

impl RunStatus {
    #[must_use]
    pub fn success(self) -> bool {
        self == RunStatus::Succeeded
    }
}

/// Routes chunks of each stream through its own reassembler into the sink
struct OutputRelay<'a> {
    stdout: LineReassembler,
    stderr: LineReassembler,
    sink: &'a dyn LogSink,
}

impl<'a> OutputRelay<'a> {
    fn new(sink: &'a dyn LogSink) -> Self {
        Self {
            stdout: LineReassembler::new(StreamKind::Stdout),
            stderr: LineReassembler::new(StreamKind::Stderr),
            sink,
        }
    }

    /// Emit partial lines left at the end of both streams
    fn finish(&mut self) {
        for reassembler in [&mut self.stdout, &mut self.stderr] {
            if let Some(line) = reassembler.finish() {
                debug!(stream = %reassembler.stream(), "flushing unterminated line");
                self.sink.line(reassembler.stream(), &line);
            }
        }
    }
}

impl OutputHandler for OutputRelay<'_> {
    fn on_output(&mut self, stream: StreamKind, chunk: &[u8]) -> Result<(), ExecError> {
        let reassembler = match stream {
            StreamKind::Stdout => &mut self.stdout,
            StreamKind::Stderr => &mut self.stderr,
        };

        match reassembler.push(chunk) {
            Ok(Some(line)) => self.sink.line(stream, &line),
            Ok(None) => {}
            Err(e) => return Err(ExecError::OutputRejected(e.to_string())),
        }
        Ok(())
    }
}

/// Runs a command batch on a remote shell and reports to a `LogSink`
pub struct Orchestrator<'a> {
    sink: &'a dyn LogSink,
}

impl<'a> Orchestrator<'a> {
    pub fn new(sink: &'a dyn LogSink) -> Self {
        Self { sink }
    }

    /// Execute `config` on `shell`
    ///
    /// Any error is reported once through `LogSink::fail` and the shell is
    /// disposed on every path, including a failed connect.
    #[instrument(skip_all, fields(host = %config.connection.host))]
    pub async fn run(&self, shell: &mut dyn RemoteShell, config: &RunConfig) -> RunStatus {
        let status = match self.drive(shell, config).await {
            Ok(()) => RunStatus::Succeeded,
            Err(e) => {
                error!(error = %e, "run failed");
                self.sink.fail(&e.to_string());
                RunStatus::Failed
            }
        };

        debug!(connected = shell.is_connected(), "releasing session");
        shell.dispose().await;

        status
    }

    async fn drive(&self, shell: &mut dyn RemoteShell, config: &RunConfig) -> Result<(), RunError> {
        shell
            .connect(&config.connection)
            .await
            .map_err(RunError::Connection)?;

        self.sink.info("Connection established...");

        let export = build_export_statement(&config.envs, &config.policy);
        let statement = assemble(&export, &config.commands);

        self.sink.info("Executing commands...");
        debug!(commands = config.commands.len(), "executing assembled statement");

        let mut relay = OutputRelay::new(self.sink);
        let result = shell
            .execute(&statement, &mut relay)
            .await
            .map_err(RunError::from_execution);

        // undecodable output leaves nothing to salvage
        if !matches!(result, Err(RunError::Decoding(_))) {
            relay.finish();
        }
        result?;

        self.sink.info("Done executing all commands!");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<(StreamKind, String)>>,
    }

    impl LogSink for Recorder {
        fn info(&self, _message: &str) {}
        fn fail(&self, _message: &str) {}
        fn line(&self, stream: StreamKind, line: &str) {
            self.lines.lock().unwrap().push((stream, line.to_string()));
        }
    }

    #[test]
    fn test_relay_keeps_streams_apart() {
        let sink = Recorder::default();
        let mut relay = OutputRelay::new(&sink);

        relay.on_output(StreamKind::Stdout, b"fo").unwrap();
        relay.on_output(StreamKind::Stderr, b"warn").unwrap();
        relay.on_output(StreamKind::Stdout, b"o\n").unwrap();
        relay.on_output(StreamKind::Stderr, b"ing\n").unwrap();

        assert_eq!(
            *sink.lines.lock().unwrap(),
            vec![
                (StreamKind::Stdout, "foo".to_string()),
                (StreamKind::Stderr, "warning".to_string()),
            ]
        );
    }

    #[test]
    fn test_relay_rejects_invalid_utf8() {
        let sink = Recorder::default();
        let mut relay = OutputRelay::new(&sink);
        let err = relay.on_output(StreamKind::Stdout, &[0xff]).unwrap_err();
        assert!(matches!(err, ExecError::OutputRejected(_)));
    }

    #[test]
    fn test_relay_finish_flushes_both_streams() {
        let sink = Recorder::default();
        let mut relay = OutputRelay::new(&sink);
        relay.on_output(StreamKind::Stderr, b"tail-err").unwrap();
        relay.on_output(StreamKind::Stdout, b"tail-out").unwrap();
        relay.finish();

        assert_eq!(
            *sink.lines.lock().unwrap(),
            vec![
                (StreamKind::Stdout, "tail-out".to_string()),
                (StreamKind::Stderr, "tail-err".to_string()),
            ]
        );
    }
}
