//! Process-facing log output

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use shellcast_exec::StreamKind;
use tracing::warn;

/// Where run progress, relayed output and the failure outcome go
pub trait LogSink: Send + Sync {
    /// Progress message
    fn info(&self, message: &str);

    /// Mark the run failed with `message`
    fn fail(&self, message: &str);

    /// One reassembled line from a remote stream
    fn line(&self, stream: StreamKind, line: &str);
}

/// Writes the line-delimited, stream-tagged log format
///
/// Failures are written as `::error::` workflow commands so CI runners annotate them.
#[derive(Debug)]
pub struct ConsoleSink<W> {
    out: Mutex<W>,
    failed: AtomicBool,
}

impl ConsoleSink<std::io::Stdout> {
    /// Sink writing to the process stdout
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            failed: AtomicBool::new(false),
        }
    }

    /// Whether `fail` has been called
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_lines(&self, lines: impl IntoIterator<Item = String>) {
        let mut out = self.out.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for line in lines {
            if let Err(e) = writeln!(out, "{line}") {
                warn!(error = %e, "failed to write log line");
                return;
            }
        }
        if let Err(e) = out.flush() {
            warn!(error = %e, "failed to flush log output");
        }
    }
}

impl<W: Write + Send> LogSink for ConsoleSink<W> {
    fn info(&self, message: &str) {
        self.write_lines([message.to_string()]);
    }

    fn fail(&self, message: &str) {
        self.failed.store(true, Ordering::SeqCst);
        self.write_lines([format!("::error::{message}")]);
    }

    fn line(&self, stream: StreamKind, line: &str) {
        let tag = stream.tag();
        self.write_lines(line.lines().map(|l| format!("{tag}: {l}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(sink: ConsoleSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_lines_are_tagged() {
        let sink = ConsoleSink::new(Vec::new());
        sink.line(StreamKind::Stdout, "hello");
        sink.line(StreamKind::Stderr, "oops");
        assert_eq!(output(sink), "out: hello\nerr: oops\n");
    }

    #[test]
    fn test_multiline_record_tags_every_line() {
        let sink = ConsoleSink::new(Vec::new());
        sink.line(StreamKind::Stderr, "a\nb");
        assert_eq!(output(sink), "err: a\nerr: b\n");
    }

    /// Accepts writes but cannot flush
    struct NoFlush(Vec<u8>);

    impl Write for NoFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("flush refused"))
        }
    }

    #[test]
    fn test_flush_error_does_not_drop_lines() {
        let sink = ConsoleSink::new(NoFlush(Vec::new()));
        sink.line(StreamKind::Stdout, "first");
        sink.fail("boom");
        assert!(sink.failed());
        let written = String::from_utf8(sink.into_inner().0).unwrap();
        assert_eq!(written, "out: first\n::error::boom\n");
    }

    #[test]
    fn test_fail_marks_sink() {
        let sink = ConsoleSink::new(Vec::new());
        sink.info("Connection established...");
        assert!(!sink.failed());
        sink.fail("connection failed: refused");
        assert!(sink.failed());
        assert_eq!(
            output(sink),
            "Connection established...\n::error::connection failed: refused\n"
        );
    }
}
