//! Service event log.
//!
//! [`Logger`] is the single `log(level, message)` collaborator shared by the
//! registry build, the dispatcher and user handlers. Every entry becomes a
//! `tracing` event. When a sink is attached, the entry is also written to it
//! as one tab-separated line:
//!
//! ```text
//! 10/16/2026 14:03:07	System	Info	Server started @ http://localhost:5678/
//! ```
//!
//! Sink writes are serialized by the logger's own mutex, so lines from
//! concurrent requests never interleave.

use std::fmt::{self, Write as _};
use std::io::Write;
use std::sync::{Arc, Mutex};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Info => "Info",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
        })
    }
}

/// Who produced a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    /// The service itself
    System,
    /// An operation handler, through its invocation context
    User,
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogSource::System => "System",
            LogSource::User => "User",
        })
    }
}

/// Source of entry timestamps.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Text written in place of a message whose `Display` impl failed.
pub const FORMAT_FAILURE: &str = "could not format log entry";

/// Cheaply cloneable handle; clones share the sink and its lock.
#[derive(Clone)]
pub struct Logger {
    sink: Option<Sink>,
    clock: Clock,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

impl Logger {
    /// A logger that only emits `tracing` events.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: None,
            clock: Arc::new(local_now),
        }
    }

    /// Also write formatted lines to `writer`.
    #[must_use]
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Some(Arc::new(Mutex::new(Box::new(writer)))),
            ..Self::new()
        }
    }

    /// Also write formatted lines to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::with_writer(std::io::stdout())
    }

    /// Replace the timestamp source.
    #[must_use]
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> OffsetDateTime + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Record a system entry.
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        self.log_as(LogSource::System, level, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    /// Record an entry with an explicit source. Never fails.
    pub fn log_as(&self, source: LogSource, level: LogLevel, message: impl fmt::Display) {
        let mut text = String::new();
        if write!(text, "{message}").is_err() {
            text.clear();
            text.push_str(FORMAT_FAILURE);
        }

        match level {
            LogLevel::Info => info!(source = %source, "{}", text),
            LogLevel::Warning => warn!(source = %source, "{}", text),
            LogLevel::Error => error!(source = %source, "{}", text),
        }

        if let Some(sink) = &self.sink {
            let stamp = (self.clock)()
                .format(format_description!(
                    "[month]/[day]/[year] [hour]:[minute]:[second]"
                ))
                .unwrap_or_default();
            let line = format!("{stamp}\t{source}\t{level}\t{text}\n");
            let mut out = match sink.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Err(e) = out.write_all(line.as_bytes()).and_then(|()| out.flush()) {
                debug!(error = %e, "log sink write failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    fn fixed() -> OffsetDateTime {
        datetime!(2011-03-07 09:05:02 UTC)
    }

    #[test]
    fn test_line_format() {
        let cap = Capture::default();
        let logger = Logger::with_writer(cap.clone()).with_clock(fixed);
        logger.info(format_args!("Server started @ {}", "http://localhost:5678/"));
        logger.log_as(LogSource::User, LogLevel::Warning, "careful");
        assert_eq!(
            cap.text(),
            "03/07/2011 09:05:02\tSystem\tInfo\tServer started @ http://localhost:5678/\n\
             03/07/2011 09:05:02\tUser\tWarning\tcareful\n"
        );
    }

    #[test]
    fn test_failing_display_is_replaced() {
        let cap = Capture::default();
        let logger = Logger::with_writer(cap.clone()).with_clock(fixed);
        logger.error(Broken);
        assert!(cap.text().ends_with("\tSystem\tError\tcould not format log entry\n"));
    }

    #[test]
    fn test_no_sink_is_silent() {
        let logger = Logger::new();
        assert!(!logger.has_sink());
        logger.info("only tracing");
    }

    #[test]
    fn test_failing_sink_is_swallowed() {
        struct Refuse;
        impl Write for Refuse {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let logger = Logger::with_writer(Refuse);
        logger.warn("dropped");
    }

    #[test]
    fn test_concurrent_lines_do_not_interleave() {
        let cap = Capture::default();
        let logger = Logger::with_writer(cap.clone()).with_clock(fixed);
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let logger = logger.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        logger.info(format_args!("thread {i} entry {j}"));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        let text = cap.text();
        assert_eq!(text.lines().count(), 400);
        assert!(text
            .lines()
            .all(|l| l.starts_with("03/07/2011 09:05:02\tSystem\tInfo\tthread ")));
    }
}
