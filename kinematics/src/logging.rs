//! Injected logging capability.
//!
//! Components hold a [`Logger`] instead of calling the `log` macros, which always
//! dispatch to the process-wide backend. The default handle forwards to that
//! backend, so hosts that install `env_logger` (or any other `log` implementation)
//! see the same output. Tests hand in their own `log::Log` to inspect what was
//! reported.

use std::{fmt, sync::Arc};

use log::{Level, Log, Metadata, Record};

/// Forwards every call to the backend installed with `log::set_logger`.
struct GlobalBackend;

impl Log for GlobalBackend {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// A cloneable handle to a `log` backend plus the target its records carry.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Log>,
    target: &'static str,
}

impl Logger {
    /// Handle that forwards to the global `log` backend.
    pub fn global(target: &'static str) -> Self {
        Self {
            sink: Arc::new(GlobalBackend),
            target,
        }
    }

    /// Handle that writes to `sink`.
    pub fn with_sink(sink: Arc<dyn Log>, target: &'static str) -> Self {
        Self { sink, target }
    }

    /// Same sink, different target.
    pub fn scoped(&self, target: &'static str) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            target,
        }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder().level(level).target(self.target).build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(module_path!()))
                .build(),
        );
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("target", &self.target).finish()
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use log::{Level, LevelFilter, Log, Metadata, Record};

    use super::{Logger, capture::CaptureLog};

    const GLOBAL_TARGET: &str = "kinematics::logging::global";

    /// Process-wide backend that accepts every level and counts its own target.
    struct CountingBackend(AtomicUsize);

    impl Log for CountingBackend {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            if record.target() == GLOBAL_TARGET {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn flush(&self) {}
    }

    static BACKEND: CountingBackend = CountingBackend(AtomicUsize::new(0));

    #[test]
    fn records_reach_the_injected_sink() {
        let (capture, logger) = CaptureLog::logger("kinematics::test");
        logger.warn(format_args!("surface {} missing", 7));
        logger.debug(format_args!("noise"));

        assert_eq!(capture.count(Level::Warn), 1);
        assert_eq!(capture.count(Level::Debug), 1);
        assert_eq!(capture.messages()[0], "surface 7 missing");
    }

    #[test]
    fn scoped_handles_share_the_sink() {
        let (capture, logger) = CaptureLog::logger("a");
        let scoped = logger.scoped("b");
        assert_eq!(scoped.target(), "b");

        scoped.info(format_args!("hello"));
        assert_eq!(capture.count(Level::Info), 1);
    }

    #[test]
    fn global_handle_honours_the_max_level() {
        let _ = log::set_logger(&BACKEND);
        log::set_max_level(LevelFilter::Warn);
        let logger = Logger::global(GLOBAL_TARGET);

        logger.debug(format_args!("filtered"));
        logger.info(format_args!("filtered"));
        assert_eq!(BACKEND.0.load(Ordering::SeqCst), 0);

        logger.warn(format_args!("kept"));
        assert_eq!(BACKEND.0.load(Ordering::SeqCst), 1);
    }
}
