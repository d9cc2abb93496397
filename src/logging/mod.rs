//! # Logging & Fatal Failures
//!
//! Every message goes through the `log` facade. A fatal condition is a
//! [`Failure`]: it is reported once through a [`FailureReporter`] and then
//! propagated with `?` until the test function returns it, which fails the
//! test.

use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;
use std::io::Write;

use crate::utils::truncate_trace;

type Cause = Box<dyn Error + Send + Sync + 'static>;

/// A test-terminating failure.
#[derive(thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    message: String,
    #[source]
    cause: Option<Cause>,
    trace: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
            trace: capture_trace(),
        }
    }

    pub fn with_cause(message: impl Into<String>, cause: impl Into<Cause>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
            trace: capture_trace(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Call stack captured where the failure was raised, cut before the
    /// test harness frames.
    pub fn trace(&self) -> &str {
        &self.trace
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, "\ncaused by: {cause}")?;
        }
        if !self.trace.is_empty() {
            write!(f, "\n{}", self.trace)?;
        }
        Ok(())
    }
}

fn capture_trace() -> String {
    truncate_trace(&Backtrace::force_capture().to_string())
}

/// Receives every fatal failure before it is propagated.
pub trait FailureReporter: Send + Sync {
    fn report(&self, failure: &Failure);
}

/// Default reporter: writes the failure, its cause and the truncated trace
/// at `error` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl FailureReporter for LogReporter {
    fn report(&self, failure: &Failure) {
        match failure.cause() {
            Some(cause) => log::error!(
                "FATAL {}\ncaused by: {cause}\n{}",
                failure.message(),
                failure.trace()
            ),
            None => log::error!("FATAL {}\n{}", failure.message(), failure.trace()),
        }
    }
}

/// Install the `env_logger` backend. Safe to call from every test; only the
/// first call takes effect.
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{:<5} [{}] {}{}",
                record.level(),
                record.target(),
                thread_tag(),
                record.args()
            )
        })
        .try_init();
}

/// `@thread<id> - ` prefix identifying the emitting test thread.
pub fn thread_tag() -> String {
    let id = format!("{:?}", std::thread::current().id());
    let digits: String = id.chars().filter(char::is_ascii_digit).collect();
    format!("@thread{digits} - ")
}
