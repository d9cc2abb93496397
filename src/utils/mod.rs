//! # Core Test Utilities
//!
//! Text, trace, file and defect helpers shared by the rest of the crate.
//! Random data lives in [`random`], date formatting in [`dates`].

pub mod dates;
pub mod random;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;

use crate::logging::Failure;
use crate::testing::Assertion;

/// Frames from the test harness or the runtime start-up. A trace is cut at
/// the first of these.
const HARNESS_FRAMES: [&str; 4] = [
    "test::run_test",
    "std::rt::lang_start",
    "core::ops::function::FnOnce::call_once",
    "std::panicking::try",
];

const DEFECT_TRACKER_URL: &str = "https://myjira.disney.com/browse/";

/// Keep the first line of a formatted trace and every following line up to
/// (not including) the first harness frame.
pub fn truncate_trace(formatted: &str) -> String {
    let mut lines = formatted.lines();
    let mut truncated = String::new();
    if let Some(first) = lines.next() {
        truncated.push_str(first);
        truncated.push('\n');
    }
    for line in lines {
        if HARNESS_FRAMES.iter().any(|frame| line.contains(frame)) {
            break;
        }
        truncated.push_str(line);
        truncated.push('\n');
    }
    truncated
}

/// `message` followed by one `caused by:` line per error in the source chain.
pub fn format_trace(err: &(dyn Error + 'static)) -> String {
    let mut formatted = format!("{err}\n");
    let mut source = err.source();
    while let Some(cause) = source {
        formatted.push_str(&format!("\t caused by: {cause}\n"));
        source = cause.source();
    }
    formatted
}

/// First capture group of `pattern` in `line`, or `None` when the pattern is
/// invalid, does not match, or has no group.
pub fn parse_line(line: &str, pattern: &str) -> Option<String> {
    let regex = Regex::new(pattern).ok()?;
    regex
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str().to_string())
}

pub fn read_file(path: impl AsRef<Path>) -> Result<String, String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| format!("Failed to read file `{}`: {e}", path.display()))
}

/// Replace the contents of `dest` with the contents of `source`.
pub fn copy_file(
    assertion: &Assertion,
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
) -> Result<(), Failure> {
    let (source, dest) = (source.as_ref(), dest.as_ref());
    log::info!(
        "Creating file ({}) with the contents from file ({})",
        dest.display(),
        source.display()
    );
    fs::copy(source, dest).map_err(|e| {
        assertion.fatal_with(
            format!(
                "Failure to copy file ({}) into file ({})",
                source.display(),
                dest.display()
            ),
            e,
        )
    })?;
    log::info!("Successfully created file ({})", dest.display());
    Ok(())
}

/// Working directory as a string, `./` when it cannot be determined.
pub fn current_dir_string() -> String {
    std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|_| "./".to_string())
}

pub fn current_dir_or_dot() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub fn sleep(millis: u64) {
    std::thread::sleep(Duration::from_millis(millis));
}

/// Fail the current test because of a known defect.
pub fn fail_test_with_defect(assertion: &Assertion, step: &str, defect_id: &str) -> Failure {
    assertion.fatal(format!(
        "Test step {step} fails due to a defect - {DEFECT_TRACKER_URL}{defect_id}. \
         Please remove this assert after the defect has been fixed"
    ))
}

/// Record a known defect and keep going.
pub fn log_defect_without_fail(defect_id: &str) {
    log::error!(
        "Bypassing defect ( {DEFECT_TRACKER_URL}{defect_id} ). \
         Please remove bypassing command after the defect has been fixed"
    );
}
