//! # Testing & Assertions
//!
//! Assertion wrappers that report a fatal [`Failure`] before handing it back
//! to the caller. Status-line and JSON-pointer checks live in [`status`].
//!
//! Every check returns `Result<(), Failure>`; a test written as
//! `fn my_test() -> Result<(), Failure>` stops at the first failed check.

pub mod status;

use std::error::Error;
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::logging::{Failure, FailureReporter, LogReporter};

pub use status::StatusVerifier;

/// Reports failures through a pluggable [`FailureReporter`].
#[derive(Clone)]
pub struct Assertion {
    reporter: Arc<dyn FailureReporter>,
}

impl Default for Assertion {
    fn default() -> Self {
        Self::with_reporter(Arc::new(LogReporter))
    }
}

impl Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion").finish_non_exhaustive()
    }
}

impl Assertion {
    pub fn with_reporter(reporter: Arc<dyn FailureReporter>) -> Self {
        Self { reporter }
    }

    /// Build and report a failure. The caller returns it as `Err`.
    pub fn fatal(&self, message: impl Into<String>) -> Failure {
        let failure = Failure::new(message);
        self.reporter.report(&failure);
        failure
    }

    pub fn fatal_with(
        &self,
        message: impl Into<String>,
        cause: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Failure {
        let failure = Failure::with_cause(message, cause);
        self.reporter.report(&failure);
        failure
    }

    pub fn fail<T>(&self, message: impl Into<String>) -> Result<T, Failure> {
        Err(self.fatal(message))
    }

    pub fn fail_with<T>(
        &self,
        message: impl Into<String>,
        cause: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Result<T, Failure> {
        Err(self.fatal_with(message, cause))
    }

    pub fn assert_true(&self, condition: bool, message: &str) -> Result<(), Failure> {
        if condition {
            return Ok(());
        }
        self.fail(describe(message, "expected [true] but found [false]"))
    }

    pub fn assert_false(&self, condition: bool, message: &str) -> Result<(), Failure> {
        if !condition {
            return Ok(());
        }
        self.fail(describe(message, "expected [false] but found [true]"))
    }

    pub fn assert_equals<T: PartialEq + Debug + ?Sized>(
        &self,
        actual: &T,
        expected: &T,
        message: &str,
    ) -> Result<(), Failure> {
        if actual == expected {
            return Ok(());
        }
        self.fail(describe(
            message,
            &format!("expected [{expected:?}] but found [{actual:?}]"),
        ))
    }

    pub fn assert_not_equals<T: PartialEq + Debug + ?Sized>(
        &self,
        actual: &T,
        expected: &T,
        message: &str,
    ) -> Result<(), Failure> {
        if actual != expected {
            return Ok(());
        }
        self.fail(describe(
            message,
            &format!("did not expect [{expected:?}] but found [{actual:?}]"),
        ))
    }

    pub fn assert_none<T: Debug>(&self, value: &Option<T>, message: &str) -> Result<(), Failure> {
        match value {
            None => Ok(()),
            Some(found) => self.fail(describe(
                message,
                &format!("expected [None] but found [{found:?}]"),
            )),
        }
    }

    pub fn assert_some<T>(&self, value: &Option<T>, message: &str) -> Result<(), Failure> {
        match value {
            Some(_) => Ok(()),
            None => self.fail(describe(message, "expected a value but found [None]")),
        }
    }

    /// Same referent, not merely equal values.
    pub fn assert_same<T: ?Sized>(&self, actual: &T, expected: &T, message: &str) -> Result<(), Failure> {
        if std::ptr::eq(actual, expected) {
            return Ok(());
        }
        self.fail(describe(message, "expected the same instance"))
    }

    pub fn assert_not_same<T: ?Sized>(
        &self,
        actual: &T,
        expected: &T,
        message: &str,
    ) -> Result<(), Failure> {
        if !std::ptr::eq(actual, expected) {
            return Ok(());
        }
        self.fail(describe(message, "expected different instances"))
    }

    /// Same elements with the same multiplicities, in any order.
    pub fn assert_equals_no_order<T: PartialEq + Debug>(
        &self,
        actual: &[T],
        expected: &[T],
        message: &str,
    ) -> Result<(), Failure> {
        if same_elements(actual, expected) {
            return Ok(());
        }
        self.fail(describe(
            message,
            &format!("expected [{expected:?}] in any order but found [{actual:?}]"),
        ))
    }
}

fn describe(message: &str, detail: &str) -> String {
    if message.is_empty() {
        detail.to_string()
    } else {
        format!("{message} {detail}")
    }
}

fn same_elements<T: PartialEq>(actual: &[T], expected: &[T]) -> bool {
    if actual.len() != expected.len() {
        return false;
    }
    let mut matched = vec![false; expected.len()];
    actual.iter().all(|item| {
        match (0..expected.len()).find(|&i| !matched[i] && expected[i] == *item) {
            Some(i) => {
                matched[i] = true;
                true
            }
            None => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl FailureReporter for Recorder {
        fn report(&self, failure: &Failure) {
            self.0.lock().unwrap().push(failure.message().to_string());
        }
    }

    fn recording() -> (Assertion, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        (Assertion::with_reporter(recorder.clone()), recorder)
    }

    #[test]
    fn passing_checks_report_nothing() {
        let (assertion, recorder) = recording();
        assertion.assert_true(true, "t").unwrap();
        assertion.assert_false(false, "f").unwrap();
        assertion.assert_equals(&1, &1, "eq").unwrap();
        assertion.assert_not_equals("a", "b", "ne").unwrap();
        assertion.assert_none::<u8>(&None, "none").unwrap();
        assertion.assert_some(&Some(3), "some").unwrap();
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_check_is_reported_then_returned() {
        let (assertion, recorder) = recording();
        let failure = assertion.assert_equals(&"found", &"wanted", "name").unwrap_err();
        assert_eq!(
            failure.message(),
            "name expected [\"wanted\"] but found [\"found\"]"
        );
        assert_eq!(recorder.0.lock().unwrap().as_slice(), [failure.message()]);
    }

    #[test]
    fn empty_message_leaves_only_detail() {
        let (assertion, _) = recording();
        let failure = assertion.assert_true(false, "").unwrap_err();
        assert_eq!(failure.message(), "expected [true] but found [false]");
    }

    #[test]
    fn fail_with_keeps_cause() {
        let (assertion, recorder) = recording();
        let result: Result<(), Failure> = assertion.fail_with("wrapped", std::fmt::Error);
        let failure = result.unwrap_err();
        assert!(failure.cause().is_some());
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn same_compares_identity() {
        let (assertion, _) = recording();
        let a = String::from("x");
        let b = String::from("x");
        assertion.assert_same(&a, &a, "").unwrap();
        assert!(assertion.assert_same(&a, &b, "").is_err());
        assertion.assert_not_same(&a, &b, "").unwrap();
    }

    #[test]
    fn equals_no_order_counts_duplicates() {
        let (assertion, _) = recording();
        assertion.assert_equals_no_order(&[1, 2, 2, 3], &[2, 3, 1, 2], "").unwrap();
        assert!(assertion.assert_equals_no_order(&[1, 1, 2], &[1, 2, 2], "").is_err());
        assert!(assertion.assert_equals_no_order(&[1], &[1, 1], "").is_err());
    }

    #[test]
    fn some_and_none_failures() {
        let (assertion, _) = recording();
        let failure = assertion.assert_none(&Some("x"), "leftover").unwrap_err();
        assert_eq!(failure.message(), "leftover expected [None] but found [\"x\"]");
        assert!(assertion.assert_some::<u8>(&None, "").is_err());
    }
}
