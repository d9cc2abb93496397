//! Status-line and JSON-pointer verification against a normalized envelope.
//!
//! A status block looks like `{"code": 404, "reason": "Not Found"}`.

use serde_json::Value;

use super::Assertion;
use crate::fields::{ApiField, StatusReason};
use crate::json::value_as_text;
use crate::logging::Failure;

#[derive(Debug, Clone, Default)]
pub struct StatusVerifier {
    assertion: Assertion,
}

impl StatusVerifier {
    pub fn new(assertion: Assertion) -> Self {
        Self { assertion }
    }

    /// Fail unless `status_block` carries exactly `code` and `reason`
    /// (reason compared case-sensitively).
    pub fn verify_http_response_status(
        &self,
        status_block: Option<&Value>,
        code: u16,
        reason: &str,
    ) -> Result<(), Failure> {
        let Some(block) = status_block else {
            return self.assertion.fail(format!(
                "Status block is null. Expected - Code = {code} / Message = {reason}"
            ));
        };
        let Some((code_found, reason_found)) = extract_status(block) else {
            return self
                .assertion
                .fail(format!("Status block is incorrectly formatted - {block}"));
        };
        if reason_found != reason || code_found != i64::from(code) {
            return self.assertion.fail(format!(
                "Status code/reason do not match. Expected - {code} {reason} / Found - {code_found} {reason_found}"
            ));
        }
        Ok(())
    }

    pub fn validate_status(&self, status_block: Option<&Value>, expected: StatusReason) -> Result<(), Failure> {
        self.verify_http_response_status(status_block, expected.code(), expected.reason())
    }

    pub fn validate_status_ok(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::Ok)
    }

    pub fn validate_status_created(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::Created)
    }

    pub fn validate_status_accepted(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::Accepted)
    }

    pub fn validate_status_no_content(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::NoContent)
    }

    pub fn validate_status_bad_request(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::BadRequest)
    }

    pub fn validate_status_unauthorized(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::Unauthorized)
    }

    pub fn validate_status_forbidden(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::Forbidden)
    }

    pub fn validate_status_not_found(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::NotFound)
    }

    pub fn validate_status_method_not_allowed(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::MethodNotAllowed)
    }

    pub fn validate_status_conflict(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::Conflict)
    }

    pub fn validate_status_precondition_failed(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::PreconditionFailed)
    }

    pub fn validate_status_internal_server_error(&self, status_block: Option<&Value>) -> Result<(), Failure> {
        self.validate_status(status_block, StatusReason::InternalServerError)
    }

    /// Parse `response` and compare the value at `pointer` with `expected`,
    /// ignoring case. A pointer that resolves to nothing reads as `""`.
    pub fn validate_value_as_per_json_path(
        &self,
        response: &str,
        expected: &str,
        pointer: &str,
    ) -> Result<(), Failure> {
        let document: Value = serde_json::from_str(response).map_err(|e| {
            self.assertion
                .fatal_with(format!("Response is not valid JSON: {response}"), e)
        })?;
        self.validate_value_at(&document, expected, pointer)
    }

    /// Same as [`Self::validate_value_as_per_json_path`] on an already parsed
    /// document. A pointer other than `""` that does not start with `/` is
    /// malformed and fails.
    pub fn validate_value_at(&self, document: &Value, expected: &str, pointer: &str) -> Result<(), Failure> {
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return self
                .assertion
                .fail(format!("Invalid JSON pointer ({pointer}), it must start with '/'"));
        }
        let actual = document.pointer(pointer).map(value_as_text).unwrap_or_default();
        if expected.to_lowercase() != actual.to_lowercase() {
            return self.assertion.fail(format!(
                "Expected Value ({expected}) != Actual Value ({actual})"
            ));
        }
        log::info!("Path - {pointer} - verified to match.");
        Ok(())
    }
}

fn extract_status(block: &Value) -> Option<(i64, String)> {
    let code = match block.get(ApiField::Code.as_str())? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    let reason = match block.get(ApiField::Reason.as_str())? {
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
        other => value_as_text(other),
    };
    Some((code, reason))
}
