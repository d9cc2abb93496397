//! Normalization of a transport response into a [`ResponseEnvelope`]:
//!
//! ```text
//! { "status": {"code": 404, "reason": "Not Found"},
//!   "headers": {"set-cookie": ["a=1", "b=2"]},
//!   "responseBody": {...} }
//! ```

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::fields::{ApiField, RESPONSE_BODY_NON_JSON};
use crate::logging::Failure;
use crate::testing::Assertion;

pub const RESPONSE_END_DELIMITER: &str = "<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<";

/// What the normalizer needs from a transport response. Reading the body
/// consumes the response, so it can happen at most once, and dropping the
/// response releases it.
pub trait RawResponse {
    /// One-line description of the executed request.
    fn summary(&self) -> Result<String, String>;

    fn status_code(&self) -> u16;

    fn reason_phrase(&self) -> String;

    /// Every header name with its values in arrival order.
    fn header_values(&self) -> Result<IndexMap<String, Vec<String>>, String>;

    /// The entity as text, `None` when the response has no entity.
    fn read_body(self) -> Result<Option<String>, String>;
}

impl RawResponse for reqwest::blocking::Response {
    fn summary(&self) -> Result<String, String> {
        Ok(format!(
            "url={}, status={}, version={:?}",
            self.url(),
            self.status().as_u16(),
            self.version()
        ))
    }

    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    /// The phrase from the status line. hyper only records it when it
    /// differs from the canonical one.
    fn reason_phrase(&self) -> String {
        match self.extensions().get::<hyper::ext::ReasonPhrase>() {
            Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
            None => self.status().canonical_reason().unwrap_or_default().to_string(),
        }
    }

    fn header_values(&self) -> Result<IndexMap<String, Vec<String>>, String> {
        let mut headers: IndexMap<String, Vec<String>> = IndexMap::new();
        for (name, value) in self.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        Ok(headers)
    }

    fn read_body(self) -> Result<Option<String>, String> {
        let text = self
            .text()
            .map_err(|e| format!("Failed to read response: {e}"))?;
        Ok((!text.is_empty()).then_some(text))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBlock {
    pub code: u16,
    pub reason: String,
}

impl StatusBlock {
    pub fn to_json(&self) -> Value {
        let mut block = Map::new();
        block.insert(ApiField::Code.as_str().to_string(), Value::from(self.code));
        block.insert(ApiField::Reason.as_str().to_string(), Value::from(self.reason.clone()));
        Value::Object(block)
    }
}

/// Plain-value result of one call. Holds no connection or stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: StatusBlock,
    pub headers: IndexMap<String, Vec<String>>,
    /// `None` when the response had no entity, `Some(Value::Null)` when the
    /// entity looked like JSON but could not be read or parsed.
    pub response_body: Option<Value>,
}

impl ResponseEnvelope {
    pub fn status_json(&self) -> Value {
        self.status.to_json()
    }

    pub fn headers_json(&self) -> Value {
        Value::Object(
            self.headers
                .iter()
                .map(|(name, values)| {
                    let values = values.iter().cloned().map(Value::String).collect();
                    (name.clone(), Value::Array(values))
                })
                .collect(),
        )
    }

    /// Values of header `name`, matched ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.headers
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }

    /// The envelope entry stored under `field`.
    pub fn field(&self, field: ApiField) -> Option<Value> {
        match field {
            ApiField::Status => Some(self.status_json()),
            ApiField::Headers => Some(self.headers_json()),
            ApiField::ResponseBody => self.response_body.clone(),
            ApiField::Code => Some(Value::from(self.status.code)),
            ApiField::Reason => Some(Value::from(self.status.reason.clone())),
            ApiField::Message => None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut envelope = Map::new();
        envelope.insert(ApiField::Status.as_str().to_string(), self.status_json());
        envelope.insert(ApiField::Headers.as_str().to_string(), self.headers_json());
        if let Some(body) = &self.response_body {
            envelope.insert(ApiField::ResponseBody.as_str().to_string(), body.clone());
        }
        Value::Object(envelope)
    }
}

impl Display for ResponseEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Build the envelope for `response`, releasing it on every path.
pub fn normalize<R: RawResponse>(response: R, assertion: &Assertion) -> Result<ResponseEnvelope, Failure> {
    match response.summary() {
        Ok(summary) => log::info!("Request Executed: {summary}"),
        Err(e) => log::warn!("Could not describe the executed request: {e}"),
    }

    let status = StatusBlock {
        code: response.status_code(),
        reason: response.reason_phrase(),
    };
    let headers = response.header_values().map_err(|e| {
        assertion.fatal(format!(
            "Exception when attempting to read the response values: {e}"
        ))
    })?;

    let envelope = ResponseEnvelope {
        status,
        headers,
        response_body: None,
    };
    log::info!("Response Headers: {}", envelope.headers_json());

    let response_body = match response.read_body() {
        Ok(None) => None,
        Ok(Some(text)) => {
            log::info!("Response Body: {text}");
            Some(body_from_text(&text))
        }
        Err(e) => {
            log::info!("Entity could not map to a String, returning null: {e}");
            Some(Value::Null)
        }
    };
    log::info!("{RESPONSE_END_DELIMITER}");

    Ok(ResponseEnvelope {
        response_body,
        ..envelope
    })
}

/// JSON when the text starts with `[` or `{`, the non-JSON wrapper
/// otherwise, `null` when JSON-looking text does not parse.
pub fn body_from_text(text: &str) -> Value {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return serde_json::from_str(text).unwrap_or_else(|e| {
            log::info!("Entity could not be parsed as JSON, returning null: {e}");
            Value::Null
        });
    }
    let mut wrapper = Map::new();
    wrapper.insert(RESPONSE_BODY_NON_JSON.to_string(), Value::String(text.to_string()));
    Value::Object(wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;
    use test_log::test;

    struct FakeResponse {
        code: u16,
        reason: &'static str,
        headers: Vec<(&'static str, &'static str)>,
        body: Result<Option<&'static str>, &'static str>,
        broken_headers: bool,
        broken_summary: bool,
        released: Rc<Cell<usize>>,
    }

    impl FakeResponse {
        fn ok(body: Option<&'static str>) -> (Self, Rc<Cell<usize>>) {
            let released = Rc::new(Cell::new(0));
            let response = Self {
                code: 200,
                reason: "OK",
                headers: vec![("content-type", "application/json")],
                body: Ok(body),
                broken_headers: false,
                broken_summary: false,
                released: released.clone(),
            };
            (response, released)
        }
    }

    impl Drop for FakeResponse {
        fn drop(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    impl RawResponse for FakeResponse {
        fn summary(&self) -> Result<String, String> {
            if self.broken_summary {
                return Err("no context".to_string());
            }
            Ok(format!("GET http://fake -> {}", self.code))
        }

        fn status_code(&self) -> u16 {
            self.code
        }

        fn reason_phrase(&self) -> String {
            self.reason.to_string()
        }

        fn header_values(&self) -> Result<IndexMap<String, Vec<String>>, String> {
            if self.broken_headers {
                return Err("header stream closed".to_string());
            }
            let mut headers: IndexMap<String, Vec<String>> = IndexMap::new();
            for (name, value) in &self.headers {
                headers.entry(name.to_string()).or_default().push(value.to_string());
            }
            Ok(headers)
        }

        fn read_body(self) -> Result<Option<String>, String> {
            self.body
                .map(|body| body.map(str::to_string))
                .map_err(str::to_string)
        }
    }

    #[test]
    fn json_object_body_is_kept_verbatim() {
        let (response, released) = FakeResponse::ok(Some(r#"{"a":1}"#));
        let envelope = normalize(response, &Assertion::default()).unwrap();
        assert_eq!(envelope.response_body, Some(json!({"a": 1})));
        assert_eq!(envelope.status, StatusBlock { code: 200, reason: "OK".into() });
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn json_array_body_with_leading_whitespace() {
        let (response, _) = FakeResponse::ok(Some("\n  [1, 2]"));
        let envelope = normalize(response, &Assertion::default()).unwrap();
        assert_eq!(envelope.response_body, Some(json!([1, 2])));
    }

    #[test]
    fn plain_text_body_is_wrapped() {
        let (response, _) = FakeResponse::ok(Some("plain text"));
        let envelope = normalize(response, &Assertion::default()).unwrap();
        assert_eq!(
            envelope.response_body,
            Some(json!({"responseBodyNonJson": "plain text"}))
        );
    }

    #[test]
    fn malformed_json_body_becomes_null() {
        let (response, released) = FakeResponse::ok(Some("{not json"));
        let envelope = normalize(response, &Assertion::default()).unwrap();
        assert_eq!(envelope.response_body, Some(Value::Null));
        assert_eq!(envelope.to_json()["responseBody"], Value::Null);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn unreadable_body_becomes_null() {
        let (mut response, _) = FakeResponse::ok(None);
        response.body = Err("connection reset");
        let envelope = normalize(response, &Assertion::default()).unwrap();
        assert_eq!(envelope.response_body, Some(Value::Null));
    }

    #[test]
    fn no_entity_leaves_body_absent() {
        let (mut response, released) = FakeResponse::ok(None);
        response.code = 204;
        response.reason = "No Content";
        let envelope = normalize(response, &Assertion::default()).unwrap();
        assert_eq!(envelope.response_body, None);
        let json = envelope.to_json();
        assert!(json.get("responseBody").is_none());
        assert_eq!(json["status"], json!({"code": 204, "reason": "No Content"}));
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn multi_valued_headers_keep_arrival_order() {
        let (mut response, _) = FakeResponse::ok(None);
        response.headers = vec![
            ("set-cookie", "first=1"),
            ("content-type", "text/plain"),
            ("set-cookie", "second=2"),
        ];
        let envelope = normalize(response, &Assertion::default()).unwrap();
        assert_eq!(
            envelope.header("Set-Cookie"),
            Some(&["first=1".to_string(), "second=2".to_string()][..])
        );
        assert_eq!(
            envelope.headers_json(),
            json!({"set-cookie": ["first=1", "second=2"], "content-type": ["text/plain"]})
        );
    }

    #[test]
    fn header_failure_is_fatal_and_still_releases() {
        let (mut response, released) = FakeResponse::ok(Some("{}"));
        response.broken_headers = true;
        let failure = normalize(response, &Assertion::default()).unwrap_err();
        assert!(failure.message().contains("header stream closed"));
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn summary_failure_is_not_fatal() {
        let (mut response, _) = FakeResponse::ok(Some("ok"));
        response.broken_summary = true;
        assert!(normalize(response, &Assertion::default()).is_ok());
    }

    #[test]
    fn envelope_fields_use_canonical_names() {
        let (response, _) = FakeResponse::ok(Some(r#"{"id":"u1"}"#));
        let envelope = normalize(response, &Assertion::default()).unwrap();
        let json = envelope.to_json();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["status", "headers", "responseBody"]);
        assert_eq!(envelope.field(ApiField::Code), Some(json!(200)));
        assert_eq!(envelope.field(ApiField::Reason), Some(json!("OK")));
        assert_eq!(envelope.field(ApiField::ResponseBody), Some(json!({"id": "u1"})));
        assert_eq!(envelope.field(ApiField::Message), None);
        assert_eq!(
            envelope.to_string(),
            r#"{"status":{"code":200,"reason":"OK"},"headers":{"content-type":["application/json"]},"responseBody":{"id":"u1"}}"#
        );
    }
}
