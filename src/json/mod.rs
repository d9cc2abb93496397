//! # JSON Helpers
//!
//! Small conveniences around `serde_json` used by request builders, the
//! response normalizer and test code: text conversion, single-line logging
//! and `{{key}}`-style template files filled from a [`Session`].

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::logging::Failure;
use crate::session::Session;
use crate::testing::Assertion;
use crate::utils::read_file;

/// Plain-text form of a JSON value: strings unquoted, scalars printed,
/// containers empty.
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Join the trimmed lines of a pretty-printed document.
pub fn convert_json_to_single_line(body: &str) -> String {
    body.lines().map(str::trim).collect()
}

pub fn log_json_single_line(body: Option<&str>, preceding: &str) {
    if let Some(body) = body {
        log::info!("{preceding}{}", convert_json_to_single_line(body));
    }
}

pub fn create_empty_json() -> Value {
    Value::Object(Map::new())
}

pub fn create_empty_json_array() -> Value {
    Value::Array(Vec::new())
}

/// Parse `body`, which must hold a JSON object.
pub fn create_object_from_str(assertion: &Assertion, body: &str) -> Result<Map<String, Value>, Failure> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => assertion.fail(format!("Cannot convert String to a JSON object, not an object: {body}")),
        Err(e) => assertion.fail_with(
            format!("Cannot convert String to a JSON object. String may be malformed: {body}"),
            e,
        ),
    }
}

pub fn create_string_from_value<T: Serialize + ?Sized>(
    assertion: &Assertion,
    value: &T,
) -> Result<String, Failure> {
    serde_json::to_string(value).map_err(|e| {
        assertion.fatal_with("Cannot convert value to String. It may not represent a valid JSON", e)
    })
}

/// Replace every occurrence of each key with its value. Keys are matched
/// literally.
pub fn search_and_replace_template(pairs: &HashMap<String, String>, text: &str) -> String {
    let mut result = text.to_string();
    for (key, value) in pairs {
        if !key.is_empty() && result.contains(key.as_str()) {
            result = result.replace(key.as_str(), value);
        }
    }
    result
}

/// Read a template file and fill it from `session`. Without a session the
/// file is returned as-is.
pub fn retrieve_template_file(
    assertion: &Assertion,
    session: Option<&Session>,
    path: impl AsRef<Path>,
) -> Result<String, Failure> {
    let path = path.as_ref();
    let payload = read_file(path).map_err(|e| {
        assertion.fatal(format!(
            "Error when attempting to read from file - {}: {e}",
            path.display()
        ))
    })?;
    Ok(match session {
        Some(session) => session.render(&payload),
        None => payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_forms() {
        assert_eq!(value_as_text(&json!("abc")), "abc");
        assert_eq!(value_as_text(&json!(12)), "12");
        assert_eq!(value_as_text(&json!(1.5)), "1.5");
        assert_eq!(value_as_text(&json!(true)), "true");
        assert_eq!(value_as_text(&Value::Null), "null");
        assert_eq!(value_as_text(&json!({"a": 1})), "");
        assert_eq!(value_as_text(&json!([1])), "");
    }

    #[test]
    fn single_line_strips_indentation() {
        let pretty = "{\n  \"a\": 1,\n  \"b\": [\n    2\n  ]\n}";
        assert_eq!(convert_json_to_single_line(pretty), "{\"a\": 1,\"b\": [2]}");
    }

    #[test]
    fn object_from_str() {
        let assertion = Assertion::default();
        let object = create_object_from_str(&assertion, r#"{"id": 7}"#).unwrap();
        assert_eq!(object["id"], json!(7));
        assert!(create_object_from_str(&assertion, "[1, 2]").is_err());
        let failure = create_object_from_str(&assertion, "{oops").unwrap_err();
        assert!(failure.message().contains("{oops"));
        assert!(failure.cause().is_some());
    }

    #[test]
    fn string_from_value() {
        let assertion = Assertion::default();
        assert_eq!(
            create_string_from_value(&assertion, &json!({"k": "v"})).unwrap(),
            r#"{"k":"v"}"#
        );
        assert_eq!(create_empty_json().to_string(), "{}");
        assert_eq!(create_empty_json_array().to_string(), "[]");
    }

    #[test]
    fn template_replacement_is_literal() {
        let mut pairs = HashMap::new();
        pairs.insert("$guestId$".to_string(), "G-1".to_string());
        pairs.insert("{{site}}".to_string(), "wdw".to_string());
        pairs.insert(String::new(), "ignored".to_string());
        let rendered = search_and_replace_template(
            &pairs,
            r#"{"guest": "$guestId$", "again": "$guestId$", "site": "{{site}}"}"#,
        );
        assert_eq!(rendered, r#"{"guest": "G-1", "again": "G-1", "site": "wdw"}"#);
    }

    #[test]
    fn template_file_with_and_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json");
        std::fs::write(&path, r#"{"name": "$name$"}"#).unwrap();
        let assertion = Assertion::default();

        let mut session = Session::new();
        session.set_data("$name$", "MICKEY");
        assert_eq!(
            retrieve_template_file(&assertion, Some(&session), &path).unwrap(),
            r#"{"name": "MICKEY"}"#
        );
        assert_eq!(
            retrieve_template_file(&assertion, None, &path).unwrap(),
            r#"{"name": "$name$"}"#
        );
        assert!(retrieve_template_file(&assertion, None, dir.path().join("missing.json")).is_err());
    }
}
