use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE as CONTENT_TYPE_HEADER, HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use serde_json::Value;

use super::headers::{APPLICATION_JSON, HeaderSet};
use super::method::HttpMethod;
use super::request::RequestDescriptor;
use super::response::{RawResponse, ResponseEnvelope, normalize};
use crate::json::{log_json_single_line, value_as_text};
use crate::logging::Failure;
use crate::testing::Assertion;

pub const REQUEST_START_DELIMITER: &str = ">>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to build HTTP client")]
    Build(#[source] reqwest::Error),

    #[error("Request failed")]
    Transport(#[source] reqwest::Error),
}

/// Transport settings applied when the underlying client is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Option<Duration>,
    pub max_redirects: usize,
    pub accept_invalid_certs: bool,
    pub use_system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            max_redirects: 10,
            accept_invalid_certs: false,
            use_system_proxy: true,
        }
    }
}

/// JSON REST client: holds the header set and media type used for every
/// request it builds, dispatches blocking calls and normalizes responses.
#[derive(Debug, Clone)]
pub struct JsonRestClient {
    headers: HeaderSet,
    media_type: String,
    config: ClientConfig,
    assertion: Assertion,
}

impl Default for JsonRestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRestClient {
    pub fn new() -> Self {
        Self::with_assertion(Assertion::default())
    }

    pub fn with_assertion(assertion: Assertion) -> Self {
        Self {
            headers: HeaderSet::new(),
            media_type: APPLICATION_JSON.to_string(),
            config: ClientConfig::default(),
            assertion,
        }
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Direct access for the header recipes.
    pub fn headers_mut(&mut self) -> &mut HeaderSet {
        &mut self.headers
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    /// Clear the headers and take all of `entries`.
    pub fn set_headers<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.set_all(entries);
    }

    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    /// `Content-Type` set to the client's current media type.
    pub fn add_header_content_type_json(&mut self) -> &mut HeaderSet {
        self.headers.content_type(&self.media_type)
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn set_media_type(&mut self, media_type: impl Into<String>) {
        self.media_type = media_type.into();
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: ClientConfig) {
        self.config = config;
    }

    pub fn assertion(&self) -> &Assertion {
        &self.assertion
    }

    /// Describe a call to `domain` + `resource` with the current headers.
    pub fn build_request(&self, domain: &str, resource: &str, query_params: Option<&Value>) -> RequestDescriptor {
        log::info!("{REQUEST_START_DELIMITER}");
        let request = RequestDescriptor::new(domain, resource, query_params, &self.headers, &self.media_type);
        if !self.headers.is_empty() {
            log::info!("Request Headers: {}", self.headers_to_string());
        }
        request
    }

    pub fn headers_to_string(&self) -> String {
        self.headers.to_string()
    }

    pub fn log_request_body(&self, body: &str) {
        log_json_single_line(Some(body), "Request Body: ");
    }

    pub fn build_comma_separated_string<S: AsRef<str>>(&self, list: &[S]) -> String {
        list.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",")
    }

    /// `;k=v;k2=v2` from the fields of a JSON object. Containers as values
    /// are rejected.
    pub fn build_semicolon_separated_query_params(&self, params: Option<&Value>) -> Result<String, Failure> {
        let Some(Value::Object(fields)) = params else {
            return Ok(String::new());
        };
        let mut list = String::new();
        for (key, value) in fields {
            if value.is_array() || value.is_object() {
                return self.assertion.fail(format!(
                    "Failure when attempting to convert query parameter `{key}` to text: {value}"
                ));
            }
            list.push_str(&format!(";{key}={}", value_as_text(value)));
        }
        Ok(list)
    }

    pub fn get(&self, request: &RequestDescriptor) -> Result<ResponseEnvelope, Failure> {
        self.send(HttpMethod::Get, request, None)
    }

    pub fn delete(&self, request: &RequestDescriptor) -> Result<ResponseEnvelope, Failure> {
        self.send(HttpMethod::Delete, request, None)
    }

    pub fn post(&self, request: &RequestDescriptor, body: &str) -> Result<ResponseEnvelope, Failure> {
        self.send(HttpMethod::Post, request, Some(body))
    }

    pub fn put(&self, request: &RequestDescriptor, body: &str) -> Result<ResponseEnvelope, Failure> {
        self.send(HttpMethod::Put, request, Some(body))
    }

    pub fn patch(&self, request: &RequestDescriptor, body: &str) -> Result<ResponseEnvelope, Failure> {
        self.send(HttpMethod::Patch, request, Some(body))
    }

    /// Dispatch `request` and normalize the response. Any transport problem
    /// is fatal; nothing is retried.
    pub fn send(
        &self,
        method: HttpMethod,
        request: &RequestDescriptor,
        body: Option<&str>,
    ) -> Result<ResponseEnvelope, Failure> {
        let response = self.dispatch(method, request, body).map_err(|e| {
            self.assertion.fatal_with(
                format!("{method} {}{} could not be executed", request.domain, request.resource),
                e,
            )
        })?;
        self.format_response(response)
    }

    fn dispatch(
        &self,
        method: HttpMethod,
        request: &RequestDescriptor,
        body: Option<&str>,
    ) -> Result<reqwest::blocking::Response, ClientError> {
        let url = request.url()?;
        let mut headers = build_headers(request)?;
        let client = self.http_client()?;

        let mut builder = client.request(method.into(), url);
        if let Some(body) = body.filter(|_| method.carries_body()) {
            if !headers.contains_key(CONTENT_TYPE_HEADER) {
                let media_type = HeaderValue::from_str(&request.media_type).map_err(|e| {
                    ClientError::InvalidHeader {
                        name: CONTENT_TYPE_HEADER.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                headers.insert(CONTENT_TYPE_HEADER, media_type);
            }
            self.log_request_body(body);
            builder = builder.body(body.to_string());
        }

        builder.headers(headers).send().map_err(ClientError::Transport)
    }

    fn http_client(&self) -> Result<Client, ClientError> {
        let mut builder = Client::builder().redirect(Policy::limited(self.config.max_redirects));
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        if self.config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if !self.config.use_system_proxy {
            builder = builder.no_proxy();
        }
        builder.build().map_err(ClientError::Build)
    }

    /// Normalize a response obtained outside [`Self::send`].
    pub fn format_response<R: RawResponse>(&self, response: R) -> Result<ResponseEnvelope, Failure> {
        normalize(response, &self.assertion)
    }
}

/// Every snapshot entry is appended, so names that differ only in case are
/// all sent.
fn build_headers(request: &RequestDescriptor) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &request.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| ClientError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        headers.append(header_name, header_value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::{APPLICATION_FORM_URLENCODED, CONTENT_TYPE};
    use serde_json::json;

    #[test]
    fn content_type_recipe_follows_media_type() {
        let mut client = JsonRestClient::new();
        client.add_header_content_type_json();
        assert_eq!(client.headers().value(CONTENT_TYPE), Some("application/json"));

        client.set_media_type("application/vnd.api+json");
        client.add_header_content_type_json();
        assert_eq!(client.headers().value(CONTENT_TYPE), Some("application/vnd.api+json"));
        assert_eq!(client.headers().len(), 1);
    }

    #[test]
    fn set_headers_replaces_previous_set() {
        let mut client = JsonRestClient::new();
        client.headers_mut().accept_json().guest_id("g");
        client.set_headers([("Only", "one")]);
        assert_eq!(client.headers_to_string(), "{Only=one}");
        client.clear_headers();
        assert_eq!(client.headers_to_string(), "{}");
    }

    #[test]
    fn build_request_snapshots_headers_and_media_type() {
        let mut client = JsonRestClient::new();
        client.headers_mut().content_type_form_urlencoded();
        let request = client.build_request("http://localhost", "/api/users", Some(&json!({"page": 1})));
        client.headers_mut().authorization_bearer("late");

        assert_eq!(request.headers.get(CONTENT_TYPE).map(String::as_str), Some(APPLICATION_FORM_URLENCODED));
        assert!(!request.headers.contains_key("Authorization"));
        assert_eq!(request.query, vec![("page".to_string(), "1".to_string())]);
        assert_eq!(request.media_type, "application/json");
    }

    #[test]
    fn comma_separated() {
        let client = JsonRestClient::new();
        assert_eq!(client.build_comma_separated_string(&["a", "b", "c"]), "a,b,c");
        assert_eq!(client.build_comma_separated_string::<&str>(&[]), "");
    }

    #[test]
    fn semicolon_query_params() {
        let client = JsonRestClient::new();
        let params = json!({"lang": "en", "page": 2});
        assert_eq!(
            client.build_semicolon_separated_query_params(Some(&params)).unwrap(),
            ";lang=en;page=2"
        );
        assert_eq!(client.build_semicolon_separated_query_params(None).unwrap(), "");
        assert!(client
            .build_semicolon_separated_query_params(Some(&json!({"nested": {"a": 1}})))
            .is_err());
    }

    #[test]
    fn case_distinct_names_are_all_kept() {
        let mut client = JsonRestClient::new();
        client.set_header("X-Trace", "one");
        client.set_header("x-trace", "two");
        let request = client.build_request("http://localhost", "/", None);

        let headers = build_headers(&request).unwrap();
        let values: Vec<_> = headers.get_all("x-trace").iter().collect();
        assert_eq!(values, ["one", "two"]);
    }

    #[test]
    fn invalid_header_is_reported_at_dispatch() {
        let mut client = JsonRestClient::new();
        client.set_header("Bad Header", "x");
        let request = client.build_request("http://127.0.0.1:9", "/", None);
        let failure = client.get(&request).unwrap_err();
        assert!(failure.message().starts_with("GET http://127.0.0.1:9/"));
        assert!(failure.cause().unwrap().to_string().contains("Bad Header"));
    }

    #[test]
    fn malformed_domain_is_fatal() {
        let client = JsonRestClient::new();
        let request = client.build_request("no scheme here", "/x", None);
        let failure = client.delete(&request).unwrap_err();
        assert!(matches!(
            failure.cause().and_then(|c| c.downcast_ref::<ClientError>()),
            Some(ClientError::InvalidUrl { .. })
        ));
    }
}
