use indexmap::IndexMap;
use reqwest::Url;
use serde_json::Value;

use super::client::ClientError;
use super::headers::HeaderSet;
use crate::json::value_as_text;

/// Everything needed to dispatch one call. Built fresh per call; the headers
/// are a copy of the client's set at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub domain: String,
    pub resource: String,
    pub query: Vec<(String, String)>,
    pub headers: IndexMap<String, String>,
    pub media_type: String,
}

impl RequestDescriptor {
    pub fn new(
        domain: &str,
        resource: &str,
        query_params: Option<&Value>,
        headers: &HeaderSet,
        media_type: &str,
    ) -> Self {
        Self {
            domain: domain.to_string(),
            resource: resource.to_string(),
            query: query_pairs(query_params),
            headers: headers.get().clone(),
            media_type: media_type.to_string(),
        }
    }

    /// `domain` joined with `resource`, plus the query string. Nothing is
    /// validated before this point.
    pub fn url(&self) -> Result<Url, ClientError> {
        let base = self.domain.trim_end_matches('/');
        let path = self.resource.trim_start_matches('/');
        let raw = if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        };

        let mut url = Url::parse(&raw).map_err(|e| ClientError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

/// One `(name, text)` pair per field of a JSON object, in document order.
/// Anything other than an object yields no parameters.
pub fn query_pairs(params: Option<&Value>) -> Vec<(String, String)> {
    match params {
        Some(Value::Object(fields)) => fields
            .iter()
            .map(|(key, value)| (key.clone(), value_as_text(value)))
            .collect(),
        _ => Vec::new(),
    }
}
