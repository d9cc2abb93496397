use std::fmt::{self, Display};

use indexmap::IndexMap;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const GATEWAY_AUTHORIZATION: &str = "x-authorization-gc";
pub const ACCEPT: &str = "Accept";
pub const ACCEPT_LANGUAGE: &str = "Accept-Language";
pub const CONNECTION: &str = "Connection";
pub const CACHE_CONTROL: &str = "Cache-Control";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONVERSATION_ID: &str = "X-Conversation-Id";
pub const ENTITLEMENTS: &str = "X-Entitlements";
pub const SOURCE_APPL_ID: &str = "source-appl-id";
pub const INTERNAL_SITE: &str = "X-Disney-Internal-Site";
pub const GUEST_ID: &str = "X-Guest-ID";
pub const MESSAGE_ID: &str = "messageId";

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Request headers in insertion order. Names are kept exactly as given;
/// setting an existing name replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: IndexMap<String, String>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Replace the whole set with `entries`.
    pub fn set_all<I, K, V>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.clear();
        for (name, value) in entries {
            self.entries.insert(name.into(), value.into());
        }
        self
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `Content-Type: <media_type>`.
    pub fn content_type(&mut self, media_type: &str) -> &mut Self {
        self.set(CONTENT_TYPE, media_type)
    }

    pub fn content_type_form_urlencoded(&mut self) -> &mut Self {
        self.set(CONTENT_TYPE, APPLICATION_FORM_URLENCODED)
    }

    pub fn authorization_bearer(&mut self, token: &str) -> &mut Self {
        self.set(AUTHORIZATION, format!("BEARER {token}"))
    }

    pub fn authorization_api_key(&mut self, token: &str) -> &mut Self {
        self.set(AUTHORIZATION, format!("APIKEY {token}"))
    }

    pub fn gateway_authorization_api_key(&mut self, token: &str) -> &mut Self {
        self.set(GATEWAY_AUTHORIZATION, format!("APIKEY {token}"))
    }

    pub fn accept_language(&mut self, lang: &str) -> &mut Self {
        self.set(ACCEPT_LANGUAGE, lang)
    }

    pub fn accept_json(&mut self) -> &mut Self {
        self.set(ACCEPT, APPLICATION_JSON)
    }

    pub fn connection_keep_alive(&mut self) -> &mut Self {
        self.set(CONNECTION, "keep-alive")
    }

    pub fn cache_control(&mut self, directive: &str) -> &mut Self {
        self.set(CACHE_CONTROL, directive)
    }

    pub fn content_length(&mut self, length: &str) -> &mut Self {
        self.set(CONTENT_LENGTH, length)
    }

    pub fn conversation_id(&mut self, id: &str) -> &mut Self {
        self.set(CONVERSATION_ID, id)
    }

    pub fn entitlements(&mut self) -> &mut Self {
        self.set(ENTITLEMENTS, "true")
    }

    pub fn source_appl_id(&mut self, id: &str) -> &mut Self {
        self.set(SOURCE_APPL_ID, id)
    }

    /// Site code, e.g. `wdw` or `dlr`.
    pub fn internal_site(&mut self, site: &str) -> &mut Self {
        self.set(INTERNAL_SITE, site)
    }

    pub fn guest_id(&mut self, id: &str) -> &mut Self {
        self.set(GUEST_ID, id)
    }

    pub fn message_id(&mut self, id: &str) -> &mut Self {
        self.set(MESSAGE_ID, id)
    }
}

/// `{name=value, name2=value2}`, or `{}` when empty.
impl Display for HeaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .entries
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}
