//! # Session Values
//!
//! Holds values shared between related calls of one test (ids returned by a
//! create call, tokens, names). The same values fill placeholders in
//! template files.

use std::collections::HashMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::json::search_and_replace_template;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    values: HashMap<String, String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(defaults: HashMap<String, String>) -> Self {
        Self { values: defaults }
    }

    /// Merge `maps` in order; a later map overrides earlier keys.
    pub fn from_maps<I>(maps: I) -> Self
    where
        I: IntoIterator<Item = HashMap<String, String>>,
    {
        let mut session = Self::new();
        session.add_multiple_data_maps(maps);
        session
    }

    pub fn get_data(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn add_data(&mut self, values: HashMap<String, String>) {
        self.values.extend(values);
    }

    pub fn add_multiple_data_maps<I>(&mut self, maps: I)
    where
        I: IntoIterator<Item = HashMap<String, String>>,
    {
        for map in maps {
            self.add_data(map);
        }
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Replace every session key found in `template` with its value.
    pub fn render(&self, template: &str) -> String {
        search_and_replace_template(&self.values, template)
    }
}

impl Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.values).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
