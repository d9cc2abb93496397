//! # Test context
//!
//! Per-test named values plus the shared configuration, failure reporter and
//! random source. Pass one `TestContext` through a test instead of reaching
//! for process-wide state.
//!
//! A data pool is a global holding a stack of strings, filled once from a
//! file and drawn from by [`TestContext::take_from_pool`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::http::{ClientConfig, JsonRestClient};
use crate::json::value_as_text;
use crate::logging::{Failure, FailureReporter, LogReporter};
use crate::testing::{Assertion, StatusVerifier};
use crate::utils::random::Randomizer;
use crate::utils::read_file;

const ENVIRONMENT: &str = "environment";
const DOMAIN: &str = "domain";

#[derive(Clone)]
pub struct TestContext {
    config: Arc<Config>,
    globals: HashMap<String, Value>,
    reporter: Arc<dyn FailureReporter>,
    randomizer: Arc<Randomizer>,
    client_config: ClientConfig,
}

impl std::fmt::Debug for TestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestContext")
            .field("config", &self.config)
            .field("globals", &self.globals)
            .field("client_config", &self.client_config)
            .finish_non_exhaustive()
    }
}

impl TestContext {
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_reporter(config, Arc::new(LogReporter))
    }

    pub fn with_reporter(config: Arc<Config>, reporter: Arc<dyn FailureReporter>) -> Self {
        Self {
            config,
            globals: HashMap::new(),
            reporter,
            randomizer: Arc::new(Randomizer::new()),
            client_config: ClientConfig::default(),
        }
    }

    pub fn set_randomizer(&mut self, randomizer: Arc<Randomizer>) {
        self.randomizer = randomizer;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn randomizer(&self) -> &Randomizer {
        &self.randomizer
    }

    pub fn set_global(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.globals.insert(key.into(), value.into());
    }

    pub fn global(&self, key: &str) -> Option<&Value> {
        self.globals.get(key)
    }

    pub fn remove_global(&mut self, key: &str) -> Option<Value> {
        self.globals.remove(key)
    }

    pub fn set_environment(&mut self, environment: &str) {
        self.set_global(ENVIRONMENT, environment);
    }

    pub fn environment(&self) -> Option<&str> {
        self.global(ENVIRONMENT).and_then(Value::as_str)
    }

    pub fn set_domain(&mut self, domain: &str) {
        self.set_global(DOMAIN, domain);
    }

    pub fn domain(&self) -> Option<&str> {
        self.global(DOMAIN).and_then(Value::as_str)
    }

    /// Fill the pool `key` with the trimmed, non-blank lines of `path`. A key
    /// that already holds a value is left alone, so the file is read once.
    pub fn load_pool_from_file(&mut self, key: &str, path: impl AsRef<Path>) -> Result<(), Failure> {
        if self.globals.contains_key(key) {
            return Ok(());
        }
        let path = path.as_ref();
        let raw = read_file(path).map_err(|e| {
            self.assertion().fatal(format!(
                "Error when attempting to read from file path: {}: {e}",
                path.display()
            ))
        })?;
        let items: Vec<Value> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Value::from)
            .collect();
        log::info!("Data pool `{key}` loaded with {} items from {}", items.len(), path.display());
        self.globals.insert(key.to_string(), Value::Array(items));
        Ok(())
    }

    /// Pop `count` items off the pool `key`, last line first. Nothing is
    /// taken when the pool holds fewer than `count`.
    pub fn take_from_pool(&mut self, key: &str, count: usize) -> Result<Vec<String>, Failure> {
        let assertion = self.assertion();
        let Some(Value::Array(pool)) = self.globals.get_mut(key) else {
            return assertion.fail(format!("No data pool stored under key `{key}`"));
        };
        if pool.len() < count {
            return assertion.fail(format!(
                "Data pool `{key}` is exhausted: {count} requested, {} left",
                pool.len()
            ));
        }
        let items: Vec<String> = pool
            .drain(pool.len() - count..)
            .rev()
            .map(|item| value_as_text(&item))
            .collect();
        for item in &items {
            log::info!("Item retrieved: {item}");
        }
        Ok(items)
    }

    /// [`Self::load_pool_from_file`] then [`Self::take_from_pool`].
    pub fn retrieve_data_via_file(
        &mut self,
        key: &str,
        path: impl AsRef<Path>,
        count: usize,
    ) -> Result<Vec<String>, Failure> {
        self.load_pool_from_file(key, path)?;
        self.take_from_pool(key, count)
    }

    /// An [`Assertion`] reporting through this context's reporter.
    pub fn assertion(&self) -> Assertion {
        Assertion::with_reporter(Arc::clone(&self.reporter))
    }

    pub fn verifier(&self) -> StatusVerifier {
        StatusVerifier::new(self.assertion())
    }

    /// Transport settings given to every client this context hands out.
    pub fn set_client_config(&mut self, config: ClientConfig) {
        self.client_config = config;
    }

    /// A fresh client with an empty header set.
    pub fn client(&self) -> JsonRestClient {
        let mut client = JsonRestClient::with_assertion(self.assertion());
        client.set_config(self.client_config.clone());
        client
    }
}
