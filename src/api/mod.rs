//! # Endpoint wrappers and business helpers
//!
//! [`CommonBaseApi`] issues the raw calls; [`UserLib`] is what a test uses,
//! adding the status checks on top.

use crate::config::URL_API_USERS;
use crate::context::TestContext;
use crate::http::{JsonRestClient, ResponseEnvelope};
use crate::logging::Failure;

pub const USERS_RESOURCE: &str = "/api/users";

/// Thin wrapper over the users service.
#[derive(Debug, Clone)]
pub struct CommonBaseApi {
    client: JsonRestClient,
    base_url: String,
}

impl CommonBaseApi {
    pub fn new(client: JsonRestClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Base URL from [`URL_API_USERS`]; missing configuration is fatal.
    pub fn from_context(ctx: &TestContext) -> Result<Self, Failure> {
        let assertion = ctx.assertion();
        let base_url = ctx
            .config()
            .require(URL_API_USERS)
            .map_err(|e| assertion.fatal_with("Users API base URL is not configured", e))?;
        let mut client = ctx.client();
        client.headers_mut().accept_json();
        Ok(Self::new(client, base_url))
    }

    pub fn client_mut(&mut self) -> &mut JsonRestClient {
        &mut self.client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/users`.
    pub fn request_users_data(&self) -> Result<ResponseEnvelope, Failure> {
        let request = self.client.build_request(&self.base_url, USERS_RESOURCE, None);
        self.client.get(&request)
    }
}

pub struct UserLib;

impl UserLib {
    /// Fetch the users list and fail unless the service answered `200 OK`.
    pub fn get_users_details(ctx: &TestContext) -> Result<ResponseEnvelope, Failure> {
        let api = CommonBaseApi::from_context(ctx)?;
        let response = api.request_users_data()?;
        ctx.verifier().validate_status_ok(Some(&response.status_json()))?;
        Ok(response)
    }
}
