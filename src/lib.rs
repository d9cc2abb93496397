//! REST API test helpers: header recipes, a blocking JSON client that turns
//! every response into a plain envelope, and status and value verifiers that
//! report failures before returning them.

pub mod api;
pub mod config;
pub mod context;
pub mod fields;
pub mod http;
pub mod json;
pub mod logging;
pub mod session;
pub mod testing;
pub mod utils;

pub use context::TestContext;
pub use http::{HeaderSet, JsonRestClient, ResponseEnvelope};
pub use logging::Failure;
pub use testing::{Assertion, StatusVerifier};
