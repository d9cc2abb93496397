//! # HTTP
//!
//! Header recipes, request descriptors, the blocking JSON client and the
//! response envelope it produces.

pub mod client;
pub mod headers;
pub mod method;
pub mod request;
pub mod response;

pub use client::{ClientConfig, ClientError, JsonRestClient};
pub use headers::HeaderSet;
pub use method::HttpMethod;
pub use request::RequestDescriptor;
pub use response::{RawResponse, ResponseEnvelope, StatusBlock, normalize};
