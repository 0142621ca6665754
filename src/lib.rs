//! `steady-http` is a resilient async HTTP API client.
//!
//! The crate wraps `reqwest` behind one primitive,
//! [`ApiClient::api_request`], which joins a path against the client's base
//! URL, applies a transport-level retry policy, validates the response
//! status and returns one of three response shapes (raw, text or JSON).
//! [`ItemService`] layers a token-authenticated login/add/get flow on top.

mod client;
mod error;
mod options;
mod request;
mod response;
mod service;

pub use client::ApiClient;
pub use error::ApiError;
pub use options::{ClientOptions, RetryPolicy};
pub use request::{FilePart, Method, RequestSpec};
pub use response::{status_code_20x, RawResponse, ResponseShape, ResponseType};
pub use service::ItemService;

pub type Result<T> = std::result::Result<T, ApiError>;
