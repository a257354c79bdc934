//! REST surface
//!
//! - `endpoints`: verb, path and auth class per operation
//! - `request`: pure request construction and signing
//! - `client`: `RestClient` façade on reqwest

pub mod client;
pub mod endpoints;
pub mod request;

pub use client::{create_http_client, KlineQuery, ListOrdersQuery, RawResponse, RestClient};
pub use endpoints::{Auth, Endpoint};
pub use request::{RequestBuilder, RestRequest};
