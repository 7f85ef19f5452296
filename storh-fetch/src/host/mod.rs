//! Host APIs for the StorH feed.
//!
//! - [`http`] - HTTP seam ([`HttpApi`]) and the reqwest-backed [`HttpClient`]

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::{HttpApi, HttpClient, HttpResponse, DEFAULT_TIMEOUT_SECS};
