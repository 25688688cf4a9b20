/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and unified adapter errors
[POS]:    HTTP layer - REST communication primitives
[UPDATE]: When changing client behavior or error sources
*/

pub mod client;
pub mod error;

pub use error::{AdapterError, Result};

pub use client::{ClientConfig, JsonClient, RawResponse};
