//! JSON HTTP API for drupdate
//!
//! Exposes manifest parsing, release lookup and manifest updates over HTTP
//! for browser front-ends. The server is built around an injected
//! `ReleaseSource`, so tests and alternative catalogs plug in without a
//! network.

pub mod api;
pub mod server;

// Re-export main types
pub use api::{ErrorResponse, ParseRequest, ParseResponse, ReleasesResponse, UpdateRequest};
pub use server::ApiServer;
