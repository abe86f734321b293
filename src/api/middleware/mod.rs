//! HTTP middleware: API key check, request ids, tracing, panic recovery and
//! CORS.

pub mod auth;
pub mod cors;
pub mod recovery;
pub mod request_id;
pub mod tracing;
