//! Networking: wire records, request payloads and the REST clients.
//!
//! SYSTEM CONTEXT
//! ==============
//! `types` mirrors the server's JSON, `payload` builds allow-listed request
//! bodies, and `api` performs the calls.

pub mod api;
pub mod payload;
pub mod types;
