//! HTTP API for in-place list editing.
//!
//! Serves one update-field endpoint per plugin instance and translates
//! between JSON bodies and the field update service.

pub mod handlers;
pub mod router;
pub mod server;
