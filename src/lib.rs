//! minihttp - static file server with virtual hosts
//!
//! Core library: HTTP/1.1 request framing and parsing, the per-connection
//! state machine, and static file serving.

pub mod config;
pub mod http;
pub mod server;
pub mod site;
