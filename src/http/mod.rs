//! HTTP protocol implementation.
//!
//! A restricted HTTP/1.1 server: `GET` only, `HTTP/1.1` only, no request
//! bodies, pipelined requests on kept-alive connections.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection state machine
//! - **`parser`**: Frame detection and request parsing
//! - **`request`**: The validated request type and header name canonicalization
//! - **`response`**: Responses for the fixed status set, with a builder
//! - **`writer`**: Serializes and writes responses to the client
//! - **`handler`**: The trait a connection dispatches parsed requests to
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │   AwaitingData   │ ← read until the idle deadline
//!        └──────┬───────────┘
//!               │ bytes appended      (timeout: 400 if bytes pending, else Closed;
//!               ▼                      end of stream / read error: Closed)
//!        ┌──────────────────┐
//!        │ ExtractingFrames │ ← look for "\r\n\r\n" in the buffer
//!        └──────┬───────────┘
//!               │ frame split off     (no frame: back to AwaitingData)
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← parse error: 400, otherwise ask the handler
//!        └──────┬───────────┘
//!               │ response ready
//!               ▼
//!        ┌──────────────────┐
//!        │     Writing      │ ← send response
//!        └──────┬───────────┘
//!               ├─ Connection: close → Closed
//!               └─ otherwise → refresh deadline, ExtractingFrames
//! ```
//!
//! # Example
//!
//! ```ignore
//! use minihttp::config::ServerConfig;
//! use minihttp::http::connection::Connection;
//! use minihttp::site::{StaticFiles, VirtualHosts};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let handler = Arc::new(StaticFiles::new(VirtualHosts::default(), false));
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, handler, ServerConfig::default());
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod handler;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
