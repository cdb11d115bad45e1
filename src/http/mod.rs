//! HTTP/1.1 protocol implementation.
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`headers`**: Header map with case-insensitive names and line-at-a-time parsing
//! - **`parser`**: Incremental request parser state machine
//! - **`buffer`**: Growable read buffer feeding the parser
//! - **`request`**: Parsed request and the stream-driven read loop
//! - **`response`**: Status codes and default response headers
//! - **`writer`**: Ordered response writer with chunked encoding and trailers
//! - **`connection`**: One request/response exchange over a single stream
//!
//! # Request Parser State Machine
//!
//! ```text
//!        ┌─────────────────┐
//!        │   Initialized   │ ← Wait for the request line
//!        └───────┬─────────┘
//!                │ Request line parsed
//!                ▼
//!        ┌─────────────────┐
//!        │ ParsingHeaders  │ ← One header line per step
//!        └───────┬─────────┘
//!                │ Blank line
//!                ▼
//!        ┌─────────────────┐
//!        │      Done       │
//!        └─────────────────┘
//! ```
//!
//! # Response Writer State Machine
//!
//! ```text
//!   StatusLine → Headers → Body ─┬─ write_body / write_chunked_body (repeatable)
//!                                └─ write_chunked_body_done → Trailers → Complete
//! ```
//!
//! # Example
//!
//! ```ignore
//! use httpfromtcp::http::request::Request;
//! use httpfromtcp::http::response::{default_headers, StatusCode};
//! use httpfromtcp::http::writer::ResponseWriter;
//!
//! let (mut reader, writer) = tokio::io::split(socket);
//! let request = Request::from_reader(&mut reader).await?;
//!
//! let body = format!("you asked for {}", request.target());
//! let mut w = ResponseWriter::new(writer);
//! w.write_status_line(StatusCode::Ok).await?;
//! w.write_headers(&default_headers(body.len())).await?;
//! w.write_body(body.as_bytes()).await?;
//! ```

pub mod buffer;
pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
