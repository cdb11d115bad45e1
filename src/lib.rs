//! httpfromtcp - HTTP/1.1 over raw TCP
//!
//! Incremental request parsing, an ordered response writer with chunked
//! encoding and trailers, and a task-per-connection server.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod server;
