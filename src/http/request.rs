use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Error;
use crate::http::buffer::ReadBuffer;
use crate::http::headers::Headers;
use crate::http::parser::{ParseError, RequestParser};

/// The first line of a request: `METHOD SP TARGET SP HTTP/1.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// Uppercase ASCII letters only
    pub method: String,
    /// Path as sent by the client, not decoded
    pub request_target: String,
    /// Always "1.1"
    pub http_version: String,
}

/// A fully parsed request head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: Headers,
}

impl Request {
    /// Reads and parses one request head from `reader`.
    ///
    /// Bytes are pulled into a small buffer that doubles when full, so the
    /// result does not depend on how the stream fragments its data. Running
    /// out of input before the blank line ending the headers is an error.
    pub async fn from_reader<R>(reader: &mut R) -> Result<Request, Error>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = ReadBuffer::default();
        let mut parser = RequestParser::new();

        while !parser.is_done() {
            let n = reader.read(buf.spare_mut()).await?;
            if n == 0 {
                return Err(ParseError::IncompleteRequest.into());
            }
            buf.advance(n);

            let consumed = parser.parse(buf.filled())?;
            buf.consume(consumed);
        }

        Ok(parser.finish()?)
    }

    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.request_target
    }

    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}
