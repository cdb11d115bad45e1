use std::fmt;
use std::io;

use bytes::{BufMut, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::StatusCode;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Position of a [`ResponseWriter`] in the response.
///
/// Only ever moves forward. `Complete` is reached after trailers are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    StatusLine,
    Headers,
    Body,
    Trailers,
    Complete,
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriterState::StatusLine => "STATUS_LINE",
            WriterState::Headers => "HEADERS",
            WriterState::Body => "BODY",
            WriterState::Trailers => "TRAILERS",
            WriterState::Complete => "COMPLETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("cannot {operation} in state {actual}, expected {expected}")]
    State {
        operation: &'static str,
        expected: WriterState,
        actual: WriterState,
    },

    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

/// Writes a response to `W`, refusing calls made out of order.
///
/// The legal sequence is status line, headers, then either a raw body or a
/// run of chunks closed by [`ResponseWriter::write_chunked_body_done`] and
/// optionally followed by trailers.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    inner: W,
    state: WriterState,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            state: WriterState::StatusLine,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriterError> {
        self.ensure_state("write status line", WriterState::StatusLine)?;

        let line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.inner.write_all(line.as_bytes()).await?;

        self.state = WriterState::Headers;
        Ok(())
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriterError> {
        self.ensure_state("write headers", WriterState::Headers)?;

        self.inner.write_all(&serialize_headers(headers)).await?;

        self.state = WriterState::Body;
        Ok(())
    }

    /// Writes raw body bytes with no framing. May be called repeatedly.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriterError> {
        self.ensure_state("write body", WriterState::Body)?;

        self.inner.write_all(body).await?;
        Ok(body.len())
    }

    /// Writes one chunk: uppercase hex length, CRLF, payload, CRLF.
    ///
    /// An empty chunk writes nothing, since a zero size line would end the body.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, WriterError> {
        self.ensure_state("write chunked body", WriterState::Body)?;
        if chunk.is_empty() {
            return Ok(0);
        }

        let size_line = format!("{:X}\r\n", chunk.len());
        let mut frame = BytesMut::with_capacity(size_line.len() + chunk.len() + 2);
        frame.put_slice(size_line.as_bytes());
        frame.put_slice(chunk);
        frame.put_slice(b"\r\n");

        self.inner.write_all(&frame).await?;
        Ok(frame.len())
    }

    /// Writes the zero-length terminal chunk and moves on to trailers.
    pub async fn write_chunked_body_done(&mut self) -> Result<usize, WriterError> {
        self.ensure_state("write chunked body done", WriterState::Body)?;

        const LAST_CHUNK: &[u8] = b"0\r\n";
        self.inner.write_all(LAST_CHUNK).await?;

        self.state = WriterState::Trailers;
        Ok(LAST_CHUNK.len())
    }

    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriterError> {
        self.ensure_state("write trailers", WriterState::Trailers)?;

        self.inner.write_all(&serialize_headers(trailers)).await?;

        self.state = WriterState::Complete;
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), WriterError> {
        self.inner.flush().await?;
        Ok(())
    }

    fn ensure_state(&self, operation: &'static str, expected: WriterState) -> Result<(), WriterError> {
        if self.state != expected {
            return Err(WriterError::State {
                operation,
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }
}

/// `Name: Value\r\n` per entry followed by the blank line.
fn serialize_headers(headers: &Headers) -> BytesMut {
    let mut buf = BytesMut::new();

    for (name, value) in headers.iter() {
        buf.put_slice(name.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(value.as_bytes());
        buf.put_slice(b"\r\n");
    }
    buf.put_slice(b"\r\n");

    buf
}
