//! Relays an upstream plain-HTTP response as a chunked body with trailers.

use anyhow::{Context, Result};
use bytes::{Buf, BytesMut};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use url::Url;

use crate::http::headers::Headers;
use crate::http::response::{default_headers, StatusCode};
use crate::http::writer::ResponseWriter;

/// Largest chunk relayed to the client
pub const MAX_CHUNK_SIZE: usize = 1024;

const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Trailer carrying the number of body bytes relayed
pub const CONTENT_LENGTH_TRAILER: &str = "X-Content-Length";

/// Trailer carrying the lowercase hex SHA-256 of the relayed body
pub const SHA256_TRAILER: &str = "X-Content-SHA256";

/// An open upstream response positioned at the start of its body.
pub struct UpstreamBody {
    stream: TcpStream,
    /// Body bytes read along with the response head
    pending: BytesMut,
}

impl UpstreamBody {
    /// Next slice of at most [`MAX_CHUNK_SIZE`] body bytes, `None` at EOF.
    async fn next_chunk(&mut self) -> Result<Option<BytesMut>> {
        if self.pending.is_empty() {
            self.pending.reserve(MAX_CHUNK_SIZE);
            let n = self.stream.read_buf(&mut self.pending).await?;
            if n == 0 {
                return Ok(None);
            }
        }

        let take = self.pending.len().min(MAX_CHUNK_SIZE);
        Ok(Some(self.pending.split_to(take)))
    }
}

/// Connects to `url` and sends a GET, returning once the response head
/// has been read.
///
/// The request is sent as HTTP/1.0 with `Connection: close` so the body is
/// delimited by EOF and never chunk-encoded by the upstream.
pub async fn open(url: &Url) -> Result<UpstreamBody> {
    let host = url.host_str().context("upstream URL missing host")?;
    let port = url.port_or_known_default().unwrap_or(80);

    let mut stream = TcpStream::connect((host, port))
        .await
        .with_context(|| format!("failed to connect to {}:{}", host, port))?;

    stream.write_all(&build_request(url, host)).await?;
    stream.flush().await?;

    let mut buffer = BytesMut::with_capacity(MAX_CHUNK_SIZE);
    loop {
        let n = stream.read_buf(&mut buffer).await?;
        if n == 0 {
            anyhow::bail!("upstream closed before response head was received");
        }

        if let Some(head_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            let status_end = buffer
                .windows(2)
                .position(|w| w == b"\r\n")
                .unwrap_or(head_end);
            let status_line = String::from_utf8_lossy(&buffer[..status_end]).into_owned();
            tracing::debug!(upstream = %url, status = %status_line, "Upstream responded");

            buffer.advance(head_end + 4);
            return Ok(UpstreamBody {
                stream,
                pending: buffer,
            });
        }

        if buffer.len() > MAX_HEAD_SIZE {
            anyhow::bail!("upstream response head too large");
        }
    }
}

/// Request bytes for a body-less GET of `url`.
pub fn build_request(url: &Url, host: &str) -> Vec<u8> {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let host_value = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    format!(
        "GET {} HTTP/1.0\r\nHost: {}\r\nConnection: close\r\n\r\n",
        target, host_value
    )
    .into_bytes()
}

/// Headers announcing a chunked body followed by the digest and length trailers.
pub fn chunked_headers() -> Headers {
    let mut headers = default_headers(0);
    headers.remove("Content-Length");
    headers.replace("Transfer-Encoding", "chunked");
    headers.replace(
        "Trailer",
        format!("{}, {}", SHA256_TRAILER, CONTENT_LENGTH_TRAILER),
    );
    headers
}

/// Streams `upstream` to `writer` as a 200 with a chunked body.
///
/// A read failure mid-body ends the body early; the trailers still describe
/// what was actually relayed.
pub async fn relay<W>(writer: &mut ResponseWriter<W>, mut upstream: UpstreamBody) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    writer.write_status_line(StatusCode::Ok).await?;
    writer.write_headers(&chunked_headers()).await?;

    let mut hasher = Sha256::new();
    let mut total = 0;
    loop {
        match upstream.next_chunk().await {
            Ok(Some(chunk)) => {
                writer.write_chunked_body(&chunk).await?;
                hasher.update(&chunk);
                total += chunk.len();
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, relayed = total, "Upstream read failed");
                break;
            }
        }
    }

    writer.write_chunked_body_done().await?;

    let mut trailers = Headers::new();
    trailers.replace(SHA256_TRAILER, format!("{:x}", hasher.finalize()));
    trailers.replace(CONTENT_LENGTH_TRAILER, total.to_string());
    writer.write_trailers(&trailers).await?;

    tracing::info!(bytes = total, "Relayed upstream body");
    Ok(())
}
